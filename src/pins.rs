//! GPIO / peripheral pin assignments for the PetFeeder board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Dispenser servo (SG90-class hobby servo)
// ---------------------------------------------------------------------------

/// Servo signal line, driven by LEDC channel 0.
pub const SERVO_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// LEDC configuration
// ---------------------------------------------------------------------------

/// LEDC timer used for the servo PWM.
pub const SERVO_LEDC_TIMER: u32 = 0;
/// LEDC channel used for the servo PWM.
pub const SERVO_LEDC_CHANNEL: u32 = 0;
