//! Hardware adapter: bridges the servo driver to the domain port trait.
//!
//! This is the only module in the system that commands the servo.  On
//! non-espidf targets the underlying driver uses cfg-gated simulation
//! stubs.

use crate::app::ports::ActuatorPort;
use crate::drivers::servo::ServoDriver;

/// Concrete adapter that exposes the servo behind [`ActuatorPort`].
pub struct HardwareAdapter {
    servo: ServoDriver,
}

impl HardwareAdapter {
    pub fn new(servo: ServoDriver) -> Self {
        Self { servo }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_servo_duty(&mut self, duty: u32) {
        self.servo.set_duty(duty);
    }
}

