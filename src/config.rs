//! System configuration parameters
//!
//! Compiled-in defaults for the PetFeeder.  Nothing here is persisted:
//! every power cycle starts from [`FeederConfig::default()`], and runtime
//! changes live only in the [`SettingsStore`](crate::settings::SettingsStore).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    // --- Servo positions (LEDC duty ticks) ---
    /// Neutral / closed position held between feeds.
    pub default_pwm: u32,
    /// Dispense position commanded during a feed cycle.
    pub feed_pwm: u32,
    /// Lower clamp bound for every commanded position.
    pub min_pwm: u32,
    /// Upper clamp bound for every commanded position.
    pub max_pwm: u32,

    // --- Feed cycle ---
    /// Time the servo stays at the feed position before returning (ms).
    pub reset_delay_ms: u32,
    /// Auto-feed interval in minutes (0 = disabled).
    pub auto_feed_minutes: u32,

    // --- Servo PWM ---
    /// Servo frame rate (Hz).
    pub servo_freq_hz: u32,
    /// LEDC duty resolution (bits).
    pub servo_resolution_bits: u32,

    // --- Timing ---
    /// Backstop control tick interval (ms).
    pub control_tick_interval_ms: u32,

    // --- Network ---
    /// Station-mode connect attempts before giving up.
    pub wifi_max_retry: u8,
    /// HTTP server task stack size (bytes).
    pub http_stack_size: usize,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            // 50 Hz frame, duty expressed as 4096 * pulse_ms / 20
            default_pwm: 307, // 1.5 ms
            feed_pwm: 256,    // 1.25 ms
            min_pwm: 102,     // 0.5 ms
            max_pwm: 512,     // 2.5 ms

            reset_delay_ms: 2000,
            auto_feed_minutes: 0,

            servo_freq_hz: 50,
            servo_resolution_bits: 13,

            control_tick_interval_ms: 1000,

            wifi_max_retry: 5,
            http_stack_size: 10 * 1024,
        }
    }
}

impl FeederConfig {
    /// Largest duty value the LEDC channel accepts at this resolution.
    pub fn max_hw_duty(&self) -> u32 {
        (1u32 << self.servo_resolution_bits) - 1
    }

    /// Reject configurations that would put the clamp invariants in doubt.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.servo_resolution_bits == 0 || self.servo_resolution_bits > 20 {
            return Err("servo_resolution_bits must be 1..=20");
        }
        if self.min_pwm > self.max_pwm {
            return Err("min_pwm must not exceed max_pwm");
        }
        if self.max_pwm > self.max_hw_duty() {
            return Err("max_pwm exceeds LEDC duty range");
        }
        if !(self.min_pwm..=self.max_pwm).contains(&self.default_pwm) {
            return Err("default_pwm outside clamp range");
        }
        if !(self.min_pwm..=self.max_pwm).contains(&self.feed_pwm) {
            return Err("feed_pwm outside clamp range");
        }
        if self.servo_freq_hz == 0 || self.control_tick_interval_ms == 0 {
            return Err("frequencies and tick intervals must be non-zero");
        }
        Ok(())
    }
}
