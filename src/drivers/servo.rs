//! Hobby-servo PWM driver.
//!
//! Writes raw LEDC duty values to the servo channel.  Clamping is the
//! caller's job; this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM via hw_init helpers.
//! On host/test: duty writes are dropped.

use crate::drivers::hw_init;

pub struct ServoDriver {
    channel: u32,
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            channel: hw_init::LEDC_CH_SERVO,
        }
    }

    pub fn set_duty(&mut self, duty: u32) {
        hw_init::ledc_set(self.channel, duty);
    }
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}
