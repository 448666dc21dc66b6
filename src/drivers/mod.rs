//! Servo driver, hardware initialisation, and hardware timers.

pub mod hw_init;
pub mod hw_timer;
pub mod servo;
