//! Servo control primitives.

pub mod clamp;
pub mod servo;
