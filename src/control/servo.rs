//! Servo actuator: the only path to the physical servo.
//!
//! Holds the last commanded position.  Every command is clamped against
//! the range supplied by the caller (the settings store's current range)
//! before it reaches the [`ActuatorPort`].

use log::info;

use super::clamp::{clamp, ClampRange, Position};
use crate::app::ports::ActuatorPort;

pub struct ServoActuator {
    current: Position,
}

impl ServoActuator {
    /// The servo is considered unpositioned until [`init`](Self::init).
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Drive the servo to its neutral position at boot.
    pub fn init(&mut self, default: Position, range: ClampRange, hw: &mut impl ActuatorPort) {
        let duty = self.move_to(default, range, hw);
        info!("Servo: initialised at default position (PWM {})", duty);
    }

    /// Clamp, command the hardware, and record the new position.
    /// Returns the position actually commanded.
    pub fn move_to(
        &mut self,
        position: Position,
        range: ClampRange,
        hw: &mut impl ActuatorPort,
    ) -> Position {
        let duty = clamp(position, range);
        hw.set_servo_duty(duty);
        self.current = duty;
        info!("Servo: position set to PWM {}", duty);
        duty
    }

    /// Re-clamp the held position after the range shrank.
    /// Issues a hardware command only when the position actually moved.
    pub fn reclamp(&mut self, range: ClampRange, hw: &mut impl ActuatorPort) {
        if !range.contains(self.current) {
            self.move_to(self.current, range, hw);
        }
    }

    pub fn current(&self) -> Position {
        self.current
    }
}

impl Default for ServoActuator {
    fn default() -> Self {
        Self::new()
    }
}
