//! Pulse-width clamping.
//!
//! Every position that reaches the servo passes through [`clamp`] first.
//! The range is inclusive on both ends.

use serde::Serialize;

/// Servo position in LEDC duty ticks.
pub type Position = u32;

/// Inclusive bounds for commanded positions.
///
/// Construction goes through [`ClampRange::new`], which refuses an
/// inverted range, so `min <= max` holds for every live value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClampRange {
    min: Position,
    max: Position,
}

impl ClampRange {
    /// Returns `None` when `min > max`.
    pub const fn new(min: Position, max: Position) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    pub const fn min(&self) -> Position {
        self.min
    }

    pub const fn max(&self) -> Position {
        self.max
    }

    pub fn contains(&self, value: Position) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Map `value` into `range`, snapping to the nearest bound when outside.
pub fn clamp(value: Position, range: ClampRange) -> Position {
    value.clamp(range.min, range.max)
}

/// Convert a loosely-typed JSON number into a position.
///
/// Negative and NaN inputs become 0, fractional values truncate, and
/// anything beyond `u32::MAX` saturates; the result still needs [`clamp`].
pub fn position_from_f64(value: f64) -> Position {
    // `as` on f64 -> u32 saturates and maps NaN to 0.
    value as Position
}
