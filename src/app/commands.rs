//! Inbound commands to the application service.
//!
//! These carry requests decoded by the HTTP layer into the
//! [`FeederService`](super::service::FeederService).  They hold only
//! already-parsed values; validation of the wire format happens in
//! [`crate::api`].

use heapless::String;

use crate::control::clamp::Position;

/// Longest position name echoed back in an error message.
pub const POSITION_NAME_CAP: usize = 32;

/// Which position a `/set_pwm` request addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionKind {
    /// Store as the neutral position and move there.
    Default,
    /// Store as the dispense position.
    Feed,
    /// Move the servo without storing anything.
    Current,
    /// Anything else; echoed in the error message (truncated).
    Unknown(String<POSITION_NAME_CAP>),
}

impl PositionKind {
    /// Map the wire name.  Matching is exact and case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "default" => Self::Default,
            "feed" => Self::Feed,
            "current" => Self::Current,
            other => Self::Unknown(truncated(other)),
        }
    }
}

/// A decoded `/set_pwm` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwmUpdate {
    /// `None` when the field was missing or not a number.
    pub pwm: Option<Position>,
    pub position: PositionKind,
    /// Applied independently of whether `pwm` was usable.
    pub delay_ms: Option<u32>,
}

fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
