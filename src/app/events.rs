//! Outbound application events.
//!
//! The [`FeederService`](super::service::FeederService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::control::clamp::Position;
use crate::fsm::StateId;

/// What asked for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// `/feed` or any other direct call.
    Manual,
    /// The auto-feed scheduler fired.
    Scheduled,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started and homed the servo.
    Started { state: StateId, position: Position },

    /// The servo was commanded to the feed position.  `rearmed` is true
    /// when a cycle was already in flight and only its deadline moved.
    FeedStarted {
        source: FeedSource,
        position: Position,
        reset_at_ms: u64,
        rearmed: bool,
    },

    /// The reset deadline expired and the servo returned to neutral.
    FeedReset { position: Position },

    /// The auto-feed interval was replaced.
    AutoFeedChanged { minutes: u32, next_fire_ms: Option<u64> },

    /// A stored setting changed (positions, delay or range).
    SettingsChanged,
}
