//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::info;

use crate::app::events::{AppEvent, FeedSource};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { state, position } => {
                info!("START | initial_state={:?} | pwm={}", state, position);
            }
            AppEvent::FeedStarted {
                source,
                position,
                reset_at_ms,
                rearmed,
            } => {
                let source = match source {
                    FeedSource::Manual => "manual",
                    FeedSource::Scheduled => "scheduled",
                };
                info!(
                    "FEED  | {} | pwm={} | reset_at={}ms{}",
                    source,
                    position,
                    reset_at_ms,
                    if *rearmed { " | re-armed" } else { "" }
                );
            }
            AppEvent::FeedReset { position } => {
                info!("STATE | Dispensing -> Idle | pwm={}", position);
            }
            AppEvent::AutoFeedChanged {
                minutes,
                next_fire_ms,
            } => match next_fire_ms {
                Some(at) => info!("TIMER | every {} min | next={}ms", minutes, at),
                None => info!("TIMER | disabled"),
            },
            AppEvent::SettingsChanged => {
                info!("CONF  | settings changed");
            }
        }
    }
}
