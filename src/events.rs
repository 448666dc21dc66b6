//! Timer-driven event queue.
//!
//! Events are produced by esp_timer callbacks (the one-shot wake-up and
//! the periodic control tick) and consumed by the main loop, which
//! handles them one at a time under the feeder lock.  Producers never
//! touch feeder state.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Wake-up CB  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Tick CB     │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The main loop blocks in [`wait_event`] until a callback pushes, so a
//! deadline is handled as soon as its timer fires.
//!
//! Dropped events are harmless: every event only means "poll now", and
//! the control tick keeps arriving.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// The one-shot wake-up timer reached a deadline.
    WakeupTimer = 0,
    /// Periodic backstop tick.
    ControlTick = 1,
}

static EVENT_QUEUE: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_CAP> = Channel::new();

/// Push an event into the queue.
/// Safe to call from timer-task context.
/// Returns `false` if the queue is full (event dropped).
pub fn push_event(event: Event) -> bool {
    EVENT_QUEUE.try_send(event).is_ok()
}

/// Pop the next event, or `None` if the queue is empty.
pub fn pop_event() -> Option<Event> {
    EVENT_QUEUE.try_receive().ok()
}

/// Drain all pending events into a callback, in FIFO order.
pub fn drain_events(mut handler: impl FnMut(Event)) {
    while let Some(event) = pop_event() {
        handler(event);
    }
}

/// Block the calling task until an event arrives.
pub fn wait_event() -> Event {
    futures_lite::future::block_on(EVENT_QUEUE.receive())
}
