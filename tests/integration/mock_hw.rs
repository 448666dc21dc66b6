//! Mock adapters for integration tests.
//!
//! Each mock records into a shared buffer, so a test can hand one clone to
//! [`SharedFeeder`](petfeeder::app::shared::SharedFeeder) and keep another
//! to assert on the full history afterwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{ActuatorPort, EventSink, TimePort, WakeupPort};

// ── MockHardware ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockHardware {
    duties: Arc<Mutex<Vec<u32>>>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn duties(&self) -> Vec<u32> {
        self.duties.lock().unwrap().clone()
    }

    pub fn last_duty(&self) -> Option<u32> {
        self.duties.lock().unwrap().last().copied()
    }

    pub fn clear(&self) {
        self.duties.lock().unwrap().clear();
    }
}

impl ActuatorPort for MockHardware {
    fn set_servo_duty(&mut self, duty: u32) {
        self.duties.lock().unwrap().push(duty);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    pub fn resets(&self) -> usize {
        self.count(|e| matches!(e, AppEvent::FeedReset { .. }))
    }

    pub fn feeds(&self) -> usize {
        self.count(|e| matches!(e, AppEvent::FeedStarted { .. }))
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── MockWakeup ────────────────────────────────────────────────

/// Remembers every arm request; the last one is what a real one-shot
/// timer would currently hold.
#[derive(Clone, Default)]
pub struct MockWakeup {
    armed: Arc<Mutex<Vec<Option<u64>>>>,
}

#[allow(dead_code)]
impl MockWakeup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<u64> {
        self.armed.lock().unwrap().last().copied().flatten()
    }

    pub fn arm_count(&self) -> usize {
        self.armed.lock().unwrap().len()
    }
}

impl WakeupPort for MockWakeup {
    fn schedule_wakeup(&mut self, at_ms: Option<u64>) {
        self.armed.lock().unwrap().push(at_ms);
    }
}

// ── ManualClock ───────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimePort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
