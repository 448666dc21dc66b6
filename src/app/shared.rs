//! The single lock around the feeder.
//!
//! HTTP handlers run on the server's task and timer events are drained on
//! the main task; both go through [`SharedFeeder`].  One coarse mutex
//! serialises every operation, so a feed and a reset expiry can never
//! interleave.  The clock is read inside the lock, which keeps operation
//! timestamps in the same order the lock was taken.
//!
//! Deadlines already due are processed before each operation, so a
//! wake-up that was never drained cannot hide an expired reset.  After
//! every operation the wake-up timer is re-armed to the service's next
//! deadline, still under the lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::control::clamp::{ClampRange, Position};
use crate::error::SettingsError;
use crate::fsm::StateId;
use crate::settings::SettingsSnapshot;

use super::commands::PwmUpdate;
use super::ports::{ActuatorPort, EventSink, TimePort, WakeupPort};
use super::service::{FeedReceipt, FeederService, PollReport, PwmUpdateOutcome};

struct Inner<H, S, W> {
    service: FeederService,
    hw: H,
    sink: S,
    wakeup: W,
}

pub struct SharedFeeder<H, S, W, T> {
    inner: Mutex<Inner<H, S, W>>,
    clock: T,
}

impl<H, S, W, T> SharedFeeder<H, S, W, T>
where
    H: ActuatorPort,
    S: EventSink,
    W: WakeupPort,
    T: TimePort,
{
    /// Start the service and take ownership of its adapters.
    pub fn start(mut service: FeederService, mut hw: H, mut sink: S, mut wakeup: W, clock: T) -> Self {
        service.start(clock.now_ms(), &mut hw, &mut sink);
        wakeup.schedule_wakeup(service.next_wakeup_ms());
        Self {
            inner: Mutex::new(Inner {
                service,
                hw,
                sink,
                wakeup,
            }),
            clock,
        }
    }

    /// Run `f` under the lock with the current time, then re-arm the
    /// wake-up timer.
    ///
    /// Deadlines that came due before the lock was taken are processed
    /// first, so `f` never sees a cycle whose reset has already expired.
    pub fn with<R>(&self, f: impl FnOnce(&mut FeederService, u64, &mut H, &mut S) -> R) -> R {
        self.locked(|svc, now, hw, sink| {
            svc.poll(now, hw, sink);
            f(svc, now, hw, sink)
        })
    }

    pub fn feed_now(&self) -> FeedReceipt {
        self.with(|svc, now, hw, sink| svc.feed_now(now, hw, sink))
    }

    pub fn poll(&self) -> PollReport {
        self.locked(|svc, now, hw, sink| svc.poll(now, hw, sink))
    }

    pub fn set_auto_feed_interval(&self, minutes: u32) {
        self.with(|svc, now, _, sink| svc.set_auto_feed_interval(minutes, now, sink));
    }

    pub fn auto_feed_interval(&self) -> u32 {
        self.with(|svc, _, _, _| svc.auto_feed_interval())
    }

    pub fn apply_pwm_update(&self, update: &PwmUpdate) -> PwmUpdateOutcome {
        self.with(|svc, _, hw, sink| svc.apply_pwm_update(update, hw, sink))
    }

    pub fn set_clamp_range(&self, min: Position, max: Position) -> Result<ClampRange, SettingsError> {
        self.with(|svc, _, hw, sink| svc.set_clamp_range(min, max, hw, sink))
    }

    pub fn settings(&self) -> SettingsSnapshot {
        self.with(|svc, _, _, _| svc.settings())
    }

    pub fn state(&self) -> StateId {
        self.with(|svc, _, _, _| svc.state())
    }

    fn locked<R>(&self, f: impl FnOnce(&mut FeederService, u64, &mut H, &mut S) -> R) -> R {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let now_ms = self.clock.now_ms();
        let out = f(&mut inner.service, now_ms, &mut inner.hw, &mut inner.sink);
        inner.wakeup.schedule_wakeup(inner.service.next_wakeup_ms());
        out
    }

    /// A panic while holding the lock leaves plain data behind; keep
    /// serving rather than wedging every later request.
    fn lock(&self) -> MutexGuard<'_, Inner<H, S, W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
