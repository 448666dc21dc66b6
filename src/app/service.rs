//! Application service: the hexagonal core.
//!
//! [`FeederService`] owns the feed-cycle controller, the auto-feed
//! scheduler, the settings store and the servo actuator.  It exposes a
//! clean, hardware-agnostic API.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!                 ┌──────────────────────────────┐ ──▶ EventSink
//!   now_ms ─────▶ │        FeederService         │
//! ActuatorPort ◀──│  Cycle · Scheduler · Settings │
//!                 └──────────────────────────────┘
//! ```
//!
//! Every time-dependent operation takes `now_ms` from the caller.  The
//! service itself holds no clock and no timers; the firmware shell calls
//! [`FeederService::poll`] whenever a wake-up or control tick arrives and
//! re-arms its one-shot timer from [`FeederService::next_wakeup_ms`].

use core::fmt::Write;

use heapless::String;
use log::{info, warn};

use crate::config::FeederConfig;
use crate::control::clamp::{ClampRange, Position};
use crate::control::servo::ServoActuator;
use crate::error::SettingsError;
use crate::fsm::context::ServoTarget;
use crate::fsm::{FeedCycleController, StateId};
use crate::scheduler::AutoFeedScheduler;
use crate::settings::{SettingsSnapshot, SettingsStore};

use super::commands::{PositionKind, PwmUpdate};
use super::events::{AppEvent, FeedSource};
use super::ports::{ActuatorPort, EventSink};

/// Capacity of a `/set_pwm` response message.
pub const MESSAGE_CAP: usize = 128;

/// What a feed request did, for the `/feed` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReceipt {
    pub feed_pwm: Position,
    pub reset_delay_ms: u32,
}

/// Result of [`FeederService::apply_pwm_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PwmUpdateOutcome {
    pub message: String<MESSAGE_CAP>,
    /// `false` when the pwm part was missing or addressed an unknown
    /// position.  Any delay in the request was still applied.
    pub ok: bool,
    /// State after the update.
    pub settings: SettingsSnapshot,
}

/// Work done by one [`FeederService::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub resets: u32,
    pub scheduled_feeds: u32,
}

impl PollReport {
    pub fn is_idle(&self) -> bool {
        self.resets == 0 && self.scheduled_feeds == 0
    }
}

// ───────────────────────────────────────────────────────────────
// FeederService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct FeederService {
    cycle: FeedCycleController,
    scheduler: AutoFeedScheduler,
    settings: SettingsStore,
    servo: ServoActuator,
    /// Interval applied by [`start`](Self::start).
    boot_interval_minutes: u32,
}

impl FeederService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the servo; call [`start`](Self::start) next.
    pub fn new(config: &FeederConfig) -> Result<Self, SettingsError> {
        Ok(Self {
            cycle: FeedCycleController::new(),
            scheduler: AutoFeedScheduler::new(),
            settings: SettingsStore::new(config)?,
            servo: ServoActuator::new(),
            boot_interval_minutes: config.auto_feed_minutes,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Home the servo, enter Idle and arm the boot-time schedule.
    pub fn start(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let homing = self.cycle.start(now_ms);
        debug_assert_eq!(homing, Some(ServoTarget::Default));
        self.servo
            .init(self.settings.default_position(), self.settings.range(), hw);

        if self.boot_interval_minutes > 0 {
            self.set_auto_feed_interval(self.boot_interval_minutes, now_ms, sink);
        }

        sink.emit(&AppEvent::Started {
            state: self.cycle.state(),
            position: self.servo.current(),
        });
        info!("FeederService started in {:?}", self.cycle.state());
    }

    // ── Feeding ───────────────────────────────────────────────

    /// Manual feed.  Starts a cycle, or re-arms the one in flight.
    ///
    /// Deadlines already due at `now_ms` are processed first, so a reset
    /// that expired before this request still returns the servo home and
    /// the feed starts a fresh cycle.
    pub fn feed_now(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> FeedReceipt {
        self.poll(now_ms, hw, sink);
        self.feed(now_ms, FeedSource::Manual, hw, sink)
    }

    /// Process every deadline that has come due by `now_ms`.
    ///
    /// A due reset and a due auto-feed are handled in the order they
    /// were scheduled; on a tie the reset runs first, so the scheduled
    /// feed starts a fresh cycle.  A scheduled feed that comes due while
    /// dispensing re-arms the cycle and its older reset never fires.
    /// Calling this early, late or repeatedly is harmless.
    pub fn poll(
        &mut self,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> PollReport {
        let mut report = PollReport::default();

        loop {
            let reset_at = self.cycle.reset_deadline_ms().filter(|&at| at <= now_ms);
            let fire_at = self.scheduler.next_fire_ms().filter(|&at| at <= now_ms);

            match (reset_at, fire_at) {
                (Some(reset), Some(fire)) if reset <= fire => {
                    self.reset(now_ms, hw, sink);
                    report.resets += 1;
                }
                (Some(_), None) => {
                    self.reset(now_ms, hw, sink);
                    report.resets += 1;
                }
                (_, Some(_)) => {
                    if self.scheduler.take_due(now_ms).is_some() {
                        self.feed(now_ms, FeedSource::Scheduled, hw, sink);
                        report.scheduled_feeds += 1;
                    }
                }
                (None, None) => break,
            }
        }

        report
    }

    // ── Auto-feed ─────────────────────────────────────────────

    /// Replace the auto-feed schedule.  `0` disables it.
    pub fn set_auto_feed_interval(&mut self, minutes: u32, now_ms: u64, sink: &mut impl EventSink) {
        self.scheduler.set_interval(minutes, now_ms);
        sink.emit(&AppEvent::AutoFeedChanged {
            minutes,
            next_fire_ms: self.scheduler.next_fire_ms(),
        });
    }

    pub fn auto_feed_interval(&self) -> u32 {
        self.scheduler.interval_minutes()
    }

    // ── Settings ──────────────────────────────────────────────

    /// Store a new neutral position and move the servo there.
    /// Does not end a cycle in flight; its reset still fires on time.
    pub fn set_default_position(
        &mut self,
        value: Position,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Position {
        let stored = self.settings.set_default_position(value);
        self.servo.move_to(stored, self.settings.range(), hw);
        sink.emit(&AppEvent::SettingsChanged);
        stored
    }

    /// Store a new dispense position.  Takes effect on the next feed.
    pub fn set_feed_position(&mut self, value: Position, sink: &mut impl EventSink) -> Position {
        let stored = self.settings.set_feed_position(value);
        sink.emit(&AppEvent::SettingsChanged);
        stored
    }

    /// Move the servo without storing anything.  Returns the clamped
    /// position actually commanded.
    pub fn move_to(&mut self, value: Position, hw: &mut impl ActuatorPort) -> Position {
        self.servo.move_to(value, self.settings.range(), hw)
    }

    /// Store a new reset delay.  An armed deadline keeps its expiry.
    pub fn set_reset_delay(&mut self, ms: u32, sink: &mut impl EventSink) {
        self.settings.set_reset_delay(ms);
        sink.emit(&AppEvent::SettingsChanged);
    }

    /// Replace the clamp range, re-clamping stored positions and the
    /// live servo position.
    pub fn set_clamp_range(
        &mut self,
        min: Position,
        max: Position,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<ClampRange, SettingsError> {
        let range = self.settings.set_clamp_range(min, max).inspect_err(|e| {
            warn!("Settings: clamp range rejected: {}", e);
        })?;
        self.servo.reclamp(range, hw);
        sink.emit(&AppEvent::SettingsChanged);
        Ok(range)
    }

    /// Apply a decoded `/set_pwm` request.
    pub fn apply_pwm_update(
        &mut self,
        update: &PwmUpdate,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> PwmUpdateOutcome {
        let mut message: String<MESSAGE_CAP> = String::new();
        let mut ok = true;

        match update.pwm {
            Some(pwm) => match &update.position {
                PositionKind::Default => {
                    let v = self.set_default_position(pwm, hw, sink);
                    let _ = write!(message, "Default position set to PWM: {}", v);
                }
                PositionKind::Feed => {
                    let v = self.set_feed_position(pwm, sink);
                    let _ = write!(message, "Feed position set to PWM: {}", v);
                }
                PositionKind::Current => {
                    let v = self.move_to(pwm, hw);
                    let _ = write!(message, "Current position set to PWM: {}", v);
                }
                PositionKind::Unknown(name) => {
                    let _ = write!(message, "Unknown position type: {}", name);
                    ok = false;
                }
            },
            None => {
                let _ = message.push_str("Missing or invalid PWM value");
                ok = false;
            }
        }

        if let Some(delay) = update.delay_ms {
            self.set_reset_delay(delay, sink);
            let _ = write!(message, ", reset delay set to {} ms", delay);
        }

        if !ok {
            warn!("set_pwm: {}", message);
        }

        PwmUpdateOutcome {
            message,
            ok,
            settings: self.settings(),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Consistent snapshot of every setting plus the live position.
    pub fn settings(&self) -> SettingsSnapshot {
        self.settings
            .snapshot(self.servo.current(), self.scheduler.interval_minutes())
    }

    pub fn state(&self) -> StateId {
        self.cycle.state()
    }

    pub fn current_position(&self) -> Position {
        self.servo.current()
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do.
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        match (self.cycle.reset_deadline_ms(), self.scheduler.next_fire_ms()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feed cycles started from Idle since boot.
    pub fn cycles_started(&self) -> u32 {
        self.cycle.cycles_started()
    }

    // ── Internal ──────────────────────────────────────────────

    fn feed(
        &mut self,
        now_ms: u64,
        source: FeedSource,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> FeedReceipt {
        let rearmed = self.cycle.is_dispensing();
        let reset_delay_ms = self.settings.reset_delay_ms();
        let target = self.cycle.feed_now(now_ms, reset_delay_ms);
        let position = self.drive(target, hw);

        sink.emit(&AppEvent::FeedStarted {
            source,
            position,
            reset_at_ms: self.cycle.reset_deadline_ms().unwrap_or(now_ms),
            rearmed,
        });

        FeedReceipt {
            feed_pwm: position,
            reset_delay_ms,
        }
    }

    fn reset(&mut self, now_ms: u64, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Some(target) = self.cycle.poll(now_ms) {
            let position = self.drive(target, hw);
            sink.emit(&AppEvent::FeedReset { position });
        }
    }

    /// Translate a controller command into an actuator move, using the
    /// setting current at this instant.
    fn drive(&mut self, target: ServoTarget, hw: &mut impl ActuatorPort) -> Position {
        let position = match target {
            ServoTarget::Default => self.settings.default_position(),
            ServoTarget::Feed => self.settings.feed_position(),
        };
        self.servo.move_to(position, self.settings.range(), hw)
    }
}
