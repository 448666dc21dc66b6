//! Auto-feed scheduler.
//!
//! A single repeating interval measured in minutes (0 = disabled).  The
//! scheduler never touches the servo itself: [`AutoFeedScheduler::take_due`]
//! tells the caller a fire is due and the caller runs the ordinary feed
//! path, exactly as a manual request would.
//!
//! ```text
//!   set_interval(N, now) ──▶ next_fire = now + N·60 s
//!                                  │
//!   take_due(now) ─── now ≥ next ──┴──▶ Some(fire_at); next += period
//! ```
//!
//! Reconfiguring replaces `next_fire` outright, so a countdown started by
//! an earlier interval can never fire afterwards.

use log::info;

/// Milliseconds per scheduler minute.
pub const MS_PER_MINUTE: u64 = 60_000;

pub struct AutoFeedScheduler {
    interval_minutes: u32,
    /// Absolute time of the next fire; `None` while disabled.
    next_fire_ms: Option<u64>,
    /// Fires delivered since boot.
    fire_count: u32,
}

impl AutoFeedScheduler {
    pub const fn new() -> Self {
        Self {
            interval_minutes: 0,
            next_fire_ms: None,
            fire_count: 0,
        }
    }

    /// Replace the schedule.  `0` disables and drops any pending fire;
    /// anything else restarts the countdown from `now_ms`.
    pub fn set_interval(&mut self, minutes: u32, now_ms: u64) {
        self.interval_minutes = minutes;
        self.next_fire_ms = if minutes == 0 {
            info!("Scheduler: auto-feed disabled");
            None
        } else {
            let next = now_ms.saturating_add(period_ms(minutes));
            info!("Scheduler: auto-feed every {} min, next at {} ms", minutes, next);
            Some(next)
        };
    }

    /// Last configured interval, 0 when disabled.
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn is_enabled(&self) -> bool {
        self.next_fire_ms.is_some()
    }

    pub fn next_fire_ms(&self) -> Option<u64> {
        self.next_fire_ms
    }

    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    /// Consume a due fire, if any, and return its scheduled time.
    ///
    /// A poll that arrives several periods late yields a single fire; the
    /// following fire stays on the same period grid.
    pub fn take_due(&mut self, now_ms: u64) -> Option<u64> {
        let due = self.next_fire_ms.filter(|&at| now_ms >= at)?;
        let period = period_ms(self.interval_minutes);

        let mut next = due;
        while next <= now_ms {
            next = next.saturating_add(period);
        }
        self.next_fire_ms = Some(next);
        self.fire_count = self.fire_count.wrapping_add(1);
        info!("Scheduler: auto-feed fire #{} (due {} ms)", self.fire_count, due);
        Some(due)
    }
}

impl Default for AutoFeedScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn period_ms(minutes: u32) -> u64 {
    u64::from(minutes) * MS_PER_MINUTE
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
