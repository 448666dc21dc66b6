//! Shared mutable context threaded through every FSM handler.
//!
//! `FeedContext` carries the inputs for one step (current time, whether a
//! feed was requested, the reset delay in force) and the outputs the
//! handlers produce (the servo target to command, the armed deadline).

/// Which configured position the servo should be driven to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoTarget {
    /// Neutral / closed.
    Default,
    /// Dispense.
    Feed,
}

/// The shared context passed to every state handler function.
#[derive(Debug, Clone, Default)]
pub struct FeedContext {
    // -- Inputs --
    /// Monotonic time of the step being processed (ms since boot).
    pub now_ms: u64,
    /// A feed (manual or scheduled) arrived with this step.
    pub feed_requested: bool,
    /// Reset delay to use if this step arms a deadline.
    pub reset_delay_ms: u32,

    // -- Outputs --
    /// Servo command produced by this step, consumed by the service.
    pub command: Option<ServoTarget>,
    /// One-shot reset deadline; `Some` exactly while dispensing.
    pub reset_deadline_ms: Option<u64>,

    // -- Counters --
    /// Feed cycles started from Idle.
    pub cycles_started: u32,
    /// Feeds that re-armed an in-flight cycle.
    pub rearms: u32,
}

impl FeedContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the reset deadline from `now_ms`.
    /// Replaces any pending deadline; never extends it additively.
    pub fn arm_reset(&mut self) {
        self.reset_deadline_ms = Some(self.now_ms.saturating_add(u64::from(self.reset_delay_ms)));
    }

    /// True once `now_ms` has reached the armed deadline.
    pub fn reset_due(&self) -> bool {
        self.reset_deadline_ms.is_some_and(|d| self.now_ms >= d)
    }

    /// Hand the pending servo command to the caller.
    pub fn take_command(&mut self) -> Option<ServoTarget> {
        self.command.take()
    }
}
