//! Function-pointer finite state machine engine and the feed-cycle controller.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌────────────┬───────────┬──────────┬───────────────────┐   │
//! │  │ StateId    │ on_enter  │ on_exit  │ on_update         │   │
//! │  ├────────────┼───────────┼──────────┼───────────────────┤   │
//! │  │ Idle       │ fn(ctx)   │    -     │ fn(ctx)->Option<> │   │
//! │  │ Dispensing │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │   │
//! │  └────────────┴───────────┴──────────┴───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next.  Steps are driven by
//! [`FeedCycleController`]: one per feed request and one per poll.

pub mod context;
pub mod states;

use context::{FeedContext, ServoTarget};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all feed-cycle states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Dispensing = 1,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `StateId`.  Out-of-range falls back to
    /// `Idle`, the state that drives the servo to neutral.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Dispensing,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FeedContext);

/// Signature for the per-step update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FeedContext) -> Option<StateId>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Time at which the current state was entered (ms since boot).
    entered_at_ms: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, s)| s.id as usize == i),
            "state table out of order"
        );
        Self {
            table,
            current: initial as usize,
            entered_at_ms: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    pub fn start(&mut self, ctx: &mut FeedContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        self.entered_at_ms = ctx.now_ms;
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one step at `ctx.now_ms`.
    pub fn step(&mut self, ctx: &mut FeedContext) {
        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// Milliseconds spent in the current state as of `now_ms`.
    pub fn ms_in_current_state(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.entered_at_ms)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FeedContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {} after {} ms",
            self.table[self.current].name,
            self.table[next_idx].name,
            self.ms_in_current_state(ctx.now_ms)
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.entered_at_ms = ctx.now_ms;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Feed cycle controller
// ---------------------------------------------------------------------------

/// Owns the FSM and its context; the service talks only to this.
///
/// Every method takes the current time explicitly and returns the servo
/// command the step produced, if any.  The caller is expected to apply it
/// before releasing whatever lock guards the controller.
pub struct FeedCycleController {
    fsm: Fsm,
    ctx: FeedContext,
}

impl FeedCycleController {
    pub fn new() -> Self {
        Self {
            fsm: Fsm::new(states::build_state_table(), StateId::Idle),
            ctx: FeedContext::new(),
        }
    }

    /// Enter Idle.  Yields `Default`, which homes the servo.
    pub fn start(&mut self, now_ms: u64) -> Option<ServoTarget> {
        self.ctx.now_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        self.ctx.take_command()
    }

    /// Idle → Dispensing, or re-arm when already dispensing.
    /// Always yields `Feed`.
    pub fn feed_now(&mut self, now_ms: u64, reset_delay_ms: u32) -> ServoTarget {
        self.ctx.now_ms = now_ms;
        self.ctx.reset_delay_ms = reset_delay_ms;
        self.ctx.feed_requested = true;
        self.fsm.step(&mut self.ctx);
        self.ctx.feed_requested = false;
        self.ctx.take_command().unwrap_or(ServoTarget::Feed)
    }

    /// Dispensing → Idle once the deadline is reached.  Yields `Default`
    /// on that transition and nothing otherwise.
    pub fn poll(&mut self, now_ms: u64) -> Option<ServoTarget> {
        self.ctx.now_ms = now_ms;
        self.fsm.step(&mut self.ctx);
        self.ctx.take_command()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_dispensing(&self) -> bool {
        self.state() == StateId::Dispensing
    }

    pub fn reset_deadline_ms(&self) -> Option<u64> {
        self.ctx.reset_deadline_ms
    }

    pub fn cycles_started(&self) -> u32 {
        self.ctx.cycles_started
    }

    pub fn rearms(&self) -> u32 {
        self.ctx.rearms
    }
}

impl Default for FeedCycleController {
    fn default() -> Self {
        Self::new()
    }
}
