//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!            [feed]                 [feed] (re-arm from now)
//!  IDLE ───────────────▶ DISPENSING ◀──────┐
//!    ▲                        │  └─────────┘
//!    └────[deadline reached]──┘
//! ```

use super::context::{FeedContext, ServoTarget};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Dispensing
        StateDescriptor {
            id: StateId::Dispensing,
            name: "Dispensing",
            on_enter: Some(dispensing_enter),
            on_exit: Some(dispensing_exit),
            on_update: dispensing_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FeedContext) {
    // Back to neutral.  Also runs at boot, which is how the servo is homed.
    ctx.reset_deadline_ms = None;
    ctx.command = Some(ServoTarget::Default);
}

fn idle_update(ctx: &mut FeedContext) -> Option<StateId> {
    ctx.feed_requested.then_some(StateId::Dispensing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISPENSING state
// ═══════════════════════════════════════════════════════════════════════════

fn dispensing_enter(ctx: &mut FeedContext) {
    ctx.cycles_started = ctx.cycles_started.wrapping_add(1);
    ctx.command = Some(ServoTarget::Feed);
    ctx.arm_reset();
}

fn dispensing_exit(ctx: &mut FeedContext) {
    ctx.reset_deadline_ms = None;
}

fn dispensing_update(ctx: &mut FeedContext) -> Option<StateId> {
    if ctx.feed_requested {
        // Cancel-and-restart: the command and the new deadline are produced
        // in the same step, so an expiry can never slip in between.
        ctx.rearms = ctx.rearms.wrapping_add(1);
        ctx.command = Some(ServoTarget::Feed);
        ctx.arm_reset();
        info!("FSM: feed while dispensing, reset re-armed to {:?}", ctx.reset_deadline_ms);
        return None;
    }

    if ctx.reset_due() {
        return Some(StateId::Idle);
    }

    None
}
