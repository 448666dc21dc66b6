//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ FeederService (domain)
//! ```
//!
//! Driven adapters (servo PWM, event sinks, timers, clocks) implement these
//! traits.  The [`FeederService`](super::service::FeederService) consumes
//! them via generics, so the domain core never touches hardware directly.

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command the servo.
pub trait ActuatorPort {
    /// Write a raw duty value to the servo PWM channel.  The value has
    /// already been clamped; implementations must not adjust it.
    fn set_servo_duty(&mut self, duty: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Wake-up port (driven adapter: domain → one-shot hardware timer)
// ───────────────────────────────────────────────────────────────

/// Single-slot wake-up timer.
///
/// Every call replaces whatever was armed before.  `None` disarms.
/// A wake-up only has to get the main loop to poll; firing early or late
/// is harmless because the service re-checks every deadline against
/// the clock.
pub trait WakeupPort {
    fn schedule_wakeup(&mut self, at_ms: Option<u64>);
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock, zero at boot.
pub trait TimePort {
    fn now_ms(&self) -> u64;
}
