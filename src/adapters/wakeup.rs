//! Wake-up timer adapter.
//!
//! Implements [`WakeupPort`] on top of the one-shot esp_timer in
//! [`hw_timer`](crate::drivers::hw_timer).  The service hands over an
//! absolute deadline; the adapter converts it into a relative delay
//! against the same clock the service is driven by.

use crate::app::ports::{TimePort, WakeupPort};
use crate::drivers::hw_timer;

use super::time::Esp32TimeAdapter;

pub struct TimerWakeup {
    clock: Esp32TimeAdapter,
}

impl TimerWakeup {
    pub fn new(clock: Esp32TimeAdapter) -> Self {
        Self { clock }
    }
}

impl WakeupPort for TimerWakeup {
    fn schedule_wakeup(&mut self, at_ms: Option<u64>) {
        let now_ms = self.clock.now_ms();
        hw_timer::arm_wakeup(at_ms.map(|at| at.saturating_sub(now_ms) * 1_000));
    }
}
