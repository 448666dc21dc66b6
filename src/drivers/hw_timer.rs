//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Two timers, both of which only push events into the queue:
//!
//! - a one-shot **wake-up** timer, re-armed to the feeder's next deadline
//!   after every locked operation;
//! - a periodic **control tick** that makes the main loop poll even if a
//!   wake-up was missed.
//!
//! Timer callbacks execute in the ESP timer task context (not ISR).  On
//! simulation targets nothing is started; the main loop sleeps instead.

#[cfg(target_os = "espidf")]
use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use super::hw_init::HwInitError;

#[cfg(target_os = "espidf")]
static mut WAKEUP_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut CONTROL_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: WAKEUP_TIMER is written once in `start_timers()` before the
/// feeder lock is shared.  Every later caller holds that lock.
#[cfg(target_os = "espidf")]
unsafe fn wakeup_timer() -> esp_timer_handle_t { unsafe { WAKEUP_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn wakeup_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::WakeupTimer);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn control_tick_cb(_arg: *mut core::ffi::c_void) {
    push_event(Event::ControlTick);
}

/// Create the wake-up timer and start the periodic control tick.
#[cfg(target_os = "espidf")]
pub fn start_timers(control_interval_ms: u32) -> Result<(), HwInitError> {
    // SAFETY: WAKEUP_TIMER and CONTROL_TIMER are written here once at boot
    // from the main task before any timer callbacks fire.
    // The callbacks themselves only call push_event().
    unsafe {
        let wakeup_args = esp_timer_create_args_t {
            callback: Some(wakeup_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"feed_wakeup\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&wakeup_args, &raw mut WAKEUP_TIMER);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerCreateFailed(ret));
        }

        let control_args = esp_timer_create_args_t {
            callback: Some(control_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"control\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&control_args, &raw mut CONTROL_TIMER);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerCreateFailed(ret));
        }
        let ret = esp_timer_start_periodic(CONTROL_TIMER, u64::from(control_interval_ms) * 1_000);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::TimerCreateFailed(ret));
        }
    }

    info!("hw_timer: wake-up timer ready, control tick every {} ms", control_interval_ms);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(_control_interval_ms: u32) -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): timers not started (events driven by sleep loop)");
    Ok(())
}

/// Replace the pending wake-up.  `None` leaves the timer disarmed.
#[cfg(target_os = "espidf")]
pub fn arm_wakeup(after_us: Option<u64>) {
    // SAFETY: wakeup_timer() contract, the caller holds the feeder lock.
    unsafe {
        let t = wakeup_timer();
        if t.is_null() {
            return;
        }
        // Stopping an idle timer reports ESP_ERR_INVALID_STATE; harmless.
        esp_timer_stop(t);
        if let Some(us) = after_us {
            let ret = esp_timer_start_once(t, us.max(1));
            if ret != ESP_OK as i32 {
                log::warn!("hw_timer: wake-up arm failed (rc={}), control tick will cover", ret);
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn arm_wakeup(after_us: Option<u64>) {
    log::debug!("hw_timer(sim): wake-up in {:?} us", after_us);
}
