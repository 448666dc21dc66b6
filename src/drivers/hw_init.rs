//! One-shot hardware peripheral initialization.
//!
//! Configures the LEDC timer and channel that drive the servo, using raw
//! ESP-IDF sys calls.  Called once from `main()` before the HTTP server
//! and timers start.

#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::config::FeederConfig;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    LedcTimerFailed(i32),
    LedcChannelFailed(i32),
    UnsupportedResolution(u32),
    TimerCreateFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LedcTimerFailed(rc)      => write!(f, "LEDC timer config failed (rc={})", rc),
            Self::LedcChannelFailed(rc)    => write!(f, "LEDC channel config failed (rc={})", rc),
            Self::UnsupportedResolution(b) => write!(f, "unsupported LEDC resolution: {} bits", b),
            Self::TimerCreateFailed(rc)    => write!(f, "esp_timer setup failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

/// Configure the servo PWM and park the output at `initial_duty`.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(config: &FeederConfig, initial_duty: u32) -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any other task touches LEDC.
    unsafe { init_servo_ledc(config, initial_duty)? };
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(config: &FeederConfig, _initial_duty: u32) -> Result<(), HwInitError> {
    if config.servo_resolution_bits == 0 || config.servo_resolution_bits > 20 {
        return Err(HwInitError::UnsupportedResolution(config.servo_resolution_bits));
    }
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_servo_ledc(config: &FeederConfig, initial_duty: u32) -> Result<(), HwInitError> {
    if config.servo_resolution_bits == 0 || config.servo_resolution_bits > 20 {
        return Err(HwInitError::UnsupportedResolution(config.servo_resolution_bits));
    }

    // Timer 0: servo frame (50 Hz, 13-bit by default)
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: pins::SERVO_LEDC_TIMER,
        duty_resolution: config.servo_resolution_bits,
        freq_hz: config.servo_freq_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    let ret = unsafe { ledc_timer_config(&timer) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcTimerFailed(ret)); }

    // Channel 0: servo signal
    let ret = unsafe { ledc_channel_config(&ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: pins::SERVO_LEDC_CHANNEL,
        timer_sel: pins::SERVO_LEDC_TIMER,
        gpio_num: pins::SERVO_GPIO,
        duty: initial_duty,
        hpoint: 0,
        ..Default::default()
    }) };
    if ret != ESP_OK as i32 { return Err(HwInitError::LedcChannelFailed(ret)); }

    info!(
        "hw_init: LEDC configured (servo=GPIO{} CH{}, {} Hz, {}-bit)",
        pins::SERVO_GPIO, pins::SERVO_LEDC_CHANNEL, config.servo_freq_hz, config.servo_resolution_bits
    );
    Ok(())
}

pub const LEDC_CH_SERVO: u32 = pins::SERVO_LEDC_CHANNEL;

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) {
    // SAFETY: LEDC channels were configured in init_servo_ledc(); callers
    // hold the feeder lock, so duty writes never race.
    unsafe {
        esp_idf_sys::ledc_set_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            duty,
        );
        esp_idf_sys::ledc_update_duty(
            ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
        );
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u32) {}
