//! PetFeeder Firmware: Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   TimerWakeup   Esp32Time      │
//! │  (ActuatorPort)    (EventSink)    (WakeupPort)  (TimePort)     │
//! │  WiFi station      HTTP server                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │       SharedFeeder ─▶ FeederService (pure logic)       │    │
//! │  │  FeedCycle FSM · AutoFeedScheduler · SettingsStore     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  esp_timer callbacks ─▶ event queue ─▶ main loop ─▶ poll()     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{debug, info};

use petfeeder::adapters::hardware::HardwareAdapter;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::time::Esp32TimeAdapter;
use petfeeder::adapters::wakeup::TimerWakeup;
use petfeeder::adapters::wifi::{self, WifiCredentials};
use petfeeder::adapters::{http, DeviceFeeder};
use petfeeder::app::service::FeederService;
use petfeeder::app::shared::SharedFeeder;
use petfeeder::config::FeederConfig;
use petfeeder::drivers::servo::ServoDriver;
use petfeeder::drivers::{hw_init, hw_timer};
use petfeeder::error::Error;
use petfeeder::events;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = FeederConfig::default();
    config.validate().map_err(Error::Config)?;
    let service = FeederService::new(&config).map_err(Error::from)?;

    // ── 3. Peripherals + timers ───────────────────────────────
    hw_init::init_peripherals(&config, config.default_pwm)?;
    hw_timer::start_timers(config.control_tick_interval_ms)?;

    // ── 4. Feeder core (homes the servo) ──────────────────────
    let clock = Esp32TimeAdapter::new();
    let feeder: Arc<DeviceFeeder> = Arc::new(SharedFeeder::start(
        service,
        HardwareAdapter::new(ServoDriver::new()),
        LogEventSink::new(),
        TimerWakeup::new(clock),
        clock,
    ));

    // ── 5. WiFi station ───────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let creds = WifiCredentials::from_build_env()?;
    let _wifi = wifi::connect_station(
        peripherals.modem,
        sys_loop,
        Some(nvs),
        &creds,
        config.wifi_max_retry,
    )?;

    // ── 6. HTTP server ────────────────────────────────────────
    let _server = http::start(feeder.clone(), &config)?;

    info!("System ready. Entering event loop.");

    // ── 7. Event loop ─────────────────────────────────────────
    loop {
        // Every event only means "poll now"; coalesce a backlog.
        let first = events::wait_event();
        let mut backlog = 0_u32;
        events::drain_events(|_| backlog += 1);

        let report = feeder.poll();
        if !report.is_idle() {
            debug!(
                "poll({:?}, +{} queued): resets={} scheduled_feeds={}",
                first, backlog, report.resets, report.scheduled_feeds
            );
        }
    }
}
