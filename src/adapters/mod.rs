//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements    | Connects to                 |
//! |------------|---------------|-----------------------------|
//! | `hardware` | ActuatorPort  | LEDC servo channel          |
//! | `log_sink` | EventSink     | Serial log output           |
//! | `time`     | TimePort      | ESP32 system timer          |
//! | `wakeup`   | WakeupPort    | One-shot esp_timer          |
//! | `wifi`     | -             | ESP-IDF WiFi STA            |
//! | `http`     | -             | ESP-IDF HTTP server routes  |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wakeup;
pub mod wifi;

use crate::app::shared::SharedFeeder;

/// The feeder as wired on the device.
pub type DeviceFeeder = SharedFeeder<
    hardware::HardwareAdapter,
    log_sink::LogEventSink,
    wakeup::TimerWakeup,
    time::Esp32TimeAdapter,
>;
