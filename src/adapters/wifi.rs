//! WiFi station-mode adapter.
//!
//! Joins the configured access point with a bounded number of attempts.
//! When every attempt fails the firmware keeps running: the servo still
//! homes and the HTTP server still starts, it is just unreachable.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: credential validation and the retry loop only.
//!
//! Credentials come from the `WIFI_SSID` / `WIFI_PASS` build environment,
//! falling back to compiled-in defaults.

use core::fmt;
use log::{info, warn};

/// Fallback access point when `WIFI_SSID` is unset at build time.
pub const DEFAULT_SSID: &str = "pixel";
/// Fallback passphrase when `WIFI_PASS` is unset at build time.
pub const DEFAULT_PASS: &str = "12341234";

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked in at build time.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        Self::new(
            option_env!("WIFI_SSID").unwrap_or(DEFAULT_SSID),
            option_env!("WIFI_PASS").unwrap_or(DEFAULT_PASS),
        )
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Retry policy
// ───────────────────────────────────────────────────────────────

/// Run `attempt` up to `max_attempts` times, stopping at the first success.
///
/// `between` runs after each failed attempt except the last (disconnect,
/// back off).  Returns the 1-based attempt that succeeded.
pub fn connect_with_retry<E: fmt::Display>(
    max_attempts: u8,
    mut attempt: impl FnMut(u8) -> Result<(), E>,
    mut between: impl FnMut(),
) -> Result<u8, ConnectivityError> {
    let max_attempts = max_attempts.max(1);
    for n in 1..=max_attempts {
        info!("WiFi: connect attempt {}/{}", n, max_attempts);
        match attempt(n) {
            Ok(()) => return Ok(n),
            Err(e) => {
                warn!("WiFi: attempt {} failed: {}", n, e);
                if n < max_attempts {
                    between();
                }
            }
        }
    }
    warn!("WiFi: failed to connect to the AP after {} attempts", max_attempts);
    Err(ConnectivityError::ConnectionFailed)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF station bring-up
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const RETRY_DELAY_MS: u64 = 1_000;

/// Start station mode and try to join.  The returned driver must be kept
/// alive for the connection to persist, whether or not it came up.
#[cfg(target_os = "espidf")]
pub fn connect_station(
    modem: esp_idf_svc::hal::modem::Modem,
    sys_loop: esp_idf_svc::eventloop::EspSystemEventLoop,
    nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
    creds: &WifiCredentials,
    max_retry: u8,
) -> anyhow::Result<esp_idf_svc::wifi::EspWifi<'static>> {
    use anyhow::anyhow;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

    let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sys_loop)?;

    let auth_method = if creds.is_open() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: creds
            .ssid()
            .try_into()
            .map_err(|_| anyhow!("wifi ssid too long"))?,
        password: creds
            .password()
            .try_into()
            .map_err(|_| anyhow!("wifi password too long"))?,
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("WiFi: started, joining '{}'", creds.ssid());

    let joined = connect_with_retry(
        max_retry,
        |_| -> anyhow::Result<()> {
            wifi.connect()?;
            wifi.wait_netif_up()?;
            Ok(())
        },
        || {
            std::thread::sleep(std::time::Duration::from_millis(RETRY_DELAY_MS));
        },
    );

    match joined {
        Ok(_) => match wifi.wifi().sta_netif().get_ip_info() {
            Ok(ip) => info!("WiFi: got IP {}", ip.ip),
            Err(e) => warn!("WiFi: connected but IP info unavailable: {}", e),
        },
        Err(e) => warn!("WiFi: {}, continuing offline", e),
    }

    drop(wifi);
    Ok(esp_wifi)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
