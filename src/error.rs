//! Unified error types for the PetFeeder firmware.
//!
//! The feed core itself is infallible: out-of-range positions are clamped,
//! never rejected.  The only errors are malformed requests caught at the
//! HTTP boundary, settings that would break the clamp invariants, and
//! an invalid compiled-in configuration.  All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An inbound request could not be decoded.
    Request(RequestError),
    /// A settings update was rejected.
    Settings(SettingsError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "request: {e}"),
            Self::Settings(e) => write!(f, "settings: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

/// Malformed input detected while decoding an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// The URI carried no query string.
    MissingQuery,
    /// A required query parameter was absent.
    MissingParam(&'static str),
    /// A query parameter was present but not an integer.
    InvalidNumber(&'static str),
    /// The request body was not valid JSON.
    InvalidJson,
    /// The request body exceeded the accepted size.
    BodyTooLarge,
}

impl RequestError {
    /// HTTP status the request layer answers with.
    pub fn status(self) -> u16 {
        match self {
            // The control page treats a missing query or key as not found.
            Self::MissingQuery | Self::MissingParam(_) => 404,
            Self::InvalidNumber(_) | Self::InvalidJson => 400,
            Self::BodyTooLarge => 413,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingQuery => write!(f, "missing query string"),
            Self::MissingParam(name) => write!(f, "missing parameter '{name}'"),
            Self::InvalidNumber(name) => write!(f, "parameter '{name}' is not an integer"),
            Self::InvalidJson => write!(f, "Invalid JSON"),
            Self::BodyTooLarge => write!(f, "request body too large"),
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self::Request(e)
    }
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// `min` was greater than `max`.
    InvertedRange { min: u32, max: u32 },
    /// A bound lies beyond what the PWM peripheral can output.
    OutOfHardwareRange { value: u32, limit: u32 },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRange { min, max } => {
                write!(f, "min_pwm {min} is greater than max_pwm {max}")
            }
            Self::OutOfHardwareRange { value, limit } => {
                write!(f, "pwm bound {value} exceeds hardware limit {limit}")
            }
        }
    }
}

impl From<SettingsError> for Error {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}
