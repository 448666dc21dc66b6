//! HTTP request decoding and response encoding.
//!
//! Pure functions over strings and byte slices; the routing itself lives
//! in [`crate::adapters::http`].  Keeping the wire format here means every
//! route's behaviour can be tested on the host.
//!
//! | Route        | Method | Request                        | Response          |
//! |--------------|--------|--------------------------------|-------------------|
//! | `/`          | GET    | -                              | control page      |
//! | `/feed`      | GET    | -                              | text              |
//! | `/set_timer` | GET    | `?minutes=N`                   | text              |
//! | `/get_timer` | GET    | -                              | text (integer)    |
//! | `/set_pwm`   | POST   | `{pwm, position?, delay?}`     | JSON              |
//! | `/settings`  | GET    | -                              | JSON              |
//! | `/set_range` | POST   | `{min, max}`                   | JSON              |

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::commands::{PositionKind, PwmUpdate};
use crate::app::service::{FeedReceipt, PwmUpdateOutcome};
use crate::control::clamp::{position_from_f64, Position};
use crate::error::RequestError;

/// Control page served at `/`.
pub const INDEX_HTML: &str = include_str!("index.html");

/// Largest request body accepted on the JSON routes.
pub const MAX_BODY_LEN: usize = 512;

/// Capacity of the plain-text responses.
pub const TEXT_CAP: usize = 96;

// ───────────────────────────────────────────────────────────────
// Requests
// ───────────────────────────────────────────────────────────────

/// Value of `key` in the query string of `uri`, if present.
/// A key without `=` yields an empty value.
pub fn query_param<'a>(uri: &'a str, key: &str) -> Option<&'a str> {
    let query = uri.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (name == key).then_some(value)
    })
}

/// Decode `/set_timer?minutes=N`.  Negative values mean "disabled".
pub fn parse_set_timer(uri: &str) -> Result<u32, RequestError> {
    if !uri.contains('?') {
        return Err(RequestError::MissingQuery);
    }
    let raw = query_param(uri, "minutes").ok_or(RequestError::MissingParam("minutes"))?;
    parse_minutes(raw)
}

/// Parse a minute count the way the control page has always sent it.
///
/// An empty value means 0 (disabled).  Otherwise an optional sign and a
/// run of leading digits are read and anything after them is ignored, so
/// `5min` is 5.  Negative values clamp to 0 and overlarge ones to
/// `u32::MAX`.  A value with no leading digits at all is rejected.
pub fn parse_minutes(raw: &str) -> Result<u32, RequestError> {
    let s = raw.trim_start();
    if s.is_empty() {
        return Ok(0);
    }
    let (negative, digits) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else {
        (false, s.strip_prefix('+').unwrap_or(s))
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(RequestError::InvalidNumber("minutes"));
    }
    if negative {
        return Ok(0);
    }
    Ok(digits[..end].parse().unwrap_or(u32::MAX))
}

/// Reject bodies over [`MAX_BODY_LEN`] before reading them.
pub fn check_body_len(len: usize) -> Result<usize, RequestError> {
    if len > MAX_BODY_LEN {
        Err(RequestError::BodyTooLarge)
    } else {
        Ok(len)
    }
}

/// Decode a `/set_pwm` body.
///
/// Only unparseable JSON is an error here.  A missing or non-numeric
/// `pwm` decodes to `pwm: None`, which the service reports in its
/// message, and a missing or non-string `position` means `current`.
pub fn parse_set_pwm(body: &[u8]) -> Result<PwmUpdate, RequestError> {
    let root: Value = serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)?;

    let pwm = root.get("pwm").and_then(Value::as_f64).map(position_from_f64);
    let position = root
        .get("position")
        .and_then(Value::as_str)
        .map_or(PositionKind::Current, PositionKind::from_name);
    let delay_ms = root.get("delay").and_then(Value::as_f64).map(position_from_f64);

    Ok(PwmUpdate {
        pwm,
        position,
        delay_ms,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetRangeRequest {
    pub min: Position,
    pub max: Position,
}

/// Decode a `/set_range` body.  Both bounds are required integers.
pub fn parse_set_range(body: &[u8]) -> Result<SetRangeRequest, RequestError> {
    serde_json::from_slice(body).map_err(|_| RequestError::InvalidJson)
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

pub fn feed_text(receipt: &FeedReceipt) -> String<TEXT_CAP> {
    let mut out = String::new();
    let _ = write!(
        out,
        "Feeding started with PWM {}, will reset in {} ms",
        receipt.feed_pwm, receipt.reset_delay_ms
    );
    out
}

pub fn set_timer_text(minutes: u32) -> String<TEXT_CAP> {
    let mut out = String::new();
    if minutes > 0 {
        let _ = write!(out, "Auto feeding timer set to {} minutes", minutes);
    } else {
        let _ = out.push_str("Auto feeding timer disabled");
    }
    out
}

pub fn get_timer_text(minutes: u32) -> String<TEXT_CAP> {
    let mut out = String::new();
    let _ = write!(out, "{}", minutes);
    out
}

/// `/set_pwm` response body.
#[derive(Debug, Serialize)]
pub struct PwmResponse<'a> {
    pub message: &'a str,
    pub current_pwm: Position,
    pub default_pwm: Position,
    pub feed_pwm: Position,
    pub reset_delay_ms: u32,
}

impl<'a> From<&'a PwmUpdateOutcome> for PwmResponse<'a> {
    fn from(outcome: &'a PwmUpdateOutcome) -> Self {
        Self {
            message: outcome.message.as_str(),
            current_pwm: outcome.settings.current_pwm,
            default_pwm: outcome.settings.default_pwm,
            feed_pwm: outcome.settings.feed_pwm,
            reset_delay_ms: outcome.settings.reset_delay_ms,
        }
    }
}

/// HTTP status for a `/set_pwm` outcome.  A rejected update still
/// carries the full settings body.
pub fn pwm_status(outcome: &PwmUpdateOutcome) -> u16 {
    if outcome.ok { 200 } else { 400 }
}

/// Body for every error answered as JSON.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}
