//! In-memory settings store.
//!
//! Single source of truth for servo configuration.  Values reset to the
//! compiled-in [`FeederConfig`] on every boot.
//!
//! Invariant: `default_pwm` and `feed_pwm` always lie inside `range`.
//! Every setter enforces it, including [`SettingsStore::set_clamp_range`],
//! which re-clamps the stored positions when the range shrinks.

use log::info;
use serde::Serialize;

use crate::config::FeederConfig;
use crate::control::clamp::{clamp, ClampRange, Position};
use crate::error::SettingsError;

/// Point-in-time view of every configuration field plus the live position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsSnapshot {
    pub current_pwm: Position,
    pub default_pwm: Position,
    pub feed_pwm: Position,
    pub reset_delay_ms: u32,
    pub min_pwm: Position,
    pub max_pwm: Position,
    pub auto_feed_minutes: u32,
}

pub struct SettingsStore {
    default_pwm: Position,
    feed_pwm: Position,
    reset_delay_ms: u32,
    range: ClampRange,
    /// Largest duty the PWM peripheral accepts.
    hw_limit: Position,
}

impl SettingsStore {
    pub fn new(config: &FeederConfig) -> Result<Self, SettingsError> {
        let hw_limit = config.max_hw_duty();
        let range = checked_range(config.min_pwm, config.max_pwm, hw_limit)?;
        Ok(Self {
            default_pwm: clamp(config.default_pwm, range),
            feed_pwm: clamp(config.feed_pwm, range),
            reset_delay_ms: config.reset_delay_ms,
            range,
            hw_limit,
        })
    }

    // ── Setters ───────────────────────────────────────────────

    /// Store a new neutral position.  Returns the clamped value stored.
    pub fn set_default_position(&mut self, value: Position) -> Position {
        self.default_pwm = clamp(value, self.range);
        info!("Settings: default position = {}", self.default_pwm);
        self.default_pwm
    }

    /// Store a new dispense position.  Returns the clamped value stored.
    pub fn set_feed_position(&mut self, value: Position) -> Position {
        self.feed_pwm = clamp(value, self.range);
        info!("Settings: feed position = {}", self.feed_pwm);
        self.feed_pwm
    }

    pub fn set_reset_delay(&mut self, ms: u32) {
        self.reset_delay_ms = ms;
        info!("Settings: reset delay = {} ms", ms);
    }

    /// Replace the clamp range and pull both stored positions inside it.
    ///
    /// The store is left untouched when the range is rejected.
    pub fn set_clamp_range(
        &mut self,
        min: Position,
        max: Position,
    ) -> Result<ClampRange, SettingsError> {
        let range = checked_range(min, max, self.hw_limit)?;
        self.range = range;
        self.default_pwm = clamp(self.default_pwm, range);
        self.feed_pwm = clamp(self.feed_pwm, range);
        info!(
            "Settings: clamp range = {}..={} (default={}, feed={})",
            min, max, self.default_pwm, self.feed_pwm
        );
        Ok(range)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn default_position(&self) -> Position {
        self.default_pwm
    }

    pub fn feed_position(&self) -> Position {
        self.feed_pwm
    }

    pub fn reset_delay_ms(&self) -> u32 {
        self.reset_delay_ms
    }

    pub fn range(&self) -> ClampRange {
        self.range
    }

    /// Build a snapshot.  `current_pwm` and `auto_feed_minutes` are owned
    /// elsewhere and supplied by the caller holding the same lock.
    pub fn snapshot(&self, current_pwm: Position, auto_feed_minutes: u32) -> SettingsSnapshot {
        SettingsSnapshot {
            current_pwm,
            default_pwm: self.default_pwm,
            feed_pwm: self.feed_pwm,
            reset_delay_ms: self.reset_delay_ms,
            min_pwm: self.range.min(),
            max_pwm: self.range.max(),
            auto_feed_minutes,
        }
    }
}

fn checked_range(
    min: Position,
    max: Position,
    hw_limit: Position,
) -> Result<ClampRange, SettingsError> {
    if max > hw_limit {
        return Err(SettingsError::OutOfHardwareRange {
            value: max,
            limit: hw_limit,
        });
    }
    ClampRange::new(min, max).ok_or(SettingsError::InvertedRange { min, max })
}
