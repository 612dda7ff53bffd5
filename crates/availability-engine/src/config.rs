//! Engine configuration read from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AVAILABILITY_SLOT_INTERVAL` | 15 minutes |
//! | `AVAILABILITY_DEFAULT_DURATION` | 30 minutes |
//! | `AVAILABILITY_MAX_DAYS_IN_ADVANCE` | 30 days |
//! | `AVAILABILITY_TIME_OFF_MIN_DURATION` | 30 minutes |
//! | `AVAILABILITY_TIME_OFF_MAX_DURATION_DAYS` | 30 days |
//!
//! The engine uses the first two directly. The rest are read here so intake
//! checks (see [`crate::intake`]) and the engine agree on one source.

use std::env;

use crate::error::{EngineError, Result};

pub const SLOT_INTERVAL_VAR: &str = "AVAILABILITY_SLOT_INTERVAL";
pub const DEFAULT_DURATION_VAR: &str = "AVAILABILITY_DEFAULT_DURATION";
pub const MAX_DAYS_IN_ADVANCE_VAR: &str = "AVAILABILITY_MAX_DAYS_IN_ADVANCE";
pub const TIME_OFF_MIN_DURATION_VAR: &str = "AVAILABILITY_TIME_OFF_MIN_DURATION";
pub const TIME_OFF_MAX_DURATION_DAYS_VAR: &str = "AVAILABILITY_TIME_OFF_MAX_DURATION_DAYS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Step between candidate slot starts, in minutes.
    pub slot_interval_minutes: u32,
    /// Service length used when no service duration can be resolved.
    pub default_duration_minutes: u32,
    pub max_days_in_advance: u32,
    pub time_off_min_minutes: u32,
    pub time_off_max_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_interval_minutes: 15,
            default_duration_minutes: 30,
            max_days_in_advance: 30,
            time_off_min_minutes: 30,
            time_off_max_days: 30,
        }
    }
}

impl EngineConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    /// Returns [`EngineError::Config`] if a variable is set but is not a
    /// positive integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |key: &str, default: u32| -> Result<u32> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => parse_positive(key, &raw),
            }
        };

        Ok(Self {
            slot_interval_minutes: read(SLOT_INTERVAL_VAR, defaults.slot_interval_minutes)?,
            default_duration_minutes: read(
                DEFAULT_DURATION_VAR,
                defaults.default_duration_minutes,
            )?,
            max_days_in_advance: read(MAX_DAYS_IN_ADVANCE_VAR, defaults.max_days_in_advance)?,
            time_off_min_minutes: read(TIME_OFF_MIN_DURATION_VAR, defaults.time_off_min_minutes)?,
            time_off_max_days: read(TIME_OFF_MAX_DURATION_DAYS_VAR, defaults.time_off_max_days)?,
        })
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(EngineError::Config(format!("{} must be positive", key))),
        Ok(value) => Ok(value),
        Err(_) => Err(EngineError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, raw
        ))),
    }
}
