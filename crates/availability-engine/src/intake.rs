//! Request checks that belong in front of the engine.
//!
//! The engine answers for any date or instant it is given. Booking horizons,
//! past-time rejection and time-off length limits are policy for whichever
//! layer accepts requests; these helpers apply them using an
//! [`EngineConfig`].

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// A requested date must be today or later and within the booking horizon.
pub fn validate_booking_date(
    date: NaiveDate,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<()> {
    if date < today {
        return Err(EngineError::Rejected(format!("{} is in the past", date)));
    }
    let horizon = today + Duration::days(i64::from(config.max_days_in_advance));
    if date > horizon {
        return Err(EngineError::Rejected(format!(
            "{} is more than {} days ahead",
            date, config.max_days_in_advance
        )));
    }
    Ok(())
}

/// A requested slot must not start before `now`.
pub fn validate_slot_time(start: NaiveDateTime, now: NaiveDateTime) -> Result<()> {
    if start < now {
        return Err(EngineError::Rejected(format!(
            "{} is in the past",
            start.format(crate::format::DATETIME_FORMAT)
        )));
    }
    Ok(())
}

/// A new time-off period must end after it starts, start today or later, and
/// fall within the configured length limits.
pub fn validate_time_off(
    start: NaiveDateTime,
    end: NaiveDateTime,
    now: NaiveDateTime,
    config: &EngineConfig,
) -> Result<()> {
    if end <= start {
        return Err(EngineError::Rejected(
            "time off must end after it starts".to_string(),
        ));
    }
    if start.date() < now.date() {
        return Err(EngineError::Rejected(
            "time off cannot start before today".to_string(),
        ));
    }

    let length = end - start;
    if length < Duration::minutes(i64::from(config.time_off_min_minutes)) {
        return Err(EngineError::Rejected(format!(
            "time off must last at least {} minutes",
            config.time_off_min_minutes
        )));
    }
    if length > Duration::days(i64::from(config.time_off_max_days)) {
        return Err(EngineError::Rejected(format!(
            "time off cannot last more than {} days",
            config.time_off_max_days
        )));
    }
    Ok(())
}
