//! Weekly working-hours sets.
//!
//! A provider always has exactly one [`WorkingHoursRule`] per weekday. The
//! only way to change them is to replace all seven at once, through a
//! validated [`WeeklySchedule`].

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::format;
use crate::model::WorkingHoursRule;

pub const DAYS_PER_WEEK: usize = 7;

const DAY_NAMES: [&str; DAYS_PER_WEEK] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// English name for a weekday index, 0 = Sunday.
pub fn day_name(weekday: u8) -> &'static str {
    DAY_NAMES.get(weekday as usize).copied().unwrap_or("Unknown")
}

/// One entry of a working-hours replacement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursEntry {
    pub weekday: u8,
    #[serde(with = "format::time_opt", default)]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "format::time_opt", default)]
    pub end_time: Option<NaiveTime>,
    pub is_day_off: bool,
}

impl From<WorkingHoursRule> for WorkingHoursEntry {
    fn from(rule: WorkingHoursRule) -> Self {
        Self {
            weekday: rule.weekday,
            start_time: rule.start_time,
            end_time: rule.end_time,
            is_day_off: rule.is_day_off,
        }
    }
}

/// A complete, validated set of seven rules indexed by weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    rules: [WorkingHoursRule; DAYS_PER_WEEK],
}

impl WeeklySchedule {
    /// Validate a replacement set.
    ///
    /// Requires exactly seven entries covering weekdays 0..=6 once each. A
    /// working day needs both times with the start strictly before the end;
    /// times on a day off are dropped.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidWorkingHours`] describing the first
    /// problem found.
    pub fn try_from_entries(entries: &[WorkingHoursEntry]) -> Result<Self> {
        if entries.len() != DAYS_PER_WEEK {
            return Err(EngineError::InvalidWorkingHours(format!(
                "expected {} entries, got {}",
                DAYS_PER_WEEK,
                entries.len()
            )));
        }

        let mut slots: [Option<WorkingHoursRule>; DAYS_PER_WEEK] = [None; DAYS_PER_WEEK];

        for entry in entries {
            let day = entry.weekday as usize;
            if day >= DAYS_PER_WEEK {
                return Err(EngineError::InvalidWorkingHours(format!(
                    "weekday {} is out of range 0..=6",
                    entry.weekday
                )));
            }
            if slots[day].is_some() {
                return Err(EngineError::InvalidWorkingHours(format!(
                    "{} appears more than once",
                    day_name(entry.weekday)
                )));
            }
            slots[day] = Some(rule_from_entry(entry)?);
        }

        let mut rules = [WorkingHoursRule::day_off(0); DAYS_PER_WEEK];
        for (day, slot) in slots.into_iter().enumerate() {
            // Seven in-range, distinct entries fill every slot.
            rules[day] = slot.ok_or_else(|| {
                EngineError::InvalidWorkingHours(format!("{} is missing", DAY_NAMES[day]))
            })?;
        }

        Ok(Self { rules })
    }

    /// Sunday off, Monday–Friday 09:00–17:00, Saturday 10:00–15:00.
    pub fn standard() -> Self {
        let time = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
        let mut rules = [WorkingHoursRule::day_off(0); DAYS_PER_WEEK];
        for weekday in 1..=5u8 {
            rules[weekday as usize] = WorkingHoursRule::working(weekday, time(9), time(17));
        }
        rules[6] = WorkingHoursRule::working(6, time(10), time(15));
        Self { rules }
    }

    pub fn rule(&self, weekday: u8) -> Option<&WorkingHoursRule> {
        self.rules.get(weekday as usize)
    }

    /// The seven rules ordered Sunday first.
    pub fn rules(&self) -> &[WorkingHoursRule; DAYS_PER_WEEK] {
        &self.rules
    }
}

fn rule_from_entry(entry: &WorkingHoursEntry) -> Result<WorkingHoursRule> {
    if entry.is_day_off {
        return Ok(WorkingHoursRule::day_off(entry.weekday));
    }

    let name = day_name(entry.weekday);
    let (Some(start), Some(end)) = (entry.start_time, entry.end_time) else {
        return Err(EngineError::InvalidWorkingHours(format!(
            "{} needs a start and end time unless it is a day off",
            name
        )));
    };
    if start >= end {
        return Err(EngineError::InvalidWorkingHours(format!(
            "{} ends at {} which is not after its start {}",
            name,
            end.format(format::TIME_FORMAT),
            start.format(format::TIME_FORMAT)
        )));
    }

    Ok(WorkingHoursRule::working(entry.weekday, start, end))
}
