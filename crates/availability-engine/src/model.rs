//! Schedule records the engine reads, and the slots it produces.
//!
//! All timestamps are naive local times in the provider's own timezone. The
//! engine never converts between zones; callers pick the zone once, when they
//! compute "now".

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::format;

pub type ProviderId = i64;
pub type ServiceId = i64;
pub type TimeOffId = i64;
pub type AppointmentId = i64;

/// Weekday index used by working-hours rules: 0 = Sunday … 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A closed-open span of local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// An interval of `minutes` starting at `start`.
    pub fn starting_at(start: NaiveDateTime, minutes: u32) -> Self {
        Self {
            start,
            end: start + Duration::minutes(i64::from(minutes)),
        }
    }
}

/// Recurring opening hours for one weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHoursRule {
    pub weekday: u8,
    #[serde(with = "format::time_opt", default)]
    pub start_time: Option<NaiveTime>,
    #[serde(with = "format::time_opt", default)]
    pub end_time: Option<NaiveTime>,
    pub is_day_off: bool,
}

impl WorkingHoursRule {
    pub fn working(weekday: u8, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            weekday,
            start_time: Some(start_time),
            end_time: Some(end_time),
            is_day_off: false,
        }
    }

    pub fn day_off(weekday: u8) -> Self {
        Self {
            weekday,
            start_time: None,
            end_time: None,
            is_day_off: true,
        }
    }

    /// Opening and closing instants anchored to `date`, or `None` when the
    /// provider does not work that day.
    ///
    /// A rule that is not marked off but lacks either time is treated as
    /// closed.
    pub fn open_interval(&self, date: NaiveDate) -> Option<Interval> {
        if self.is_day_off {
            return None;
        }
        let (start, end) = (self.start_time?, self.end_time?);
        Some(Interval::new(date.and_time(start), date.and_time(end)))
    }
}

/// An ad-hoc exclusion window layered over the weekly hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffPeriod {
    pub id: TimeOffId,
    #[serde(with = "format::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "format::datetime")]
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TimeOffPeriod {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    #[default]
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether an appointment in this state blocks the provider's time.
    pub fn is_occupying(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }
}

/// A booked appointment. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(with = "format::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "format::datetime")]
    pub end: NaiveDateTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn is_occupying(&self) -> bool {
        self.status.is_occupying()
    }
}

/// A bookable interval of exactly the requested service duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "format::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "format::datetime")]
    pub end: NaiveDateTime,
}

impl From<Interval> for Slot {
    fn from(i: Interval) -> Self {
        Self {
            start: i.start,
            end: i.end,
        }
    }
}
