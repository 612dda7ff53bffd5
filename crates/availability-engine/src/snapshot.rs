//! Schedule snapshot loading.
//!
//! A [`ScheduleSnapshot`] holds the minimal facts needed to answer
//! availability questions for one provider on one calendar date. It is built
//! fresh per request from a [`ScheduleSource`] and has no lifecycle of its own.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::conflict::overlaps_inclusive;
use crate::error::Result;
use crate::model::{
    weekday_index, Appointment, Interval, ProviderId, ServiceId, TimeOffPeriod, WorkingHoursRule,
};

/// Read access to stored schedule records.
///
/// Every provider-scoped method returns [`EngineError::NotFound`] when the
/// provider does not exist. Range queries may return a superset of the
/// matching records; the loader re-applies the exact predicates.
///
/// [`EngineError::NotFound`]: crate::error::EngineError::NotFound
pub trait ScheduleSource {
    /// The recurring rule for `weekday` (0 = Sunday), if one is stored.
    fn working_hours_for(
        &self,
        provider: ProviderId,
        weekday: u8,
    ) -> Result<Option<WorkingHoursRule>>;

    /// Time-off periods intersecting `[from, to]`, bounds inclusive.
    fn time_off_overlapping(
        &self,
        provider: ProviderId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<TimeOffPeriod>>;

    /// Appointments starting on `date`, any status.
    fn appointments_on(&self, provider: ProviderId, date: NaiveDate) -> Result<Vec<Appointment>>;

    /// Duration in minutes of a service, `None` if the id is unknown.
    fn service_duration(&self, service: ServiceId) -> Result<Option<u32>>;
}

impl<T: ScheduleSource + ?Sized> ScheduleSource for &T {
    fn working_hours_for(
        &self,
        provider: ProviderId,
        weekday: u8,
    ) -> Result<Option<WorkingHoursRule>> {
        (**self).working_hours_for(provider, weekday)
    }

    fn time_off_overlapping(
        &self,
        provider: ProviderId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<TimeOffPeriod>> {
        (**self).time_off_overlapping(provider, from, to)
    }

    fn appointments_on(&self, provider: ProviderId, date: NaiveDate) -> Result<Vec<Appointment>> {
        (**self).appointments_on(provider, date)
    }

    fn service_duration(&self, service: ServiceId) -> Result<Option<u32>> {
        (**self).service_duration(service)
    }
}

/// Point-in-time schedule facts for one provider and date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSnapshot {
    pub date: NaiveDate,
    /// Rule for the date's weekday; `None` behaves exactly like a day off.
    pub rule: Option<WorkingHoursRule>,
    /// Time off intersecting the calendar day, boundaries inclusive.
    pub time_off: Vec<TimeOffPeriod>,
    /// Occupying appointments that start on the date.
    pub appointments: Vec<Appointment>,
}

impl ScheduleSnapshot {
    /// A snapshot with the given rule and nothing booked or blocked.
    pub fn new(date: NaiveDate, rule: Option<WorkingHoursRule>) -> Self {
        Self {
            date,
            rule,
            time_off: Vec::new(),
            appointments: Vec::new(),
        }
    }

    pub fn with_time_off(mut self, periods: impl IntoIterator<Item = TimeOffPeriod>) -> Self {
        self.time_off.extend(periods);
        self
    }

    /// Adds appointments, dropping those that do not occupy time.
    pub fn with_appointments(
        mut self,
        appointments: impl IntoIterator<Item = Appointment>,
    ) -> Self {
        self.appointments
            .extend(appointments.into_iter().filter(Appointment::is_occupying));
        self
    }

    /// Opening hours anchored to the snapshot date, `None` when closed.
    pub fn open_interval(&self) -> Option<Interval> {
        self.rule.as_ref()?.open_interval(self.date)
    }

    /// Every interval that blocks a booking: occupying appointments followed
    /// by time-off periods.
    pub fn busy_intervals(&self) -> Vec<Interval> {
        self.appointments
            .iter()
            .map(Appointment::interval)
            .chain(self.time_off.iter().map(TimeOffPeriod::interval))
            .collect()
    }
}

/// The calendar day `[date 00:00:00, date 23:59:59]` used to select time off.
pub fn day_bounds(date: NaiveDate) -> Interval {
    let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Interval::new(date.and_time(NaiveTime::MIN), date.and_time(last_second))
}

/// Assemble the snapshot for `provider` on `date`.
///
/// # Errors
/// Returns [`EngineError::NotFound`](crate::error::EngineError::NotFound) for
/// an unknown provider, and propagates storage failures.
pub fn load_snapshot<S: ScheduleSource + ?Sized>(
    source: &S,
    provider: ProviderId,
    date: NaiveDate,
) -> Result<ScheduleSnapshot> {
    let weekday = weekday_index(date);
    let rule = source.working_hours_for(provider, weekday)?;

    let day = day_bounds(date);
    let time_off: Vec<TimeOffPeriod> = source
        .time_off_overlapping(provider, day.start, day.end)?
        .into_iter()
        .filter(|t| overlaps_inclusive(&t.interval(), &day))
        .collect();

    let appointments: Vec<Appointment> = source
        .appointments_on(provider, date)?
        .into_iter()
        .filter(|a| a.start.date() == date && a.is_occupying())
        .collect();

    debug!(
        provider,
        %date,
        weekday,
        has_rule = rule.is_some(),
        time_off = time_off.len(),
        appointments = appointments.len(),
        "loaded schedule snapshot"
    );

    Ok(ScheduleSnapshot {
        date,
        rule,
        time_off,
        appointments,
    })
}

/// Resolve the service duration for a query.
///
/// A missing or unknown service id falls back to `default_minutes`, as does a
/// stored duration of zero. Only storage failures are errors.
pub fn resolve_duration<S: ScheduleSource + ?Sized>(
    source: &S,
    service: Option<ServiceId>,
    default_minutes: u32,
) -> Result<u32> {
    let Some(service) = service else {
        return Ok(default_minutes);
    };

    match source.service_duration(service)? {
        Some(minutes) if minutes > 0 => Ok(minutes),
        Some(_) => {
            debug!(service, default_minutes, "service has zero duration, using default");
            Ok(default_minutes)
        }
        None => {
            debug!(service, default_minutes, "unknown service, using default duration");
            Ok(default_minutes)
        }
    }
}
