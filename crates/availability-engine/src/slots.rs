//! Slot enumeration and single-slot checks over a [`ScheduleSnapshot`].
//!
//! Both operations are pure: the current time is an argument, never read from
//! a clock, so identical inputs always give identical answers.

use chrono::{Duration, NaiveDateTime, Timelike};
use tracing::debug;

use crate::conflict::{overlaps_half_open, overlaps_inclusive};
use crate::error::{EngineError, Result};
use crate::freebusy::{self, FreeWindow};
use crate::model::{Interval, Slot};
use crate::snapshot::ScheduleSnapshot;

/// Outcome of checking one requested slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotVerdict {
    Available,
    /// The provider id is unknown.
    UnknownProvider,
    /// No rule for the weekday, or the rule marks a day off.
    Closed,
    /// The slot starts before opening or ends after closing.
    OutsideHours,
    /// The slot overlaps an occupying appointment.
    Booked,
    /// The slot touches or overlaps a time-off period.
    TimeOff,
}

impl SlotVerdict {
    pub fn is_available(self) -> bool {
        self == SlotVerdict::Available
    }
}

fn ensure_positive(minutes: u32) -> Result<()> {
    if minutes == 0 {
        return Err(EngineError::InvalidDuration(minutes));
    }
    Ok(())
}

/// Round `t` up to the next multiple of `granularity_minutes` counted from the
/// top of its hour. Instants already on the grid are returned unchanged.
fn round_up_to_grid(t: NaiveDateTime, granularity_minutes: u32) -> NaiveDateTime {
    let grid = i64::from(granularity_minutes) * 60;
    let into_hour = i64::from(t.minute()) * 60 + i64::from(t.second());
    let remainder = into_hour % grid;
    let nanos = i64::from(t.nanosecond());

    if remainder == 0 && nanos == 0 {
        return t;
    }
    t - Duration::seconds(remainder) - Duration::nanoseconds(nanos) + Duration::seconds(grid)
}

/// Enumerate the bookable slots on the snapshot's date.
///
/// Candidates start at opening time (or, if that is already past, at the
/// first grid boundary at or after `now`) and advance by
/// `granularity_minutes`. Each candidate spans `duration_minutes`; the walk
/// stops at the first candidate that would end after closing. A candidate is
/// kept when it overlaps no occupying appointment and no time-off period under
/// the half-open test.
///
/// # Errors
/// Returns [`EngineError::InvalidDuration`] if either duration or granularity
/// is zero.
pub fn generate_slots(
    snapshot: &ScheduleSnapshot,
    duration_minutes: u32,
    granularity_minutes: u32,
    now: NaiveDateTime,
) -> Result<Vec<Slot>> {
    ensure_positive(duration_minutes)?;
    ensure_positive(granularity_minutes)?;

    let Some(open) = snapshot.open_interval() else {
        debug!(date = %snapshot.date, "provider closed, no slots");
        return Ok(Vec::new());
    };

    let first = if open.start < now {
        round_up_to_grid(now, granularity_minutes)
    } else {
        open.start
    };

    let busy = freebusy::merge_busy_periods(&snapshot.busy_intervals(), open);
    let step = Duration::minutes(i64::from(granularity_minutes));
    let length = Duration::minutes(i64::from(duration_minutes));

    let mut slots = Vec::new();
    let mut next_busy = 0;
    let mut cursor = first;

    while cursor + length <= open.end {
        let candidate = Interval::new(cursor, cursor + length);

        // Merged busy periods are sorted and disjoint, and candidates only
        // move forward, so anything ending at or before this start is spent.
        while next_busy < busy.len() && busy[next_busy].end <= candidate.start {
            next_busy += 1;
        }
        let blocked = busy
            .get(next_busy)
            .is_some_and(|b| overlaps_half_open(&candidate, b));

        if !blocked {
            slots.push(Slot::from(candidate));
        }
        cursor += step;
    }

    debug!(
        date = %snapshot.date,
        duration_minutes,
        granularity_minutes,
        slots = slots.len(),
        "generated slots"
    );
    Ok(slots)
}

/// Explain whether the slot `[start, start + duration)` can be booked.
///
/// Does not look at the current time; rejecting past requests is left to the
/// intake layer.
///
/// # Errors
/// Returns [`EngineError::InvalidDuration`] for a zero duration.
pub fn explain_slot(
    snapshot: &ScheduleSnapshot,
    start: NaiveDateTime,
    duration_minutes: u32,
) -> Result<SlotVerdict> {
    ensure_positive(duration_minutes)?;

    let Some(open) = snapshot.open_interval() else {
        return Ok(SlotVerdict::Closed);
    };

    let requested = Interval::starting_at(start, duration_minutes);
    if requested.start < open.start || requested.end > open.end {
        return Ok(SlotVerdict::OutsideHours);
    }

    if snapshot
        .appointments
        .iter()
        .any(|a| overlaps_half_open(&requested, &a.interval()))
    {
        return Ok(SlotVerdict::Booked);
    }

    if snapshot
        .time_off
        .iter()
        .any(|t| overlaps_inclusive(&requested, &t.interval()))
    {
        return Ok(SlotVerdict::TimeOff);
    }

    Ok(SlotVerdict::Available)
}

/// Whether the slot `[start, start + duration)` can be booked.
pub fn check_slot(
    snapshot: &ScheduleSnapshot,
    start: NaiveDateTime,
    duration_minutes: u32,
) -> Result<bool> {
    Ok(explain_slot(snapshot, start, duration_minutes)?.is_available())
}

/// Unbooked stretches of the working day, independent of any service length.
pub fn day_free_windows(snapshot: &ScheduleSnapshot) -> Vec<FreeWindow> {
    match snapshot.open_interval() {
        Some(open) => freebusy::find_free_windows(&snapshot.busy_intervals(), open),
        None => Vec::new(),
    }
}
