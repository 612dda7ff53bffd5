//! Overlap tests between schedule intervals.
//!
//! Two boundary conventions are in use. Appointments (and, during slot
//! enumeration, time off) use the half-open test, so intervals that merely
//! touch end-to-start do not conflict. Checking a single requested slot
//! against time off uses the inclusive test, where touching counts.

use crate::model::{Appointment, AppointmentStatus, Interval, TimeOffPeriod};

/// `[a.start, a.end)` and `[b.start, b.end)` share at least one instant.
pub fn overlaps_half_open(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && a.end > b.start
}

/// `[a.start, a.end]` and `[b.start, b.end]` share at least one instant,
/// boundaries included.
pub fn overlaps_inclusive(a: &Interval, b: &Interval) -> bool {
    a.start <= b.end && a.end >= b.start
}

/// A confirmed appointment hit by a time-off period.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOffConflict {
    pub appointment: Appointment,
    pub overlap_minutes: i64,
}

/// Find the confirmed appointments that a time-off period would overlap.
///
/// Used when a provider blocks out time that already has bookings. Only
/// `confirmed` appointments are reported; the overlap duration is
/// `min(a.end, b.end) - max(a.start, b.start)`. Adjacent appointments are not
/// conflicts.
pub fn conflicting_appointments(
    appointments: &[Appointment],
    time_off: &TimeOffPeriod,
) -> Vec<TimeOffConflict> {
    let blocked = time_off.interval();

    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Confirmed)
        .filter(|a| overlaps_half_open(&a.interval(), &blocked))
        .map(|a| {
            let overlap_start = a.start.max(blocked.start);
            let overlap_end = a.end.min(blocked.end);
            TimeOffConflict {
                appointment: a.clone(),
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}
