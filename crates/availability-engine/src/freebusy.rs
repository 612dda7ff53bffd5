//! Free and busy time within one working day.
//!
//! Appointments and time off are reduced to a union of disjoint busy periods
//! clipped to opening hours. The slot walk tests candidates against that
//! union, and the free windows are whatever opening time it leaves over.

use std::iter;

use chrono::NaiveDateTime;

use crate::model::Interval;

/// A free window inside a provider's working day.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FreeWindow {
    #[serde(with = "crate::format::datetime")]
    pub start: NaiveDateTime,
    #[serde(with = "crate::format::datetime")]
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl FreeWindow {
    fn between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// The part of `busy` inside `window`, if any. Zero-length intervals on the
/// window edges fall outside it.
fn clip(busy: &Interval, window: Interval) -> Option<Interval> {
    (busy.start < window.end && busy.end > window.start)
        .then(|| Interval::new(busy.start.max(window.start), busy.end.min(window.end)))
}

/// Union of `busy` clipped to `window`, as sorted disjoint intervals.
///
/// Touching intervals are joined. Under the half-open overlap test a
/// candidate conflicts with the union exactly when it conflicts with one of
/// the inputs, so callers may test against either.
pub fn merge_busy_periods(busy: &[Interval], window: Interval) -> Vec<Interval> {
    let mut clipped: Vec<Interval> = busy.iter().filter_map(|b| clip(b, window)).collect();
    clipped.sort_unstable();

    clipped.into_iter().fold(Vec::new(), |mut union, next| {
        match union.last_mut() {
            Some(last) if next.start <= last.end => last.end = last.end.max(next.end),
            _ => union.push(next),
        }
        union
    })
}

/// Stretches of `window` left uncovered by `busy`, in order.
pub fn find_free_windows(busy: &[Interval], window: Interval) -> Vec<FreeWindow> {
    let union = merge_busy_periods(busy, window);

    // Each gap runs from the end of one busy period (or opening) to the start
    // of the next (or closing).
    let gap_starts = iter::once(window.start).chain(union.iter().map(|b| b.end));
    let gap_ends = union.iter().map(|b| b.start).chain(iter::once(window.end));

    gap_starts
        .zip(gap_ends)
        .filter(|(start, end)| start < end)
        .map(|(start, end)| FreeWindow::between(start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn touching_intervals_merge_into_one() {
        let busy = [
            Interval::new(at(10, 0), at(10, 30)),
            Interval::new(at(10, 30), at(11, 0)),
        ];
        let merged = merge_busy_periods(&busy, Interval::new(at(9, 0), at(17, 0)));
        assert_eq!(merged, vec![Interval::new(at(10, 0), at(11, 0))]);
    }

    #[test]
    fn busy_time_outside_window_is_clipped() {
        let busy = [Interval::new(at(7, 0), at(9, 30))];
        let merged = merge_busy_periods(&busy, Interval::new(at(9, 0), at(17, 0)));
        assert_eq!(merged, vec![Interval::new(at(9, 0), at(9, 30))]);
    }

    #[test]
    fn gaps_run_between_busy_periods() {
        let busy = [
            Interval::new(at(12, 0), at(13, 0)),
            Interval::new(at(10, 0), at(10, 30)),
            Interval::new(at(12, 30), at(14, 0)),
        ];
        let free = find_free_windows(&busy, Interval::new(at(9, 0), at(17, 0)));
        let spans: Vec<_> = free.iter().map(|w| (w.start, w.end, w.duration_minutes)).collect();
        assert_eq!(
            spans,
            vec![
                (at(9, 0), at(10, 0), 60),
                (at(10, 30), at(12, 0), 90),
                (at(14, 0), at(17, 0), 180),
            ]
        );
    }

    #[test]
    fn zero_length_busy_on_the_edge_is_ignored() {
        let busy = [Interval::new(at(9, 0), at(9, 0))];
        assert!(merge_busy_periods(&busy, Interval::new(at(9, 0), at(17, 0))).is_empty());
    }

    #[test]
    fn fully_booked_window_has_no_free_time() {
        let busy = [Interval::new(at(8, 0), at(18, 0))];
        assert!(find_free_windows(&busy, Interval::new(at(9, 0), at(17, 0))).is_empty());
    }
}
