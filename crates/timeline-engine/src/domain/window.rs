//! Inclusive day range the grid currently covers

use chrono::{Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Longest stretch a window reaches on either side of its anchor
pub const MAX_WINDOW_DAYS: i64 = 3650;

pub(crate) fn clamp_window_days(days: i64) -> i64 {
    days.clamp(0, MAX_WINDOW_DAYS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// `past_days` before the anchor through `future_days` after it. Both
    /// counts are clamped to `0..=MAX_WINDOW_DAYS`; an end past the
    /// calendar's range falls back to the anchor.
    pub fn around(anchor: NaiveDate, past_days: i64, future_days: i64) -> Self {
        let start = anchor
            .checked_sub_days(Days::new(clamp_window_days(past_days) as u64))
            .unwrap_or(anchor);
        let end = anchor
            .checked_add_days(Days::new(clamp_window_days(future_days) as u64))
            .unwrap_or(anchor);
        Self::new(start, end)
    }

    /// Number of day columns, both ends included
    pub fn days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether an inclusive range touches this window
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && self.start <= end
    }

    /// Date of the column at `index`, if it lies inside the window
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        (index < self.days()).then(|| self.start + Duration::days(index as i64))
    }

    /// Column index of `date`, if it lies inside the window
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date).then(|| (date - self.start).num_days() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_around_counts_both_ends() {
        let w = DateWindow::around(day(3, 10), 2, 3);
        assert_eq!(w.start, day(3, 8));
        assert_eq!(w.end, day(3, 13));
        assert_eq!(w.days(), 6);
    }

    #[test]
    fn test_around_clamps_huge_counts() {
        let anchor = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let w = DateWindow::around(anchor, 1_000_000_000, 10);
        assert_eq!(w.start, anchor - Duration::days(MAX_WINDOW_DAYS));
        assert_eq!(w.end, day(1, 11));

        let w = DateWindow::around(anchor, i64::MIN, i64::MAX);
        assert_eq!(w.start, anchor);
        assert_eq!(w.days() as i64, MAX_WINDOW_DAYS + 1);
    }

    #[test]
    fn test_around_near_calendar_edge_falls_back_to_anchor() {
        let w = DateWindow::around(NaiveDate::MAX, 0, 5);
        assert_eq!(w.start, NaiveDate::MAX);
        assert_eq!(w.end, NaiveDate::MAX);
    }

    #[test]
    fn test_index_round_trip_across_month() {
        let w = DateWindow::new(day(2, 27), day(3, 5));
        assert_eq!(w.index_of(day(3, 1)), Some(3)); // leap year
        assert_eq!(w.date_at(3), Some(day(3, 1)));
        assert_eq!(w.date_at(w.days()), None);
        assert_eq!(w.index_of(day(3, 6)), None);
    }
}
