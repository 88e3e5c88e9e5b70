//! Column virtualization: one fixed-width column per day of the window,
//! plus pointer-x ↔ date translation.

use chrono::NaiveDate;

use crate::domain::DateWindow;
use super::virtualizer::{VirtualItem, Virtualizer};

#[derive(Debug, Clone)]
pub struct DayColumns {
    window: DateWindow,
    column_width: f64,
    inner: Virtualizer,
}

impl DayColumns {
    pub fn new(window: DateWindow, column_width: f64, overscan: usize) -> Self {
        let mut inner = Virtualizer::new(overscan);
        inner.measure(window.days(), |_| column_width);
        Self {
            window,
            column_width,
            inner,
        }
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn column_width(&self) -> f64 {
        self.column_width
    }

    /// Switch to another window; widths are fixed, so this re-measures at once
    pub fn set_window(&mut self, window: DateWindow) {
        if window != self.window {
            self.window = window;
            let width = self.column_width;
            self.inner.measure(window.days(), |_| width);
        }
    }

    pub fn set_scroll(&mut self, scroll_left: f64, viewport_width: f64) {
        self.inner.set_scroll(scroll_left, viewport_width);
    }

    pub fn total_width(&self) -> f64 {
        self.inner.total_size()
    }

    /// Day under a content-space x coordinate
    pub fn date_at(&self, x: f64) -> Option<NaiveDate> {
        if x < 0.0 || self.column_width <= 0.0 {
            return None;
        }
        self.window.date_at((x / self.column_width).floor() as usize)
    }

    /// Left edge of a day's column; dates outside the window land outside
    /// `0..total_width()`
    pub fn x_of(&self, date: NaiveDate) -> f64 {
        (date - self.window.start).num_days() as f64 * self.column_width
    }

    /// Days to render, paired with their slots
    pub fn visible_days(&self) -> Vec<(VirtualItem, NaiveDate)> {
        self.inner
            .virtual_items()
            .into_iter()
            .filter_map(|slot| self.window.date_at(slot.index).map(|d| (slot, d)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn test_pointer_to_date() {
        let cols = DayColumns::new(DateWindow::new(day(1), day(31)), 100.0, 2);
        assert_eq!(cols.total_width(), 3100.0);
        assert_eq!(cols.date_at(0.0), Some(day(1)));
        assert_eq!(cols.date_at(99.9), Some(day(1)));
        assert_eq!(cols.date_at(250.0), Some(day(3)));
        assert_eq!(cols.date_at(-1.0), None);
        assert_eq!(cols.date_at(3100.0), None);
        assert_eq!(cols.x_of(day(3)), 200.0);
    }

    #[test]
    fn test_visible_days() {
        let mut cols = DayColumns::new(DateWindow::new(day(1), day(31)), 100.0, 1);
        cols.set_scroll(1000.0, 300.0);
        let days: Vec<NaiveDate> = cols.visible_days().into_iter().map(|(_, d)| d).collect();
        assert_eq!(days, (10..=14).map(day).collect::<Vec<_>>());
    }
}
