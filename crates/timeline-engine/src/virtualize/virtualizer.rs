//! Headless 1-D virtualizer: prefix offsets over item sizes, offset → index
//! lookup, and an overscanned visible range.

use std::ops::Range;

/// One rendered slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    pub start: f64,
    pub size: f64,
}

impl VirtualItem {
    pub fn end(&self) -> f64 {
        self.start + self.size
    }
}

#[derive(Debug, Clone, Default)]
pub struct Virtualizer {
    sizes: Vec<f64>,
    starts: Vec<f64>,
    overscan: usize,
    scroll_offset: f64,
    viewport_size: f64,
    remeasure_pending: bool,
}

impl Virtualizer {
    pub fn new(overscan: usize) -> Self {
        Self {
            overscan,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Drop every cached size and estimate `count` items from scratch
    pub fn measure(&mut self, count: usize, mut estimate: impl FnMut(usize) -> f64) {
        self.sizes = (0..count).map(|i| estimate(i).max(0.0)).collect();
        self.rebuild_starts(0);
        self.remeasure_pending = false;
    }

    /// Record a measured size for one item and shift everything after it
    pub fn resize_item(&mut self, index: usize, size: f64) {
        if let Some(slot) = self.sizes.get_mut(index) {
            let size = size.max(0.0);
            if *slot != size {
                *slot = size;
                self.rebuild_starts(index);
            }
        }
    }

    fn rebuild_starts(&mut self, from: usize) {
        self.starts.resize(self.sizes.len(), 0.0);
        let mut offset = if from == 0 {
            0.0
        } else {
            self.starts[from - 1] + self.sizes[from - 1]
        };
        for i in from..self.sizes.len() {
            self.starts[i] = offset;
            offset += self.sizes[i];
        }
    }

    pub fn set_scroll(&mut self, scroll_offset: f64, viewport_size: f64) {
        self.scroll_offset = scroll_offset.max(0.0);
        self.viewport_size = viewport_size.max(0.0);
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Ask for a remeasure after the host's next layout pass. Idempotent.
    pub fn schedule_remeasure(&mut self) {
        self.remeasure_pending = true;
    }

    pub fn remeasure_pending(&self) -> bool {
        self.remeasure_pending
    }

    /// Second half of the two-phase remeasure: called once layout settled.
    /// Returns whether a remeasure actually ran.
    pub fn after_layout(&mut self, count: usize, estimate: impl FnMut(usize) -> f64) -> bool {
        if !self.remeasure_pending {
            return false;
        }
        self.measure(count, estimate);
        true
    }

    pub fn total_size(&self) -> f64 {
        match (self.starts.last(), self.sizes.last()) {
            (Some(start), Some(size)) => start + size,
            _ => 0.0,
        }
    }

    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    pub fn size_of(&self, index: usize) -> Option<f64> {
        self.sizes.get(index).copied()
    }

    /// Item covering `offset`; offsets past the end map to the last item
    pub fn index_at(&self, offset: f64) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let after = self.starts.partition_point(|start| *start <= offset);
        Some(after.saturating_sub(1).min(self.len() - 1))
    }

    /// Indices intersecting the viewport, widened by the overscan on both sides
    pub fn visible_range(&self) -> Range<usize> {
        let Some(first) = self.index_at(self.scroll_offset) else {
            return 0..0;
        };
        let viewport_end = self.scroll_offset + self.viewport_size;
        let last = self
            .starts
            .partition_point(|start| *start < viewport_end)
            .saturating_sub(1)
            .max(first);
        let begin = first.saturating_sub(self.overscan);
        let end = (last + 1 + self.overscan).min(self.len());
        begin..end
    }

    pub fn virtual_items(&self) -> Vec<VirtualItem> {
        self.visible_range()
            .map(|index| VirtualItem {
                index,
                start: self.starts[index],
                size: self.sizes[index],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(count: usize, size: f64, overscan: usize) -> Virtualizer {
        let mut v = Virtualizer::new(overscan);
        v.measure(count, |_| size);
        v
    }

    #[test]
    fn test_offsets_are_prefix_sums() {
        let mut v = Virtualizer::new(0);
        v.measure(4, |i| (i as f64 + 1.0) * 10.0);
        assert_eq!(v.start_of(0), Some(0.0));
        assert_eq!(v.start_of(3), Some(60.0));
        assert_eq!(v.total_size(), 100.0);
    }

    #[test]
    fn test_index_at() {
        let v = fixed(10, 50.0, 0);
        assert_eq!(v.index_at(0.0), Some(0));
        assert_eq!(v.index_at(49.9), Some(0));
        assert_eq!(v.index_at(50.0), Some(1));
        assert_eq!(v.index_at(10_000.0), Some(9));
        assert_eq!(Virtualizer::new(0).index_at(0.0), None);
    }

    #[test]
    fn test_visible_range_with_overscan() {
        let mut v = fixed(100, 50.0, 3);
        v.set_scroll(500.0, 200.0);
        // rows 10..=13 are on screen
        assert_eq!(v.visible_range(), 7..17);

        v.set_scroll(0.0, 200.0);
        assert_eq!(v.visible_range(), 0..7);

        v.set_scroll(4_900.0, 200.0);
        assert_eq!(v.visible_range(), 95..100);
    }

    #[test]
    fn test_resize_item_shifts_followers() {
        let mut v = fixed(5, 10.0, 0);
        v.resize_item(1, 30.0);
        assert_eq!(v.start_of(1), Some(10.0));
        assert_eq!(v.start_of(2), Some(40.0));
        assert_eq!(v.total_size(), 70.0);
    }

    #[test]
    fn test_remeasure_waits_for_layout() {
        let mut v = fixed(3, 10.0, 0);
        v.schedule_remeasure();
        v.schedule_remeasure();
        assert!(v.remeasure_pending());
        assert_eq!(v.total_size(), 30.0);

        assert!(v.after_layout(3, |_| 20.0));
        assert_eq!(v.total_size(), 60.0);
        assert!(!v.after_layout(3, |_| 99.0));
        assert_eq!(v.total_size(), 60.0);
    }
}
