//! Drop Animation Registry
//!
//! Write-once/read-once handoff of the drag overlay's last rectangle to the
//! cell the entity lands in, which animates from there to its resting spot.

use std::collections::HashMap;

use crate::geometry::Rect;

#[derive(Debug, Clone, Default)]
pub struct DropAnimationRegistry {
    records: HashMap<String, Rect>,
}

impl DropAnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the landing rectangle for a drag id, replacing any earlier one
    pub fn register(&mut self, drag_id: impl Into<String>, rect: Rect) {
        self.records.insert(drag_id.into(), rect);
    }

    /// Take the rectangle for a drag id; a second call yields `None`
    pub fn consume(&mut self, drag_id: &str) -> Option<Rect> {
        self.records.remove(drag_id)
    }

    /// Forget records no entity consumed, e.g. one dropped outside the window
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
