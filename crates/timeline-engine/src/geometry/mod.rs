//! Geometry Engine
//!
//! Pure functions from entity collections to pixel heights and lane
//! assignments. Same inputs, same outputs: the virtualizer relies on that
//! to keep its estimates stable between frames.

mod metrics;
mod heights;
mod lanes;
mod rect;

pub use metrics::GridMetrics;
pub use heights::{max_items_per_day, max_items_per_day_in, row_height, project_expanded_height, ProjectHeight};
pub use lanes::{pack_lanes, lane_of, Lane};
pub use rect::{Point, Rect};
