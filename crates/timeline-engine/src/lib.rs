//! Timeline Grid Engine
//!
//! Layered like the app it serves:
//! - domain: workspaces, projects and the date-placed entities they own
//! - geometry: row heights and sub-project lane packing
//! - virtualize: row/column windows over the grid
//! - dnd: hit-testing, drag state machine, drop animation handoff
//! - sync: caches and the optimistic mutation coordinator
//!
//! Nothing in here touches the DOM; the UI crate feeds in rectangles,
//! pointer positions and scroll offsets.

pub mod domain;
pub mod error;
pub mod geometry;
pub mod virtualize;
pub mod dnd;
pub mod sync;

pub use error::{ApiError, ApiResult, SyncError, SyncResult};
