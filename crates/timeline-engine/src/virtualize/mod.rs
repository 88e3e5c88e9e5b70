//! Virtualization Layer
//!
//! Two independent 1-D windows over the grid: rows (workspaces, variable
//! height, estimated by the geometry engine) and columns (days, fixed
//! width).

mod virtualizer;
mod rows;
mod columns;

pub use virtualizer::{Virtualizer, VirtualItem};
pub use rows::{ProjectRow, RowInputs, RowVirtualizer, WorkspaceRow};
pub use columns::DayColumns;
