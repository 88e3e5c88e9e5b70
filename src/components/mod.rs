//! UI Components
//!
//! Leptos components of the timeline grid.

mod timeline_grid;
mod workspace_row;
mod project_row;
mod day_cell;
mod drag_overlay;
mod settings_bar;

pub use timeline_grid::TimelineGrid;
pub use workspace_row::WorkspaceRowView;
pub use project_row::{ProjectRowView, VisibleDays};
pub use day_cell::{DayCell, ItemChip};
pub use drag_overlay::DragOverlay;
pub use settings_bar::SettingsBar;
