//! Pixel constants of the grid

use serde::{Deserialize, Serialize};

/// Every size the layout math depends on. Defaults match the stylesheet;
/// a host can override them by deserializing its own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridMetrics {
    /// Height of a row whose busiest day holds at most one entry
    pub base_row_height: f64,
    pub item_height: f64,
    pub item_gap: f64,
    /// Vertical padding of a row that stacks entries
    pub row_padding: f64,
    pub sub_project_header_height: f64,
    pub sub_project_min_height: f64,
    pub workspace_header_height: f64,
    pub project_header_height: f64,
    /// Separator between a project's main row and its lanes
    pub border: f64,
    pub column_width: f64,
    pub overscan_rows: usize,
    pub overscan_columns: usize,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            base_row_height: 40.0,
            item_height: 40.0,
            item_gap: 4.0,
            row_padding: 8.0,
            sub_project_header_height: 24.0,
            sub_project_min_height: 64.0,
            workspace_header_height: 36.0,
            project_header_height: 32.0,
            border: 1.0,
            column_width: 120.0,
            overscan_rows: 3,
            overscan_columns: 7,
        }
    }
}
