//! Entry Commands
//!
//! Date-placed entities of a project: items, milestones, sub-projects.

use chrono::NaiveDate;
use serde::Serialize;

use timeline_engine::domain::{DateWindow, Item, ItemBatchEntry, Milestone, SubProject};
use timeline_engine::ApiResult;

use super::{call, call_unit};

host_collection!(Item, "item");
host_collection!(Milestone, "milestone");
host_collection!(SubProject, "sub_project");

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WindowArgs<'a> {
    project_id: &'a str,
    start: NaiveDate,
    end: NaiveDate,
}

impl<'a> WindowArgs<'a> {
    fn new(project_id: &'a str, window: DateWindow) -> Self {
        Self {
            project_id,
            start: window.start,
            end: window.end,
        }
    }
}

#[derive(Serialize)]
struct BatchArgs<'a> {
    entries: &'a [ItemBatchEntry],
}

// ========================
// Commands
// ========================

pub async fn list_items(project_id: &str, window: DateWindow) -> ApiResult<Vec<Item>> {
    call("list_items", &WindowArgs::new(project_id, window)).await
}

pub async fn list_milestones(project_id: &str, window: DateWindow) -> ApiResult<Vec<Milestone>> {
    call("list_milestones", &WindowArgs::new(project_id, window)).await
}

/// Sub-projects overlapping the window, not only those starting in it
pub async fn list_sub_projects(project_id: &str, window: DateWindow) -> ApiResult<Vec<SubProject>> {
    call("list_sub_projects", &WindowArgs::new(project_id, window)).await
}

pub async fn batch_update_items(entries: &[ItemBatchEntry]) -> ApiResult<()> {
    call_unit("batch_update_items", &BatchArgs { entries }).await
}
