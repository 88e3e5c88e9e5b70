//! Structure Commands
//!
//! Workspaces, projects, ordering and settings.

use serde::Serialize;

use timeline_engine::domain::{Project, SettingsPatch, Structure, Workspace};
use timeline_engine::ApiResult;

use super::{call, call_unit};

host_collection!(Workspace, "workspace");
host_collection!(Project, "project");

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct SettingsArgs<'a> {
    patch: &'a SettingsPatch,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderWorkspacesArgs<'a> {
    ordered_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReorderProjectsArgs<'a> {
    workspace_id: &'a str,
    ordered_ids: &'a [String],
}

// ========================
// Commands
// ========================

pub async fn fetch_structure() -> ApiResult<Structure> {
    call("get_structure", &()).await
}

pub async fn update_settings(patch: &SettingsPatch) -> ApiResult<()> {
    call_unit("update_settings", &SettingsArgs { patch }).await
}

pub async fn reorder_workspaces(ordered_ids: &[String]) -> ApiResult<()> {
    call_unit("reorder_workspaces", &ReorderWorkspacesArgs { ordered_ids }).await
}

pub async fn reorder_projects(workspace_id: &str, ordered_ids: &[String]) -> ApiResult<()> {
    call_unit("reorder_projects", &ReorderProjectsArgs { workspace_id, ordered_ids }).await
}
