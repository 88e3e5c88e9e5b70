//! Remote store contract
//!
//! The store itself lives outside this crate (the desktop host in the app,
//! an in-memory fake in tests). Futures are `!Send`: everything runs on the
//! UI thread.

use async_trait::async_trait;

use crate::domain::{
    DateWindow, Entity, Item, ItemBatchEntry, Milestone, Project, SettingsPatch, Structure,
    SubProject, Workspace,
};
use crate::error::ApiResult;

/// Create/update/delete for one entity collection
#[async_trait(?Send)]
pub trait RemoteCollection<T: Entity> {
    /// Persist `draft` (its id is a temporary one) and return the stored
    /// entity under its canonical id
    async fn create(&self, draft: &T) -> ApiResult<T>;

    async fn update(&self, id: &str, patch: &T::Patch) -> ApiResult<()>;

    async fn delete(&self, id: &str) -> ApiResult<()>;
}

/// Everything the timeline needs from the store
#[async_trait(?Send)]
pub trait TimelineApi:
    RemoteCollection<Workspace>
    + RemoteCollection<Project>
    + RemoteCollection<SubProject>
    + RemoteCollection<Item>
    + RemoteCollection<Milestone>
{
    /// Workspaces, projects and settings in one read
    async fn fetch_structure(&self) -> ApiResult<Structure>;

    async fn update_settings(&self, patch: &SettingsPatch) -> ApiResult<()>;

    async fn reorder_workspaces(&self, ordered_ids: &[String]) -> ApiResult<()>;

    async fn reorder_projects(&self, workspace_id: &str, ordered_ids: &[String]) -> ApiResult<()>;

    async fn batch_update_items(&self, entries: &[ItemBatchEntry]) -> ApiResult<()>;

    async fn list_items(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Item>>;

    async fn list_milestones(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Milestone>>;

    /// Sub-projects overlapping the window
    async fn list_sub_projects(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<SubProject>>;
}
