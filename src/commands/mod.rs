//! Host Command Wrappers
//!
//! `HostApi` implements the engine's remote contract by forwarding every
//! call to the desktop host over IPC, organized by domain.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use timeline_engine::domain::{DateWindow, Item, ItemBatchEntry, Milestone, SettingsPatch, Structure, SubProject};
use timeline_engine::sync::TimelineApi;
use timeline_engine::{ApiError, ApiResult};

/// `create_<name>`, `update_<name>` and `delete_<name>` for one entity type
macro_rules! host_collection {
    ($ty:ty, $name:literal) => {
        #[async_trait::async_trait(?Send)]
        impl timeline_engine::sync::RemoteCollection<$ty> for crate::commands::HostApi {
            async fn create(&self, draft: &$ty) -> timeline_engine::ApiResult<$ty> {
                crate::commands::call(concat!("create_", $name), &crate::commands::DraftArgs { draft }).await
            }

            async fn update(
                &self,
                id: &str,
                patch: &<$ty as timeline_engine::domain::Entity>::Patch,
            ) -> timeline_engine::ApiResult<()> {
                crate::commands::call_unit(concat!("update_", $name), &crate::commands::PatchArgs { id, patch }).await
            }

            async fn delete(&self, id: &str) -> timeline_engine::ApiResult<()> {
                crate::commands::call_unit(concat!("delete_", $name), &crate::commands::IdArgs { id }).await
            }
        }
    };
}

mod structure;
mod entries;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["window", "__TAURI__", "core"])]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

// ========================
// Shared Argument Structs
// ========================

#[derive(Serialize)]
struct DraftArgs<'a, T> {
    draft: &'a T,
}

#[derive(Serialize)]
struct PatchArgs<'a, P> {
    id: &'a str,
    patch: &'a P,
}

#[derive(Serialize)]
struct IdArgs<'a> {
    id: &'a str,
}

/// The desktop host's store
#[derive(Debug, Clone, Copy, Default)]
pub struct HostApi;

/// Hosts reject with a serialized `ApiError`; anything else is a transport failure
fn host_error(err: JsValue) -> ApiError {
    serde_wasm_bindgen::from_value::<ApiError>(err.clone()).unwrap_or_else(|_| {
        ApiError::Transport(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
    })
}

async fn send<A: Serialize>(cmd: &str, args: &A) -> ApiResult<JsValue> {
    let js_args = serde_wasm_bindgen::to_value(args).map_err(|e| ApiError::Transport(e.to_string()))?;
    invoke(cmd, js_args).await.map_err(|e| {
        let err = host_error(e);
        log::warn!("[IPC] {} failed: {}", cmd, err);
        err
    })
}

/// Call a command and decode its answer
async fn call<A: Serialize, R: DeserializeOwned>(cmd: &str, args: &A) -> ApiResult<R> {
    let result = send(cmd, args).await?;
    serde_wasm_bindgen::from_value(result).map_err(|e| ApiError::Transport(e.to_string()))
}

/// Call a command whose answer is `()` on success
async fn call_unit<A: Serialize>(cmd: &str, args: &A) -> ApiResult<()> {
    send(cmd, args).await.map(|_| ())
}

#[async_trait(?Send)]
impl TimelineApi for HostApi {
    async fn fetch_structure(&self) -> ApiResult<Structure> {
        structure::fetch_structure().await
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> ApiResult<()> {
        structure::update_settings(patch).await
    }

    async fn reorder_workspaces(&self, ordered_ids: &[String]) -> ApiResult<()> {
        structure::reorder_workspaces(ordered_ids).await
    }

    async fn reorder_projects(&self, workspace_id: &str, ordered_ids: &[String]) -> ApiResult<()> {
        structure::reorder_projects(workspace_id, ordered_ids).await
    }

    async fn batch_update_items(&self, entries: &[ItemBatchEntry]) -> ApiResult<()> {
        entries::batch_update_items(entries).await
    }

    async fn list_items(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Item>> {
        entries::list_items(project_id, window).await
    }

    async fn list_milestones(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Milestone>> {
        entries::list_milestones(project_id, window).await
    }

    async fn list_sub_projects(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<SubProject>> {
        entries::list_sub_projects(project_id, window).await
    }
}
