//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The engine's
//! caches stay the source of truth; the store mirrors what the grid shows.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use leptos::prelude::*;
use reactive_stores::Store;
use timeline_engine::sync::TimelineCaches;

use crate::models::{DateWindow, ProjectData, Structure};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Workspaces, projects and settings
    pub structure: Structure,
    /// Current-window data per live project id
    pub data: BTreeMap<String, ProjectData>,
    /// Projects whose body (main row and lanes) is expanded
    pub open_projects: BTreeSet<String>,
    /// Workspaces whose stored collapse flag the user flipped
    pub toggled_workspaces: BTreeSet<String>,
    /// Project body heights measured after layout
    pub measured_heights: HashMap<String, f64>,
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Copy the structure cache into the store
pub fn store_sync_structure(store: &AppStore, caches: &TimelineCaches) {
    store.structure().set(caches.structure_value());
}

/// Copy one window of the data cache into the store
pub fn store_sync_data(store: &AppStore, caches: &TimelineCaches, window: DateWindow) {
    store.data().set(caches.window_data(window));
}

/// Expand or collapse a project
pub fn store_toggle_project(store: &AppStore, project_id: &str) {
    store.open_projects().update(|open| {
        if !open.remove(project_id) {
            open.insert(project_id.to_string());
        }
    });
}

/// Collapse or expand a workspace; never written back to the host
pub fn store_toggle_workspace(store: &AppStore, workspace_id: &str) {
    store.toggled_workspaces().update(|toggled| {
        if !toggled.remove(workspace_id) {
            toggled.insert(workspace_id.to_string());
        }
    });
}

/// Record a measured body height; tiny differences are ignored
pub fn store_set_measured_height(store: &AppStore, project_id: &str, height: f64) {
    let known = store.measured_heights().with(|m| m.get(project_id).copied());
    if known.is_some_and(|h| (h - height).abs() < 0.5) {
        return;
    }
    store.measured_heights().update(|m| {
        m.insert(project_id.to_string(), height);
    });
}
