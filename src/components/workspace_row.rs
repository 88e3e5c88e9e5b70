//! Workspace Row Component
//!
//! One virtualized row: the workspace header, then its projects unless the
//! workspace is collapsed.

use leptos::prelude::*;
use timeline_engine::virtualize::WorkspaceRow;

use crate::components::{ProjectRowView, VisibleDays};
use crate::context::AppContext;
use crate::models::Project;
use crate::store::{store_toggle_workspace, use_app_store, AppStateStoreFields};

#[component]
pub fn WorkspaceRowView(row: WorkspaceRow, days: VisibleDays) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let metrics = ctx.metrics();
    let workspace = row.workspace.clone();
    let id = workspace.id.clone();
    let collapsed = row.collapsed;

    let on_collapse = {
        let id = id.clone();
        move |_| {
            if ctx.dnd.drag_just_ended_read.get_untracked() {
                return;
            }
            store_toggle_workspace(&store, &id);
        }
    };

    // Swap with the workspace above
    let on_move_up = {
        let id = id.clone();
        move |ev: web_sys::MouseEvent| {
            ev.stop_propagation();
            let mut order: Vec<String> = store
                .structure()
                .with(|s| s.ordered_workspaces().iter().map(|w| w.id.clone()).collect());
            let Some(index) = order.iter().position(|w| *w == id) else { return };
            if index == 0 { return; }
            order.swap(index - 1, index);
            let coordinator = ctx.coordinator();
            ctx.settle("reorder workspaces", async move {
                coordinator.reorder_workspaces(order).await
            });
        }
    };

    let on_add_project = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let position = store.structure().with(|s| s.projects_of(&id).len() as i32);
        let coordinator = ctx.coordinator();
        let draft = Project::new("", "New project", id.clone(), position);
        ctx.settle("create project", async move { coordinator.create(draft).await.map(|_| ()) });
    };

    let projects = (!collapsed).then(|| {
        row.projects
            .into_iter()
            .map(|project| view! { <ProjectRowView row=project days=days /> })
            .collect_view()
    });

    view! {
        <div class="workspace-row">
            <div
                class="workspace-header"
                style=format!("height: {}px; border-left-color: {};", metrics.workspace_header_height, workspace.color)
                on:click=on_collapse
            >
                <span class="workspace-toggle">{if collapsed { "▶" } else { "▼" }}</span>
                <span class="workspace-name">{workspace.name.clone()}</span>
                <button class="workspace-up-btn" title="Move up" on:click=on_move_up>"↑"</button>
                <button class="workspace-add-project-btn" on:click=on_add_project>"+ Project"</button>
            </div>
            {projects}
        </div>
    }
}
