//! Timeline Frontend App
//!
//! Wires the engine caches to the store, loads what the grid needs and
//! lays out the toolbar, the grid and the drag overlay.

use std::rc::Rc;

use chrono::NaiveDate;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::{bind_global_handlers, create_dnd_signals};
use reactive_stores::Store;
use timeline_engine::geometry::GridMetrics;
use timeline_engine::sync::{MutationCoordinator, TimelineCaches};

use crate::commands::HostApi;
use crate::components::{DragOverlay, SettingsBar, TimelineGrid};
use crate::context::AppContext;
use crate::models::{is_temp_id, DataKey, DateWindow, Settings};
use crate::store::{store_sync_data, store_sync_structure, AppState, AppStateStoreFields};

/// Local calendar date
pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

#[component]
pub fn App() -> impl IntoView {
    let metrics = GridMetrics::default();
    let caches = TimelineCaches::new();
    let coordinator = Rc::new(MutationCoordinator::new(Rc::new(HostApi), caches.clone()));

    let store = Store::new(AppState::default());
    provide_context(store);

    let defaults = Settings::default();
    let window = signal(DateWindow::around(today(), defaults.past_days, defaults.future_days));
    let error = signal(None::<String>);
    let dnd = create_dnd_signals(metrics.column_width);
    let ctx = AppContext::new(coordinator, window, metrics, dnd, error);
    provide_context(ctx);

    // Mirror every cache change into the store
    {
        let structure_caches = caches.clone();
        caches.structure.subscribe(move |version| {
            log::debug!("[APP] structure cache v{}", version);
            store_sync_structure(&store, &structure_caches);
            store_sync_data(&store, &structure_caches, ctx.window.get_untracked());
        });
        let data_caches = caches.clone();
        caches.data.subscribe(move |_| {
            store_sync_data(&store, &data_caches, ctx.window.get_untracked());
        });
    }

    // Column window follows the settings
    Effect::new(move |_| {
        let (past, future) = store
            .structure()
            .with(|s| (s.settings.past_days, s.settings.future_days));
        ctx.set_window(DateWindow::around(today(), past, future));
    });

    {
        let caches = caches.clone();
        Effect::new(move |_| {
            let window = ctx.window.get();
            store_sync_data(&store, &caches, window);
        });
    }

    // Fetch the window of every live project not cached yet
    Effect::new(move |_| {
        let window = ctx.window.get();
        let project_ids: Vec<String> = store.structure().with(|s| {
            s.live_project_ids()
                .into_iter()
                .filter(|id| !is_temp_id(id))
                .map(str::to_string)
                .collect()
        });
        let coordinator = ctx.coordinator();
        let missing: Vec<String> = coordinator.caches().data.with(|entries| {
            project_ids
                .into_iter()
                .filter(|id| !entries.contains_key(&DataKey::new(id.clone(), window)))
                .collect()
        });
        if missing.is_empty() {
            return;
        }
        log::info!("[APP] loading {} projects for {}..{}", missing.len(), window.start, window.end);
        spawn_local(async move {
            let mut discarded = false;
            for id in missing {
                match coordinator.load_project(&id, window).await {
                    Ok(stored) => discarded |= !stored,
                    Err(e) => log::warn!("[APP] loading {} failed: {}", id, e),
                }
            }
            // A write raced these reads; their keys were left stale
            if discarded {
                ctx.refetch();
            }
        });
    });

    {
        let coordinator = ctx.coordinator();
        ctx.settle("load timeline", async move { coordinator.load_structure().await.map(|_| ()) });
    }

    bind_global_handlers(dnd, move |resolution| {
        let coordinator = ctx.coordinator();
        ctx.settle("move", async move { coordinator.apply_drop(resolution).await });
    });

    view! {
        <div class="app-layout">
            <SettingsBar />
            {move || ctx.error.get().map(|message| view! {
                <div class="error-banner">
                    <span>{message}</span>
                    <button on:click=move |_| ctx.dismiss_error()>"×"</button>
                </div>
            })}
            <TimelineGrid />
            <DragOverlay />
        </div>
    }
}
