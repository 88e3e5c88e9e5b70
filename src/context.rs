//! Application Context
//!
//! Shared handles provided via Leptos Context API.

use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dragdrop::DndSignals;
use timeline_engine::geometry::GridMetrics;
use timeline_engine::sync::MutationCoordinator;
use timeline_engine::SyncResult;

use crate::commands::HostApi;
use crate::models::DateWindow;

pub type Coordinator = MutationCoordinator<HostApi>;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    coordinator: StoredValue<Rc<Coordinator>, LocalStorage>,
    /// Date range of the grid's columns - read
    pub window: ReadSignal<DateWindow>,
    /// Date range of the grid's columns - write
    set_window: WriteSignal<DateWindow>,
    metrics: StoredValue<GridMetrics>,
    pub dnd: DndSignals,
    /// Last failed mutation, shown until dismissed - read
    pub error: ReadSignal<Option<String>>,
    set_error: WriteSignal<Option<String>>,
}

impl AppContext {
    pub fn new(
        coordinator: Rc<Coordinator>,
        window: (ReadSignal<DateWindow>, WriteSignal<DateWindow>),
        metrics: GridMetrics,
        dnd: DndSignals,
        error: (ReadSignal<Option<String>>, WriteSignal<Option<String>>),
    ) -> Self {
        Self {
            coordinator: StoredValue::new_local(coordinator),
            window: window.0,
            set_window: window.1,
            metrics: StoredValue::new(metrics),
            dnd,
            error: error.0,
            set_error: error.1,
        }
    }

    pub fn coordinator(&self) -> Rc<Coordinator> {
        self.coordinator.get_value()
    }

    pub fn metrics(&self) -> GridMetrics {
        self.metrics.get_value()
    }

    pub fn set_window(&self, window: DateWindow) {
        if self.window.get_untracked() != window {
            self.set_window.set(window);
        }
    }

    pub fn dismiss_error(&self) {
        self.set_error.set(None);
    }

    /// Run a mutation in the background. A failure has already been rolled
    /// back by the coordinator; it is only reported here. Invalidated
    /// entries are refetched afterwards either way.
    pub fn settle<F>(&self, label: &'static str, mutation: F)
    where
        F: Future<Output = SyncResult<()>> + 'static,
    {
        let ctx = *self;
        spawn_local(async move {
            if let Err(e) = mutation.await {
                log::warn!("[APP] {} failed: {}", label, e);
                ctx.set_error.set(Some(format!("{} failed: {}", label, e)));
            }
            ctx.refetch();
        });
    }

    /// Reload whatever the last writes invalidated
    pub fn refetch(&self) {
        let coordinator = self.coordinator();
        spawn_local(async move {
            if let Err(e) = coordinator.refetch_stale().await {
                log::warn!("[APP] refetch failed: {}", e);
            }
        });
    }
}
