//! Settings Bar Component
//!
//! Toolbar above the grid: completed-task filter, visible range and the
//! new-workspace form.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::models::{SettingsPatch, Workspace};
use crate::store::{use_app_store, AppStateStoreFields};

/// Choices for how far ahead the grid reaches
const FUTURE_RANGES: [(i64, &str); 3] = [(30, "1 month"), (120, "4 months"), (365, "1 year")];

#[component]
pub fn SettingsBar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();
    let (adding, set_adding) = signal(false);
    let (new_name, set_new_name) = signal(String::new());

    let show_completed = move || store.structure().with(|s| s.settings.show_completed);
    let future_days = move || store.structure().with(|s| s.settings.future_days);

    let on_toggle_completed = move |_| {
        let patch = SettingsPatch {
            show_completed: Some(!show_completed()),
            ..Default::default()
        };
        let coordinator = ctx.coordinator();
        ctx.settle("update settings", async move { coordinator.update_settings(patch).await });
    };

    let on_range = move |ev: web_sys::Event| {
        let Ok(days) = event_target_value(&ev).parse::<i64>() else { return };
        let patch = SettingsPatch {
            future_days: Some(days),
            ..Default::default()
        };
        let coordinator = ctx.coordinator();
        ctx.settle("update settings", async move { coordinator.update_settings(patch).await });
    };

    let on_add = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get();
        if name.trim().is_empty() { return; }

        let position = store.structure().with(|s| s.workspaces.len() as i32);
        let coordinator = ctx.coordinator();
        ctx.settle("create workspace", async move {
            coordinator
                .create(Workspace::new("", name.trim(), position))
                .await
                .map(|_| ())
        });

        set_new_name.set(String::new());
        set_adding.set(false);
    };

    view! {
        <div class="settings-bar">
            <label class="settings-toggle">
                <input type="checkbox" prop:checked=show_completed on:change=on_toggle_completed />
                "Show completed"
            </label>

            <select class="settings-range" on:change=on_range>
                {FUTURE_RANGES.iter().map(|(days, label)| {
                    let days = *days;
                    view! {
                        <option value=days.to_string() selected=move || future_days() == days>
                            {*label}
                        </option>
                    }
                }).collect_view()}
            </select>

            {move || if adding.get() {
                view! {
                    <form class="workspace-add-form" on:submit=on_add>
                        <input
                            type="text"
                            placeholder="Workspace name"
                            prop:value=move || new_name.get()
                            on:input=move |ev| set_new_name.set(event_target_value(&ev))
                        />
                        <button type="submit">"+"</button>
                        <button type="button" on:click=move |_| set_adding.set(false)>"×"</button>
                    </form>
                }.into_any()
            } else {
                view! {
                    <button class="workspace-add-btn" on:click=move |_| set_adding.set(true)>
                        "+ Workspace"
                    </button>
                }.into_any()
            }}
        </div>
    }
}
