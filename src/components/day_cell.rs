//! Day Cell Component
//!
//! One day of one project row (or sub-project lane): a drop target that
//! lists the day's items and opens an inline input on double click.

use chrono::NaiveDate;
use leptos::prelude::*;
use leptos_dragdrop::{animate_landing, make_on_mousedown, make_on_touchstart, DragPayload, DropTarget};
use timeline_engine::dnd::drag_id;

use crate::context::AppContext;
use crate::models::{EntityKind, Item, ItemPatch, Milestone};

/// Day cell component
#[component]
pub fn DayCell(
    project_id: String,
    #[prop(optional)] sub_project_id: Option<String>,
    date: NaiveDate,
    /// Left edge inside the row
    x: f64,
    width: f64,
    items: Signal<Vec<Item>>,
    #[prop(optional)] milestones: Option<Signal<Vec<Milestone>>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let cell_ref = NodeRef::<leptos::html::Div>::new();

    let mut target = DropTarget::new(project_id.clone(), date);
    if let Some(sp) = &sub_project_id {
        target = target.in_sub_project(sp.clone());
    }
    let cell_id = target.cell_id();

    Effect::new(move |_| {
        if let Some(el) = cell_ref.get() {
            dnd.register_cell(target.clone(), el.into());
        }
    });
    {
        let cell_id = cell_id.clone();
        on_cleanup(move || dnd.unregister_cell(&cell_id));
    }

    let is_target = move || {
        dnd.drop_target_read
            .with(|t| t.as_ref().is_some_and(|t| t.cell_id() == cell_id))
    };
    let cell_class = move || {
        if is_target() { "day-cell drop-target" } else { "day-cell" }
    };

    let (adding, set_adding) = signal(false);
    let (new_title, set_new_title) = signal(String::new());

    let submit = move || {
        let title = new_title.get_untracked();
        set_new_title.set(String::new());
        set_adding.set(false);
        let coordinator = ctx.coordinator();
        let project_id = project_id.clone();
        let sub_project_id = sub_project_id.clone();
        ctx.settle("create item", async move {
            coordinator
                .quick_create_item(&project_id, date, &title, sub_project_id.as_deref())
                .await
                .map(|_| ())
        });
    };

    let milestone_view = move || {
        milestones.map(|list| {
            view! {
                <For
                    each=move || list.get()
                    key=|m| (m.id.clone(), m.title.clone(), m.date)
                    children=move |m| view! { <MilestoneMarker milestone=m /> }
                />
            }
        })
    };

    view! {
        <div
            node_ref=cell_ref
            class=cell_class
            style=format!("left: {}px; width: {}px;", x, width)
            on:dblclick=move |_| set_adding.set(true)
        >
            {milestone_view}
            <For
                each=move || items.get()
                key=|i| (i.id.clone(), i.title.clone(), i.completed, i.date, i.sub_project_id.clone())
                children=move |item| view! { <ItemChip item=item /> }
            />
            {move || adding.get().then(|| {
                let submit = submit.clone();
                view! {
                    <input
                        class="quick-create"
                        type="text"
                        placeholder="New task"
                        autofocus=true
                        prop:value=move || new_title.get()
                        on:input=move |ev| set_new_title.set(event_target_value(&ev))
                        on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                            "Enter" => submit(),
                            "Escape" => {
                                set_new_title.set(String::new());
                                set_adding.set(false);
                            }
                            _ => {}
                        }
                        on:blur=move |_| set_adding.set(false)
                    />
                }
            })}
        </div>
    }
}

/// Draggable item chip
#[component]
pub fn ItemChip(item: Item) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let chip_ref = NodeRef::<leptos::html::Div>::new();
    let key = drag_id(EntityKind::Item, &item.id);

    // Land from where the overlay was released
    {
        let key = key.clone();
        Effect::new(move |_| {
            if let Some(el) = chip_ref.get() {
                animate_landing(&dnd, &key, &el);
            }
        });
    }

    let chip_class = move || {
        if dnd.is_dragging(&key) { "item-chip dragging" } else { "item-chip" }
    };

    let id = item.id.clone();
    let completed = item.completed;
    let on_toggle = {
        let id = id.clone();
        move |_| {
            let coordinator = ctx.coordinator();
            let id = id.clone();
            ctx.settle("update item", async move {
                let patch = ItemPatch { completed: Some(!completed), ..Default::default() };
                coordinator.update::<Item>(&id, patch).await
            });
        }
    };
    let on_delete = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let coordinator = ctx.coordinator();
        let id = id.clone();
        ctx.settle("delete item", async move { coordinator.delete::<Item>(&id).await });
    };

    let payload = DragPayload::Item(item.clone());
    let style = item
        .color
        .as_ref()
        .map(|c| format!("border-left-color: {};", c))
        .unwrap_or_default();

    view! {
        <div
            node_ref=chip_ref
            class=chip_class
            style=style
            on:mousedown=make_on_mousedown(dnd, payload.clone())
            on:touchstart=make_on_touchstart(dnd, payload)
        >
            {item.is_task().then(|| view! {
                <input
                    type="checkbox"
                    prop:checked=completed
                    on:mousedown=|ev: web_sys::MouseEvent| ev.stop_propagation()
                    on:change=on_toggle
                />
            })}
            <span class={if completed { "item-title done" } else { "item-title" }}>{item.title.clone()}</span>
            <button
                class="item-delete-btn"
                on:mousedown=|ev: web_sys::MouseEvent| ev.stop_propagation()
                on:click=on_delete
            >
                "×"
            </button>
        </div>
    }
}

/// Milestone flag on the project's main row
#[component]
fn MilestoneMarker(milestone: Milestone) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let marker_ref = NodeRef::<leptos::html::Div>::new();
    let key = drag_id(EntityKind::Milestone, &milestone.id);
    Effect::new(move |_| {
        if let Some(el) = marker_ref.get() {
            animate_landing(&dnd, &key, &el);
        }
    });

    let payload = DragPayload::Milestone(milestone.clone());
    let color = milestone.color.clone().unwrap_or_else(|| "#e67e22".to_string());

    view! {
        <div
            node_ref=marker_ref
            class="milestone-marker"
            style=format!("background-color: {};", color)
            title=milestone.content.clone().unwrap_or_default()
            on:mousedown=make_on_mousedown(dnd, payload.clone())
            on:touchstart=make_on_touchstart(dnd, payload)
        >
            "◆ "{milestone.title.clone()}
        </div>
    }
}
