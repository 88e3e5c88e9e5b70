//! Drag Overlay Component
//!
//! Floating copy of whatever is being dragged, pinned under the pointer.

use leptos::prelude::*;
use leptos_dragdrop::DragPayload;

use crate::context::AppContext;

#[component]
pub fn DragOverlay() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let dnd = ctx.dnd;
    let overlay_ref = NodeRef::<leptos::html::Div>::new();

    Effect::new(move |_| {
        if let Some(el) = overlay_ref.get() {
            dnd.set_overlay_element(Some(el.into()));
        }
    });
    on_cleanup(move || dnd.set_overlay_element(None));

    let label = move || {
        dnd.dragging_read.with(|payload| match payload {
            Some(DragPayload::Item(item)) => item.title.clone(),
            Some(DragPayload::Milestone(m)) => format!("◆ {}", m.title),
            Some(DragPayload::SubProject(sp)) => sp.title.clone(),
            None => String::new(),
        })
    };
    let kind_class = move || {
        dnd.dragging_read.with(|payload| match payload {
            Some(DragPayload::SubProject(_)) => "drag-overlay sub-project",
            Some(DragPayload::Milestone(_)) => "drag-overlay milestone",
            _ => "drag-overlay",
        })
    };
    let style = move || match dnd.overlay_pos_read.get() {
        Some(p) => format!(
            "position: fixed; left: 0; top: 0; pointer-events: none; transform: translate({}px, {}px);",
            p.x, p.y
        ),
        None => "display: none;".to_string(),
    };

    view! {
        <div node_ref=overlay_ref class=kind_class style=style>
            {label}
        </div>
    }
}
