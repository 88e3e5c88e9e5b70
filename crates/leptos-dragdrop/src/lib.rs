//! Leptos DragDrop Utilities
//!
//! Mouse and touch dragging for the timeline grid, driving the engine's
//! drag controller. Movement threshold distinguishes click from drag; the
//! cell under the pointer comes from the grid collision strategy over the
//! registered day cells.

use std::collections::HashMap;

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use timeline_engine::dnd::{grid_collision, DragController, DropAnimationRegistry, DropCandidate, PointerSample};
use timeline_engine::geometry::{Point, Rect};

pub use timeline_engine::dnd::{DragPayload, DropResolution, DropTarget};

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// How long `drag_just_ended` stays set, so the release doesn't count as a click
const JUST_ENDED_MS: u32 = 100;

/// One frame, so the offset transform paints before the transition starts
const LANDING_DELAY_MS: u32 = 16;

/// Press seen, threshold not crossed yet
struct PendingDrag {
    payload: DragPayload,
    element_rect: Rect,
}

/// Non-reactive side of a drag: DOM handles and the engine state machine
#[derive(Default)]
struct DndState {
    controller: DragController,
    registry: DropAnimationRegistry,
    pending: Option<PendingDrag>,
    /// Day cells by cell id
    cells: HashMap<String, (DropTarget, web_sys::Element)>,
    overlay: Option<web_sys::Element>,
    column_width: f64,
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_read: ReadSignal<Option<DragPayload>>,
    pub dragging_write: WriteSignal<Option<DragPayload>>,
    pub drop_target_read: ReadSignal<Option<DropTarget>>,
    pub drop_target_write: WriteSignal<Option<DropTarget>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Drag id pressed but not yet dragging
    pub pending_id_read: ReadSignal<Option<String>>,
    pub pending_id_write: WriteSignal<Option<String>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
    /// Overlay top-left in viewport coordinates
    pub overlay_pos_read: ReadSignal<Option<Point>>,
    pub overlay_pos_write: WriteSignal<Option<Point>>,
    state: StoredValue<DndState, LocalStorage>,
}

pub fn create_dnd_signals(column_width: f64) -> DndSignals {
    let (dragging_read, dragging_write) = signal(None::<DragPayload>);
    let (drop_target_read, drop_target_write) = signal(None::<DropTarget>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_id_read, pending_id_write) = signal(None::<String>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    let (overlay_pos_read, overlay_pos_write) = signal(None::<Point>);
    let state = StoredValue::new_local(DndState {
        column_width,
        ..Default::default()
    });
    DndSignals {
        dragging_read,
        dragging_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_id_read,
        pending_id_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
        overlay_pos_read,
        overlay_pos_write,
        state,
    }
}

impl DndSignals {
    /// Whether the entity with this drag id is the one being dragged
    pub fn is_dragging(&self, drag_id: &str) -> bool {
        self.dragging_read
            .with(|d| d.as_ref().is_some_and(|p| p.drag_id() == drag_id))
    }

    pub fn set_column_width(&self, column_width: f64) {
        self.state.update_value(|s| s.column_width = column_width);
    }

    /// Make a day cell a drop target
    pub fn register_cell(&self, target: DropTarget, element: web_sys::Element) {
        self.state.update_value(|s| {
            s.cells.insert(target.cell_id(), (target, element));
        });
    }

    pub fn unregister_cell(&self, cell_id: &str) {
        self.state.update_value(|s| {
            s.cells.remove(cell_id);
        });
    }

    /// The element following the pointer; its rectangle is recorded on drop
    pub fn set_overlay_element(&self, element: Option<web_sys::Element>) {
        self.state.update_value(|s| s.overlay = element);
    }

    /// Where the overlay was released, for the entity that just landed.
    /// Returns a rectangle at most once per drop.
    pub fn take_drop_rect(&self, drag_id: &str) -> Option<Rect> {
        self.state
            .try_update_value(|s| s.registry.consume(drag_id))
            .flatten()
    }
}

/// Viewport rectangle of an element
pub fn dom_rect(element: &web_sys::Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

/// Slide a freshly mounted entity from where its overlay was released to
/// its resting spot. No-op unless this drag id has an unconsumed record.
pub fn animate_landing(dnd: &DndSignals, drag_id: &str, element: &web_sys::HtmlElement) {
    let Some(from) = dnd.take_drop_rect(drag_id) else { return };
    let to = dom_rect(element);
    let style = element.style();
    let _ = style.set_property("transition", "none");
    let _ = style.set_property(
        "transform",
        &format!("translate({}px, {}px)", from.x - to.x, from.y - to.y),
    );
    gloo_timers::callback::Timeout::new(LANDING_DELAY_MS, move || {
        let _ = style.set_property("transition", "transform 180ms ease-out");
        let _ = style.set_property("transform", "none");
    })
    .forget();
}

fn exceeds_threshold(dx: i32, dy: i32) -> bool {
    dx.abs() > DRAG_THRESHOLD_PX || dy.abs() > DRAG_THRESHOLD_PX
}

/// Presses on form controls never start a drag
fn is_interactive(target: Option<web_sys::EventTarget>) -> bool {
    target.is_some_and(|t| {
        t.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            || t.dyn_ref::<web_sys::HtmlButtonElement>().is_some()
            || t.dyn_ref::<web_sys::HtmlTextAreaElement>().is_some()
    })
}

fn touch_points(list: &web_sys::TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

fn begin_pending(dnd: DndSignals, payload: DragPayload, element: Option<web_sys::Element>, x: i32, y: i32) {
    let Some(element) = element else { return };
    let drag_id = payload.drag_id();
    let element_rect = dom_rect(&element);
    dnd.state.update_value(|s| s.pending = Some(PendingDrag { payload, element_rect }));
    dnd.pending_id_write.set(Some(drag_id));
    dnd.start_x_write.set(x);
    dnd.start_y_write.set(y);
}

/// Create mousedown handler for a draggable entity
pub fn make_on_mousedown(dnd: DndSignals, payload: DragPayload) -> impl Fn(web_sys::MouseEvent) + Clone + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() != 0 || is_interactive(ev.target()) {
            return;
        }
        let element = ev.current_target().and_then(|t| t.dyn_into::<web_sys::Element>().ok());
        begin_pending(dnd, payload.clone(), element, ev.client_x(), ev.client_y());
    }
}

/// Create touchstart handler for a draggable entity
pub fn make_on_touchstart(dnd: DndSignals, payload: DragPayload) -> impl Fn(web_sys::TouchEvent) + Clone + 'static {
    move |ev: web_sys::TouchEvent| {
        if is_interactive(ev.target()) {
            return;
        }
        let Some(touch) = ev.touches().get(0) else { return };
        let element = ev.current_target().and_then(|t| t.dyn_into::<web_sys::Element>().ok());
        begin_pending(dnd, payload.clone(), element, touch.client_x(), touch.client_y());
    }
}

/// Track a pointer move. Starts the drag once past the threshold, then
/// moves the overlay and hit-tests the cells. Returns whether a drag is live.
fn pointer_moved(dnd: DndSignals, sample: PointerSample) -> bool {
    let Some(point) = sample.point() else { return false };

    if dnd.dragging_read.get_untracked().is_none() {
        if dnd.pending_id_read.get_untracked().is_none() {
            return false;
        }
        let dx = point.x as i32 - dnd.start_x_read.get_untracked();
        let dy = point.y as i32 - dnd.start_y_read.get_untracked();
        if !exceeds_threshold(dx, dy) {
            return false;
        }
        let started = dnd
            .state
            .try_update_value(|s| {
                let pending = s.pending.take()?;
                s.registry.clear();
                let payload = pending.payload.clone();
                let column_width = s.column_width;
                s.controller
                    .start(pending.payload, &sample, pending.element_rect, column_width)
                    .then_some(payload)
            })
            .flatten();
        let Some(payload) = started else { return false };
        log::debug!("[DND] drag started: {}", payload.drag_id());
        dnd.dragging_write.set(Some(payload));
    }

    let (translation, target) = dnd.state.with_value(|s| {
        let candidates: Vec<DropCandidate<String>> = s
            .cells
            .iter()
            .map(|(id, (_, element))| DropCandidate { id: id.clone(), rect: dom_rect(element) })
            .collect();
        let target = grid_collision(point, &candidates).and_then(|id| s.cells.get(&id).map(|(t, _)| t.clone()));
        (s.controller.overlay_translation(point), target)
    });
    dnd.overlay_pos_write.set(translation);
    if dnd.drop_target_read.get_untracked() != target {
        dnd.drop_target_write.set(target);
    }
    true
}

/// Release: hand the overlay rectangle to the registry and resolve the drop
fn pointer_released(dnd: DndSignals) -> Option<DropResolution> {
    let target = dnd.drop_target_read.get_untracked();
    let resolution = dnd
        .state
        .try_update_value(|s| {
            s.pending = None;
            let overlay_rect = s.overlay.as_ref().map(dom_rect);
            s.controller.finish(target.as_ref(), overlay_rect, &mut s.registry)
        })
        .flatten();
    end_drag(&dnd);
    resolution
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    let was_dragging = dnd.dragging_read.get_untracked().is_some();
    dnd.dragging_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_id_write.set(None);
    dnd.overlay_pos_write.set(None);
    if !was_dragging {
        // plain click, let it through
        return;
    }
    dnd.drag_just_ended_write.set(true);
    let clear = dnd.drag_just_ended_write;
    gloo_timers::callback::Timeout::new(JUST_ENDED_MS, move || clear.set(false)).forget();
}

/// Abandon the drag; nothing is resolved or animated
pub fn cancel_drag(dnd: &DndSignals) {
    dnd.state.update_value(|s| {
        s.pending = None;
        s.controller.cancel();
    });
    end_drag(dnd);
}

fn listen(event: &str, handler: impl FnMut(web_sys::Event) + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Some(doc) = web_sys::window().and_then(|w| w.document()) {
        // touchmove must be able to stop the page from scrolling
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        let _ = doc.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        );
    }
    closure.forget();
}

/// Bind document-level move/release handlers. `on_drop` receives the
/// mutation a completed drop asks for.
pub fn bind_global_handlers<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(DropResolution) + Clone + 'static,
{
    listen("mousemove", move |ev| {
        if let Some(ev) = ev.dyn_ref::<web_sys::MouseEvent>() {
            let sample = PointerSample::Mouse { x: ev.client_x() as f64, y: ev.client_y() as f64 };
            pointer_moved(dnd, sample);
        }
    });

    listen("touchmove", move |ev| {
        if let Some(touch) = ev.dyn_ref::<web_sys::TouchEvent>() {
            if pointer_moved(dnd, PointerSample::Touch(touch_points(&touch.touches()))) {
                ev.prevent_default();
            }
        }
    });

    for event in ["mouseup", "touchend"] {
        let on_drop = on_drop.clone();
        listen(event, move |_| {
            if let Some(resolution) = pointer_released(dnd) {
                log::debug!("[DND] drop resolved: {:?}", resolution);
                on_drop(resolution);
            }
        });
    }

    listen("touchcancel", move |_| cancel_drag(&dnd));

    listen("keydown", move |ev| {
        let escape = ev
            .dyn_ref::<web_sys::KeyboardEvent>()
            .is_some_and(|k| k.key() == "Escape");
        if escape && dnd.dragging_read.get_untracked().is_some() {
            cancel_drag(&dnd);
        }
    });
}
