//! Drag and drop for the grid: hit-testing, the drag state machine and the
//! drop animation handoff. DOM-free; `leptos-dragdrop` wires it to events.

mod collision;
mod controller;
mod drop_registry;

pub use collision::{grid_collision, DropCandidate};
pub use controller::{
    drag_id, DragController, DragPayload, DragPhase, DragSession, DropResolution, DropTarget,
    PointerSample,
};
pub use drop_registry::DropAnimationRegistry;
