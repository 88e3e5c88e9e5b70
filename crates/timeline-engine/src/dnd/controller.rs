//! Drag Controller
//!
//! Idle → Active on drag start, Active → Resolving → Idle on release.
//! A release without a session or without a target resolves to nothing:
//! missing drag context means nothing happened.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{EntityKind, Item, ItemPatch, Milestone, SubProject};
use crate::geometry::{Point, Rect};
use super::drop_registry::DropAnimationRegistry;

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    Item(Item),
    Milestone(Milestone),
    SubProject(SubProject),
}

impl DragPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            DragPayload::Item(_) => EntityKind::Item,
            DragPayload::Milestone(_) => EntityKind::Milestone,
            DragPayload::SubProject(_) => EntityKind::SubProject,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            DragPayload::Item(item) => &item.id,
            DragPayload::Milestone(milestone) => &milestone.id,
            DragPayload::SubProject(sub_project) => &sub_project.id,
        }
    }

    /// Key of this drag in the drop animation registry
    pub fn drag_id(&self) -> String {
        drag_id(self.kind(), self.entity_id())
    }
}

/// `kind:id`, shared by the controller and the cells that consume records
pub fn drag_id(kind: EntityKind, id: &str) -> String {
    format!("{}:{}", kind.as_str(), id)
}

/// Pointer coordinates from either input source
#[derive(Debug, Clone, PartialEq)]
pub enum PointerSample {
    Mouse { x: f64, y: f64 },
    /// Active touches; the first one drives the drag
    Touch(Vec<Point>),
}

impl PointerSample {
    pub fn point(&self) -> Option<Point> {
        match self {
            PointerSample::Mouse { x, y } => Some(Point::new(*x, *y)),
            PointerSample::Touch(touches) => touches.first().copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub payload: DragPayload,
    /// Pointer position relative to the dragged element's top-left corner
    pub grab_offset: Point,
    /// Whole days between a sub-project bar's start and the grab point
    pub day_offset: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Active,
    Resolving,
}

/// A day cell that accepts drops
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub project_id: String,
    /// Set when the cell lies inside a sub-project bar's lane and range
    pub sub_project_id: Option<String>,
    pub date: NaiveDate,
}

impl DropTarget {
    pub fn new(project_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            project_id: project_id.into(),
            sub_project_id: None,
            date,
        }
    }

    pub fn in_sub_project(mut self, sub_project_id: impl Into<String>) -> Self {
        self.sub_project_id = Some(sub_project_id.into());
        self
    }

    /// Stable DOM-facing id of the cell
    pub fn cell_id(&self) -> String {
        format!(
            "cell:{}:{}:{}",
            self.project_id,
            self.sub_project_id.as_deref().unwrap_or("main"),
            self.date
        )
    }
}

/// The mutation a drop asks for
#[derive(Debug, Clone, PartialEq)]
pub enum DropResolution {
    /// Date, and container when it changed, in one update
    MoveItem { id: String, patch: ItemPatch },
    MoveMilestone { id: String, date: NaiveDate },
    /// New start date; the end follows by the same delta in the mutation
    ShiftSubProject { id: String, new_start: NaiveDate },
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    phase: DragPhase,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == DragPhase::Active
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Begin a drag. Returns false (and stays idle) when the pointer sample
    /// carries no coordinates.
    pub fn start(
        &mut self,
        payload: DragPayload,
        pointer: &PointerSample,
        element_rect: Rect,
        column_width: f64,
    ) -> bool {
        let Some(point) = pointer.point() else {
            return false;
        };
        let grab_offset = point.offset_from(element_rect.origin());
        let day_offset = match payload {
            DragPayload::SubProject(_) if column_width > 0.0 => {
                (grab_offset.x / column_width).floor().max(0.0) as i64
            }
            _ => 0,
        };
        log::debug!("drag start {} (day offset {})", payload.drag_id(), day_offset);
        self.session = Some(DragSession {
            payload,
            grab_offset,
            day_offset,
        });
        self.phase = DragPhase::Active;
        true
    }

    /// Top-left of the dragged element for a pointer position: the pointer
    /// minus the grab offset, so the element doesn't jump to the cursor
    pub fn overlay_translation(&self, pointer: Point) -> Option<Point> {
        match (&self.session, self.phase) {
            (Some(session), DragPhase::Active) => Some(pointer.offset_from(session.grab_offset)),
            _ => None,
        }
    }

    /// Abandon the drag without any effect
    pub fn cancel(&mut self) {
        self.session = None;
        self.phase = DragPhase::Idle;
    }

    /// Release. Clears the session and returns the mutation to run, if any.
    /// Only a drop that resolves to a mutation registers the overlay's
    /// rectangle, since only then does the entity remount to consume it.
    pub fn finish(
        &mut self,
        target: Option<&DropTarget>,
        overlay_rect: Option<Rect>,
        registry: &mut DropAnimationRegistry,
    ) -> Option<DropResolution> {
        let session = self.session.take()?;
        self.phase = DragPhase::Resolving;

        let resolution = target.and_then(|target| resolve(&session, target));
        if let (Some(rect), Some(_)) = (overlay_rect, &resolution) {
            registry.register(session.payload.drag_id(), rect);
        }

        self.phase = DragPhase::Idle;
        resolution
    }
}

fn resolve(session: &DragSession, target: &DropTarget) -> Option<DropResolution> {
    match &session.payload {
        DragPayload::Item(item) => {
            let mut patch = ItemPatch::default();
            if item.date != target.date {
                patch.date = Some(target.date);
            }
            if item.sub_project_id != target.sub_project_id {
                patch.date = Some(target.date);
                patch.sub_project_id = Some(target.sub_project_id.clone());
            }
            if item.project_id != target.project_id {
                patch.date = Some(target.date);
                patch.project_id = Some(target.project_id.clone());
                patch.sub_project_id = Some(target.sub_project_id.clone());
            }
            (patch != ItemPatch::default()).then(|| DropResolution::MoveItem {
                id: item.id.clone(),
                patch,
            })
        }
        DragPayload::Milestone(milestone) => {
            (milestone.date != target.date).then(|| DropResolution::MoveMilestone {
                id: milestone.id.clone(),
                date: target.date,
            })
        }
        DragPayload::SubProject(sub_project) => {
            let new_start = target.date - Duration::days(session.day_offset);
            (new_start != sub_project.start_date).then(|| DropResolution::ShiftSubProject {
                id: sub_project.id.clone(),
                new_start,
            })
        }
    }
}
