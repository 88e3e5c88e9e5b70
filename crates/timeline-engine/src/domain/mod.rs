//! Domain Layer
//!
//! Entities of the timeline and the containers the caches hold them in.
//! No I/O here; only serde for moving values across the host boundary.

mod entity;
mod workspace;
mod project;
mod item;
mod milestone;
mod sub_project;
mod settings;
mod structure;
mod window;

pub use entity::{Entity, EntityKind, is_temp_id, TEMP_ID_PREFIX};
pub use workspace::{Workspace, WorkspacePatch};
pub use project::{Project, ProjectPatch};
pub use item::{Item, ItemKind, ItemPatch, ItemBatchEntry};
pub use milestone::{Milestone, MilestonePatch};
pub use sub_project::{SubProject, SubProjectPatch};
pub use settings::{Settings, SettingsPatch};
pub use structure::{Structure, StructureKey, ProjectData, DataKey};
pub use window::{DateWindow, MAX_WINDOW_DAYS};
