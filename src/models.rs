//! Frontend Models
//!
//! The timeline entities are shared with the engine crate.

pub use timeline_engine::domain::{
    is_temp_id, DataKey, DateWindow, EntityKind, Item, ItemPatch, Milestone, Project, ProjectData,
    Settings, SettingsPatch, Structure, SubProject, Workspace,
};
