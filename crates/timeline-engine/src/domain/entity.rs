//! Domain Layer - Core Entity Trait
//!
//! Every persisted timeline entity has a string id (canonical ids come from
//! the remote store, `temp-*` ids are minted locally while a create is in
//! flight) and a typed partial-update patch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix of locally generated placeholder ids
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Returns true for ids minted locally before the store confirmed a create
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Entity type tag, used in temp ids, drag ids and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Workspace,
    Project,
    SubProject,
    Item,
    Milestone,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Workspace => "workspace",
            EntityKind::Project => "project",
            EntityKind::SubProject => "sub-project",
            EntityKind::Item => "item",
            EntityKind::Milestone => "milestone",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core trait for all timeline entities
pub trait Entity: Sized + Clone + fmt::Debug + PartialEq + 'static {
    /// Partial update; `None` fields are left untouched
    type Patch: Clone + fmt::Debug + Default + PartialEq + Serialize;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Merge a partial update into this entity
    fn apply(&mut self, patch: &Self::Patch);

    /// Replace `from` with `to` in the id and in every id this entity points at
    fn rewrite_id(&mut self, from: &str, to: &str) {
        if self.id() == from {
            self.set_id(to.to_string());
        }
    }
}

/// Shared helper for the `Option<String>` foreign keys
pub(crate) fn rewrite_ref(slot: &mut Option<String>, from: &str, to: &str) {
    if slot.as_deref() == Some(from) {
        *slot = Some(to.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_id_detection() {
        assert!(is_temp_id("temp-item-1"));
        assert!(!is_temp_id("42"));
        assert!(!is_temp_id("item-temp-1"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EntityKind::SubProject.to_string(), "sub-project");
        assert_eq!(EntityKind::Milestone.as_str(), "milestone");
    }
}
