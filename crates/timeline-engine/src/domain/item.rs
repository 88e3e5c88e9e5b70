//! Item Entity
//!
//! A task or a note placed on one day of a project row, optionally inside a
//! sub-project lane.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::entity::{rewrite_ref, Entity, EntityKind};

/// Tasks carry a checkbox, notes don't
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Task,
    Note,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub kind: ItemKind,
    pub date: NaiveDate,
    /// Only meaningful for tasks
    #[serde(default)]
    pub completed: bool,
    pub project_id: String,
    /// Weak reference placing the item inside a sub-project lane
    #[serde(default)]
    pub sub_project_id: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, title: impl Into<String>, project_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            kind: ItemKind::Task,
            date,
            completed: false,
            project_id: project_id.into(),
            sub_project_id: None,
            color: None,
        }
    }

    /// Same item placed inside a sub-project
    pub fn in_sub_project(mut self, sub_project_id: impl Into<String>) -> Self {
        self.sub_project_id = Some(sub_project_id.into());
        self
    }

    pub fn is_task(&self) -> bool {
        self.kind == ItemKind::Task
    }
}

/// Partial update. `sub_project_id: Some(None)` moves the item out of its
/// sub-project; `None` leaves membership alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
}

impl ItemPatch {
    pub fn date(date: NaiveDate) -> Self {
        Self { date: Some(date), ..Default::default() }
    }
}

/// One entry of a bulk item update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBatchEntry {
    pub id: String,
    #[serde(flatten)]
    pub patch: ItemPatch,
}

impl Entity for Item {
    type Patch = ItemPatch;
    const KIND: EntityKind = EntityKind::Item;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &ItemPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(project_id) = &patch.project_id {
            self.project_id = project_id.clone();
        }
        if let Some(sub_project_id) = &patch.sub_project_id {
            self.sub_project_id = sub_project_id.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }

    fn rewrite_id(&mut self, from: &str, to: &str) {
        if self.id == from {
            self.id = to.to_string();
        }
        if self.project_id == from {
            self.project_id = to.to_string();
        }
        rewrite_ref(&mut self.sub_project_id, from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_patch_leaves_unset_fields() {
        let mut item = Item::new("1", "Write", "p1", day(1)).in_sub_project("sp1");
        item.apply(&ItemPatch::date(day(4)));
        assert_eq!(item.date, day(4));
        assert_eq!(item.title, "Write");
        assert_eq!(item.sub_project_id.as_deref(), Some("sp1"));
    }

    #[test]
    fn test_patch_can_clear_sub_project() {
        let mut item = Item::new("1", "Write", "p1", day(1)).in_sub_project("sp1");
        item.apply(&ItemPatch { sub_project_id: Some(None), ..Default::default() });
        assert_eq!(item.sub_project_id, None);
    }

    #[test]
    fn test_rewrite_id_touches_foreign_keys() {
        let mut item = Item::new("temp-item-1", "Write", "p1", day(1)).in_sub_project("temp-sub-project-2");
        item.rewrite_id("temp-sub-project-2", "77");
        assert_eq!(item.sub_project_id.as_deref(), Some("77"));
        item.rewrite_id("temp-item-1", "78");
        assert_eq!(item.id, "78");
    }

    #[test]
    fn test_serialized_shape() {
        let item = Item::new("1", "Write", "p1", day(9));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["kind"], "task");

        let patch = serde_json::to_value(ItemPatch::date(day(10))).unwrap();
        assert_eq!(patch, serde_json::json!({ "date": "2024-03-10" }));
    }
}
