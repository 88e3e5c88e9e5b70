//! Project domain entity

use serde::{Deserialize, Serialize};
use super::entity::{Entity, EntityKind};

/// A project inside a workspace. Items, milestones and sub-projects point
/// back at it through `project_id`; it does not own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
    pub color: String,
    pub position: i32,
    #[serde(default)]
    pub hidden: bool,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>, workspace_id: impl Into<String>, position: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workspace_id: workspace_id.into(),
            color: "#3b82f6".to_string(),
            position,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl Entity for Project {
    type Patch = ProjectPatch;
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &ProjectPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(workspace_id) = &patch.workspace_id {
            self.workspace_id = workspace_id.clone();
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(hidden) = patch.hidden {
            self.hidden = hidden;
        }
    }

    fn rewrite_id(&mut self, from: &str, to: &str) {
        if self.id == from {
            self.id = to.to_string();
        }
        if self.workspace_id == from {
            self.workspace_id = to.to_string();
        }
    }
}
