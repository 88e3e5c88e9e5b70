//! Milestone domain entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::entity::{Entity, EntityKind};

/// Point-in-time marker on a project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub project_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Milestone {
    pub fn new(id: impl Into<String>, title: impl Into<String>, project_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date,
            project_id: project_id.into(),
            content: None,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
}

impl Entity for Milestone {
    type Patch = MilestonePatch;
    const KIND: EntityKind = EntityKind::Milestone;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &MilestonePatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
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
    }
}
