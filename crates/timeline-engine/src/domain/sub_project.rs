//! Sub-Project Entity
//!
//! A date-ranged container drawn as a bar in its own lane under the
//! project's main row. Items join it through `Item::sub_project_id`.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use super::entity::{Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProject {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    /// Inclusive, never before `start_date`
    pub end_date: NaiveDate,
    pub project_id: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SubProject {
    /// Builds a sub-project, swapping the bounds if they arrive reversed
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        project_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let (start_date, end_date) = if end_date < start_date {
            (end_date, start_date)
        } else {
            (start_date, end_date)
        };
        Self {
            id: id.into(),
            title: title.into(),
            start_date,
            end_date,
            project_id: project_id.into(),
            color: None,
            description: None,
        }
    }

    /// Whether the two inclusive ranges share at least one day
    pub fn overlaps(&self, other: &SubProject) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Number of day columns the bar spans
    pub fn span_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Both bounds moved by the same delta
    pub fn shifted(&self, delta: Duration) -> (NaiveDate, NaiveDate) {
        (self.start_date + delta, self.end_date + delta)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

impl Entity for SubProject {
    type Patch = SubProjectPatch;
    const KIND: EntityKind = EntityKind::SubProject;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: &SubProjectPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if self.end_date < self.start_date {
            self.end_date = self.start_date;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
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
