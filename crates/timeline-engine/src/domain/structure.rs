//! Cache values: the structure (workspaces, projects, settings) and the
//! per-project, per-window data (items, milestones, sub-projects).

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::{DateWindow, Item, Milestone, Project, Settings, SubProject, Workspace};

/// Key of the single structure cache entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructureKey;

/// Everything the structure read returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Structure {
    pub workspaces: Vec<Workspace>,
    pub projects: Vec<Project>,
    pub settings: Settings,
}

impl Structure {
    /// Non-hidden workspaces in user order. Ids listed in
    /// `settings.workspace_order` come first, the rest follow by position.
    pub fn ordered_workspaces(&self) -> Vec<&Workspace> {
        let rank: HashMap<&str, usize> = self
            .settings
            .workspace_order
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut visible: Vec<&Workspace> = self.workspaces.iter().filter(|w| !w.hidden).collect();
        visible.sort_by(|a, b| {
            let ra = rank.get(a.id.as_str()).copied().unwrap_or(usize::MAX);
            let rb = rank.get(b.id.as_str()).copied().unwrap_or(usize::MAX);
            ra.cmp(&rb)
                .then(a.position.cmp(&b.position))
                .then_with(|| a.id.cmp(&b.id))
        });
        visible
    }

    /// Non-hidden projects of a workspace, by position
    pub fn projects_of(&self, workspace_id: &str) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self
            .projects
            .iter()
            .filter(|p| p.workspace_id == workspace_id && !p.hidden)
            .collect();
        projects.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        projects
    }

    pub fn workspace(&self, id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Projects whose workspace still exists. Anything pointing elsewhere is
    /// an orphan and never rendered.
    pub fn live_project_ids(&self) -> BTreeSet<&str> {
        let workspaces: BTreeSet<&str> = self.workspaces.iter().map(|w| w.id.as_str()).collect();
        self.projects
            .iter()
            .filter(|p| workspaces.contains(p.workspace_id.as_str()))
            .map(|p| p.id.as_str())
            .collect()
    }

    pub fn rewrite_id(&mut self, from: &str, to: &str) {
        for workspace in &mut self.workspaces {
            workspace.rewrite_id(from, to);
        }
        for project in &mut self.projects {
            project.rewrite_id(from, to);
        }
        for id in &mut self.settings.workspace_order {
            if id == from {
                *id = to.to_string();
            }
        }
    }

    /// True if any id or id list still mentions `id`
    pub fn mentions(&self, id: &str) -> bool {
        self.workspaces.iter().any(|w| w.id == id)
            || self.projects.iter().any(|p| p.id == id || p.workspace_id == id)
            || self.settings.workspace_order.iter().any(|o| o == id)
    }
}

/// Key of one data cache entry: a project's entities over a date window
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataKey {
    pub project_id: String,
    pub window: DateWindow,
}

impl DataKey {
    pub fn new(project_id: impl Into<String>, window: DateWindow) -> Self {
        Self { project_id: project_id.into(), window }
    }
}

/// Date-placed entities of one project inside one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectData {
    pub items: Vec<Item>,
    pub milestones: Vec<Milestone>,
    pub sub_projects: Vec<SubProject>,
}

impl ProjectData {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.milestones.is_empty() && self.sub_projects.is_empty()
    }

    /// Items of one sub-project
    pub fn members_of<'a>(&'a self, sub_project_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |i| i.sub_project_id.as_deref() == Some(sub_project_id))
    }

    pub fn rewrite_id(&mut self, from: &str, to: &str) {
        for item in &mut self.items {
            item.rewrite_id(from, to);
        }
        for milestone in &mut self.milestones {
            milestone.rewrite_id(from, to);
        }
        for sub_project in &mut self.sub_projects {
            sub_project.rewrite_id(from, to);
        }
    }

    pub fn mentions(&self, id: &str) -> bool {
        self.items.iter().any(|i| {
            i.id == id || i.project_id == id || i.sub_project_id.as_deref() == Some(id)
        }) || self.milestones.iter().any(|m| m.id == id || m.project_id == id)
            || self.sub_projects.iter().any(|s| s.id == id || s.project_id == id)
    }
}
