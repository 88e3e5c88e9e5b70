//! Row virtualization: one row per visible workspace, each as tall as its
//! header plus its projects (and their expanded bodies when open).

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use crate::domain::{Item, Project, ProjectData, Structure, Workspace};
use crate::geometry::{project_expanded_height, GridMetrics, ProjectHeight};
use super::virtualizer::{VirtualItem, Virtualizer};

/// A project header, plus its body when the project is open
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub project: Project,
    pub open: bool,
    /// Height predicted from entity counts; only computed for open projects
    pub expanded: Option<ProjectHeight>,
    /// Height the host measured after real layout, preferred when present
    pub measured: Option<f64>,
}

impl ProjectRow {
    pub fn body_height(&self) -> f64 {
        if !self.open {
            return 0.0;
        }
        self.measured
            .or_else(|| self.expanded.as_ref().map(|h| h.total_height))
            .unwrap_or(0.0)
    }

    pub fn height(&self, metrics: &GridMetrics) -> f64 {
        metrics.project_header_height + self.body_height()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceRow {
    pub workspace: Workspace,
    /// Effective collapse state: the stored flag, flipped if the user
    /// toggled it this session
    pub collapsed: bool,
    pub projects: Vec<ProjectRow>,
}

impl WorkspaceRow {
    pub fn height(&self, metrics: &GridMetrics) -> f64 {
        if self.collapsed {
            return metrics.workspace_header_height;
        }
        metrics.workspace_header_height
            + self.projects.iter().map(|p| p.height(metrics)).sum::<f64>()
    }

    /// Offset of a project's header from the top of this row
    pub fn project_offset(&self, project_id: &str, metrics: &GridMetrics) -> Option<f64> {
        if self.collapsed {
            return None;
        }
        let mut offset = metrics.workspace_header_height;
        for row in &self.projects {
            if row.project.id == project_id {
                return Some(offset);
            }
            offset += row.height(metrics);
        }
        None
    }
}

/// Everything the row estimate depends on, borrowed from the caches and the
/// UI state
pub struct RowInputs<'a> {
    pub structure: &'a Structure,
    /// Current-window data per project id
    pub data: &'a BTreeMap<String, ProjectData>,
    pub open_projects: &'a BTreeSet<String>,
    /// Workspaces whose collapse the user toggled; UI state only
    pub toggled_workspaces: &'a BTreeSet<String>,
    pub measured_heights: &'a HashMap<String, f64>,
    pub metrics: &'a GridMetrics,
}

impl<'a> RowInputs<'a> {
    fn is_collapsed(&self, workspace: &Workspace) -> bool {
        workspace.collapsed != self.toggled_workspaces.contains(&workspace.id)
    }

    fn visible_items(&self, data: &ProjectData) -> Vec<Item> {
        let show_completed = self.structure.settings.show_completed;
        data.items
            .iter()
            .filter(|i| show_completed || !(i.is_task() && i.completed))
            .cloned()
            .collect()
    }

    pub fn build(&self) -> Vec<WorkspaceRow> {
        self.structure
            .ordered_workspaces()
            .into_iter()
            .map(|workspace| {
                let projects = self
                    .structure
                    .projects_of(&workspace.id)
                    .into_iter()
                    .map(|project| {
                        let open = self.open_projects.contains(&project.id);
                        let expanded = open.then(|| {
                            let empty = ProjectData::default();
                            let data = self.data.get(&project.id).unwrap_or(&empty);
                            project_expanded_height(
                                project,
                                &self.visible_items(data),
                                &data.sub_projects,
                                self.metrics,
                            )
                        });
                        ProjectRow {
                            project: project.clone(),
                            open,
                            expanded,
                            measured: self.measured_heights.get(&project.id).copied(),
                        }
                    })
                    .collect();
                WorkspaceRow {
                    workspace: workspace.clone(),
                    collapsed: self.is_collapsed(workspace),
                    projects,
                }
            })
            .collect()
    }

    /// Hash of the structural inputs: open set, workspace map, per-workspace
    /// project lists and per-project entries. A change means cached row
    /// estimates are stale.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.open_projects.hash(&mut hasher);
        self.structure.settings.show_completed.hash(&mut hasher);
        for workspace in self.structure.ordered_workspaces() {
            workspace.id.hash(&mut hasher);
            self.is_collapsed(workspace).hash(&mut hasher);
            for project in self.structure.projects_of(&workspace.id) {
                project.id.hash(&mut hasher);
                if let Some(height) = self.measured_heights.get(&project.id) {
                    height.to_bits().hash(&mut hasher);
                }
                if let Some(data) = self.data.get(&project.id) {
                    for item in &data.items {
                        (&item.id, item.date, &item.sub_project_id, item.completed).hash(&mut hasher);
                    }
                    for sp in &data.sub_projects {
                        (&sp.id, sp.start_date, sp.end_date).hash(&mut hasher);
                    }
                }
            }
        }
        hasher.finish()
    }
}

/// Row virtualizer that tracks the input fingerprint and defers remeasure
/// to the host's next layout pass
#[derive(Debug, Clone)]
pub struct RowVirtualizer {
    inner: Virtualizer,
    rows: Vec<WorkspaceRow>,
    fingerprint: Option<u64>,
    metrics: GridMetrics,
}

impl RowVirtualizer {
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            inner: Virtualizer::new(metrics.overscan_rows),
            rows: Vec::new(),
            fingerprint: None,
            metrics,
        }
    }

    /// Take the latest inputs. The first sync measures right away; later
    /// structural changes only schedule a remeasure. Returns whether one
    /// was scheduled.
    pub fn sync(&mut self, inputs: &RowInputs<'_>) -> bool {
        let fingerprint = inputs.fingerprint();
        self.rows = inputs.build();
        let previous = self.fingerprint.replace(fingerprint);
        match previous {
            None => {
                let (rows, metrics) = (&self.rows, &self.metrics);
                self.inner.measure(rows.len(), |i| rows[i].height(metrics));
                false
            }
            Some(prev) if prev != fingerprint => {
                log::debug!("row inputs changed, remeasure scheduled");
                self.inner.schedule_remeasure();
                true
            }
            Some(_) => false,
        }
    }

    /// Run a scheduled remeasure against the latest rows
    pub fn after_layout(&mut self) -> bool {
        let (rows, metrics) = (&self.rows, &self.metrics);
        self.inner.after_layout(rows.len(), |i| rows[i].height(metrics))
    }

    pub fn remeasure_pending(&self) -> bool {
        self.inner.remeasure_pending()
    }

    pub fn set_scroll(&mut self, scroll_top: f64, viewport_height: f64) {
        self.inner.set_scroll(scroll_top, viewport_height);
    }

    pub fn rows(&self) -> &[WorkspaceRow] {
        &self.rows
    }

    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.inner.start_of(index)
    }

    pub fn total_height(&self) -> f64 {
        self.inner.total_size()
    }

    /// Rows to render, paired with their slots
    pub fn virtual_rows(&self) -> Vec<(VirtualItem, &WorkspaceRow)> {
        self.inner
            .virtual_items()
            .into_iter()
            .filter_map(|slot| self.rows.get(slot.index).map(|row| (slot, row)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Settings, SubProject};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn fixture() -> (Structure, BTreeMap<String, ProjectData>) {
        let structure = Structure {
            workspaces: vec![
                Workspace::new("w1", "One", 0),
                Workspace::new("w2", "Two", 1),
                Workspace::new("w3", "Three", 2),
            ],
            projects: vec![
                Project::new("p1", "Alpha", "w1", 0),
                Project::new("p2", "Beta", "w1", 1),
                Project::new("p3", "Gamma", "w2", 0),
            ],
            settings: Settings::default(),
        };
        let mut data = BTreeMap::new();
        data.insert(
            "p1".to_string(),
            ProjectData {
                items: vec![
                    Item::new("i1", "a", "p1", day(1)),
                    Item::new("i2", "b", "p1", day(1)),
                    Item::new("i3", "c", "p1", day(2)).in_sub_project("s1"),
                ],
                milestones: vec![],
                sub_projects: vec![SubProject::new("s1", "Sprint", "p1", day(1), day(4))],
            },
        );
        (structure, data)
    }

    #[test]
    fn test_closed_rows_are_headers_only() {
        let (structure, data) = fixture();
        let metrics = GridMetrics::default();
        let (open, measured) = (BTreeSet::new(), HashMap::new());
        let inputs = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics };
        let rows = inputs.build();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].height(&metrics), 36.0 + 2.0 * 32.0);
        assert_eq!(rows[2].height(&metrics), 36.0);
    }

    #[test]
    fn test_collapsed_workspace_is_header_only() {
        let (mut structure, data) = fixture();
        structure.workspaces[0].collapsed = true;
        let metrics = GridMetrics::default();
        let open: BTreeSet<String> = ["p1".to_string()].into();
        let measured = HashMap::new();
        let inputs = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics };
        assert_eq!(inputs.build()[0].height(&metrics), 36.0);
    }

    #[test]
    fn test_toggled_workspace_flips_stored_flag() {
        let (mut structure, data) = fixture();
        structure.workspaces[1].collapsed = true;
        let metrics = GridMetrics::default();
        let (open, measured) = (BTreeSet::new(), HashMap::new());
        let toggled: BTreeSet<String> = ["w1".to_string(), "w2".to_string()].into();
        let inputs = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &toggled, measured_heights: &measured, metrics: &metrics };
        let rows = inputs.build();
        assert!(rows[0].collapsed);
        assert_eq!(rows[0].height(&metrics), 36.0);
        assert!(!rows[1].collapsed);
        assert_eq!(rows[1].projects.len(), 1);

        let untoggled = RowInputs { toggled_workspaces: &BTreeSet::new(), ..inputs };
        assert_ne!(untoggled.fingerprint(), inputs.fingerprint());
    }

    #[test]
    fn test_measured_height_wins_over_estimate() {
        let (structure, data) = fixture();
        let metrics = GridMetrics::default();
        let open: BTreeSet<String> = ["p1".to_string()].into();
        let measured: HashMap<String, f64> = [("p1".to_string(), 500.0)].into();
        let inputs = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics };
        let rows = inputs.build();
        assert_eq!(rows[0].projects[0].body_height(), 500.0);
        assert_eq!(rows[0].project_offset("p2", &metrics), Some(36.0 + 32.0 + 500.0));
    }

    #[test]
    fn test_expanding_pushes_following_rows_after_layout() {
        let (structure, data) = fixture();
        let metrics = GridMetrics::default();
        let measured = HashMap::new();
        let mut open = BTreeSet::new();

        let mut rows = RowVirtualizer::new(metrics.clone());
        rows.sync(&RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics });
        let before: Vec<f64> = (0..3).map(|i| rows.start_of(i).unwrap()).collect();
        let total_before = rows.total_height();

        open.insert("p1".to_string());
        let inputs = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics };
        let expanded = project_expanded_height(
            &structure.projects[0],
            &data["p1"].items,
            &data["p1"].sub_projects,
            &metrics,
        )
        .total_height;

        assert!(rows.sync(&inputs));
        // deferred: nothing moves until layout settles
        assert_eq!(rows.start_of(1), Some(before[1]));

        assert!(rows.after_layout());
        assert_eq!(rows.start_of(0), Some(before[0]));
        assert_eq!(rows.start_of(1), Some(before[1] + expanded));
        assert_eq!(rows.start_of(2), Some(before[2] + expanded));
        assert_eq!(rows.total_height(), total_before + expanded);

        // same inputs again: no drift, no new remeasure
        assert!(!rows.sync(&inputs));
        assert!(!rows.after_layout());
        assert_eq!(rows.start_of(2), Some(before[2] + expanded));
    }

    #[test]
    fn test_item_move_changes_fingerprint() {
        let (structure, mut data) = fixture();
        let metrics = GridMetrics::default();
        let (open, measured) = (BTreeSet::new(), HashMap::new());
        let first = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics }.fingerprint();
        data.get_mut("p1").unwrap().items[0].date = day(9);
        let second = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics }.fingerprint();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hidden_completed_tasks_do_not_stack() {
        let (mut structure, mut data) = fixture();
        structure.settings.show_completed = false;
        data.get_mut("p1").unwrap().items[1].completed = true;
        let metrics = GridMetrics::default();
        let open: BTreeSet<String> = ["p1".to_string()].into();
        let measured = HashMap::new();
        let rows = RowInputs { structure: &structure, data: &data, open_projects: &open, toggled_workspaces: &BTreeSet::new(), measured_heights: &measured, metrics: &metrics }.build();
        let expanded = rows[0].projects[0].expanded.as_ref().unwrap();
        assert_eq!(expanded.main_row_height, metrics.base_row_height);
    }
}
