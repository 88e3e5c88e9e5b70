//! Where each entity type lives in the caches
//!
//! Workspaces and projects sit in the structure cache; items, milestones and
//! sub-projects sit in the data cache, once per cached window of their
//! project. The coordinator is generic over the entity and reaches its cache
//! through `Cached::Home`.

use std::collections::BTreeMap;

use crate::domain::{
    DataKey, DateWindow, Entity, Item, Milestone, Project, ProjectData, Structure, StructureKey,
    SubProject, Workspace,
};
use super::cache::{CacheSnapshot, TimelineCaches};

/// Pre-mutation copy of the cache an entity type lives in
#[derive(Debug, Clone, PartialEq)]
pub enum HomeSnapshot {
    Structure(CacheSnapshot<StructureKey, Structure>),
    Data(CacheSnapshot<DataKey, ProjectData>),
}

impl HomeSnapshot {
    pub fn restore(self, caches: &TimelineCaches) {
        match self {
            HomeSnapshot::Structure(snapshot) => caches.structure.restore(snapshot),
            HomeSnapshot::Data(snapshot) => caches.data.restore(snapshot),
        }
    }
}

/// Cache operations for one entity type
pub trait CacheHome<T: Entity> {
    fn snapshot(caches: &TimelineCaches) -> HomeSnapshot;

    fn cancel_reads(caches: &TimelineCaches);

    fn find(caches: &TimelineCaches, id: &str) -> Option<T>;

    fn insert(caches: &TimelineCaches, entity: &T);

    /// Merge a patch into the cached entity; returns the result if it was cached
    fn update(caches: &TimelineCaches, id: &str, patch: &T::Patch) -> Option<T>;

    fn remove(caches: &TimelineCaches, id: &str) -> Option<T>;

    fn invalidate(caches: &TimelineCaches);
}

/// Entity types whose cache placement is known
pub trait Cached: Entity {
    type Home: CacheHome<Self>;
}

// ========================
// Structure cache
// ========================

pub struct StructureHome;

pub trait StructureMember: Entity {
    fn members(structure: &Structure) -> &Vec<Self>;

    fn members_mut(structure: &mut Structure) -> &mut Vec<Self>;

    fn on_insert(_structure: &mut Structure, _entity: &Self) {}

    fn on_remove(_structure: &mut Structure, _id: &str) {}
}

impl StructureMember for Workspace {
    fn members(structure: &Structure) -> &Vec<Self> {
        &structure.workspaces
    }

    fn members_mut(structure: &mut Structure) -> &mut Vec<Self> {
        &mut structure.workspaces
    }

    fn on_insert(structure: &mut Structure, entity: &Self) {
        let order = &mut structure.settings.workspace_order;
        if !order.is_empty() && !order.contains(&entity.id) {
            order.push(entity.id.clone());
        }
    }

    fn on_remove(structure: &mut Structure, id: &str) {
        structure.settings.workspace_order.retain(|o| o != id);
    }
}

impl StructureMember for Project {
    fn members(structure: &Structure) -> &Vec<Self> {
        &structure.projects
    }

    fn members_mut(structure: &mut Structure) -> &mut Vec<Self> {
        &mut structure.projects
    }
}

impl<T: StructureMember> CacheHome<T> for StructureHome {
    fn snapshot(caches: &TimelineCaches) -> HomeSnapshot {
        HomeSnapshot::Structure(caches.structure.snapshot())
    }

    fn cancel_reads(caches: &TimelineCaches) {
        caches.structure.cancel_reads();
    }

    fn find(caches: &TimelineCaches, id: &str) -> Option<T> {
        caches.structure.with(|entries| {
            entries
                .get(&StructureKey)
                .and_then(|s| T::members(s).iter().find(|m| m.id() == id).cloned())
        })
    }

    fn insert(caches: &TimelineCaches, entity: &T) {
        caches.structure.apply_patch(|entries| {
            if let Some(structure) = entries.get_mut(&StructureKey) {
                T::members_mut(structure).push(entity.clone());
                T::on_insert(structure, entity);
            }
        });
    }

    fn update(caches: &TimelineCaches, id: &str, patch: &T::Patch) -> Option<T> {
        caches.structure.apply_patch(|entries| {
            let structure = entries.get_mut(&StructureKey)?;
            let member = T::members_mut(structure).iter_mut().find(|m| m.id() == id)?;
            member.apply(patch);
            Some(member.clone())
        })
    }

    fn remove(caches: &TimelineCaches, id: &str) -> Option<T> {
        caches.structure.apply_patch(|entries| {
            let structure = entries.get_mut(&StructureKey)?;
            let members = T::members_mut(structure);
            let index = members.iter().position(|m| m.id() == id)?;
            let removed = members.remove(index);
            T::on_remove(structure, id);
            Some(removed)
        })
    }

    fn invalidate(caches: &TimelineCaches) {
        caches.structure.invalidate(&StructureKey);
    }
}

// ========================
// Data cache
// ========================

pub struct DataHome;

pub trait ProjectMember: Entity {
    fn members(data: &ProjectData) -> &Vec<Self>;

    fn members_mut(data: &mut ProjectData) -> &mut Vec<Self>;

    fn project_id(&self) -> &str;

    /// Whether a window's read would return this entity
    fn within(&self, window: &DateWindow) -> bool;
}

impl ProjectMember for Item {
    fn members(data: &ProjectData) -> &Vec<Self> {
        &data.items
    }

    fn members_mut(data: &mut ProjectData) -> &mut Vec<Self> {
        &mut data.items
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn within(&self, window: &DateWindow) -> bool {
        window.contains(self.date)
    }
}

impl ProjectMember for Milestone {
    fn members(data: &ProjectData) -> &Vec<Self> {
        &data.milestones
    }

    fn members_mut(data: &mut ProjectData) -> &mut Vec<Self> {
        &mut data.milestones
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn within(&self, window: &DateWindow) -> bool {
        window.contains(self.date)
    }
}

impl ProjectMember for SubProject {
    fn members(data: &ProjectData) -> &Vec<Self> {
        &data.sub_projects
    }

    fn members_mut(data: &mut ProjectData) -> &mut Vec<Self> {
        &mut data.sub_projects
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn within(&self, window: &DateWindow) -> bool {
        window.overlaps(self.start_date, self.end_date)
    }
}

/// Put `entity` in every entry it belongs to and take it out of every entry
/// it no longer belongs to (project change, date moved out of the window)
pub(crate) fn rehome<T: ProjectMember>(entries: &mut BTreeMap<DataKey, ProjectData>, entity: &T) {
    for (key, data) in entries.iter_mut() {
        let belongs = key.project_id == entity.project_id() && entity.within(&key.window);
        let members = T::members_mut(data);
        match (belongs, members.iter().position(|m| m.id() == entity.id())) {
            (true, Some(index)) => members[index] = entity.clone(),
            (true, None) => members.push(entity.clone()),
            (false, Some(index)) => {
                members.remove(index);
            }
            (false, None) => {}
        }
    }
}

pub(crate) fn find_in<T: ProjectMember>(entries: &BTreeMap<DataKey, ProjectData>, id: &str) -> Option<T> {
    entries
        .values()
        .find_map(|data| T::members(data).iter().find(|m| m.id() == id).cloned())
}

impl<T: ProjectMember> CacheHome<T> for DataHome {
    fn snapshot(caches: &TimelineCaches) -> HomeSnapshot {
        HomeSnapshot::Data(caches.data.snapshot())
    }

    fn cancel_reads(caches: &TimelineCaches) {
        caches.data.cancel_reads();
    }

    fn find(caches: &TimelineCaches, id: &str) -> Option<T> {
        caches.data.with(|entries| find_in(entries, id))
    }

    fn insert(caches: &TimelineCaches, entity: &T) {
        caches.data.apply_patch(|entries| rehome(entries, entity));
    }

    fn update(caches: &TimelineCaches, id: &str, patch: &T::Patch) -> Option<T> {
        caches.data.apply_patch(|entries| {
            let mut entity: T = find_in(entries, id)?;
            entity.apply(patch);
            rehome(entries, &entity);
            Some(entity)
        })
    }

    fn remove(caches: &TimelineCaches, id: &str) -> Option<T> {
        caches.data.apply_patch(|entries| {
            let removed: Option<T> = find_in(entries, id);
            for data in entries.values_mut() {
                T::members_mut(data).retain(|m| m.id() != id);
            }
            removed
        })
    }

    fn invalidate(caches: &TimelineCaches) {
        caches.data.invalidate_all();
    }
}

impl Cached for Workspace {
    type Home = StructureHome;
}

impl Cached for Project {
    type Home = StructureHome;
}

impl Cached for Item {
    type Home = DataHome;
}

impl Cached for Milestone {
    type Home = DataHome;
}

impl Cached for SubProject {
    type Home = DataHome;
}
