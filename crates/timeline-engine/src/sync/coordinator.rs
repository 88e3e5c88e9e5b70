//! Optimistic Mutation Coordinator
//!
//! Every write runs the same protocol:
//! snapshot → cancel in-flight reads → optimistic patch → remote call →
//! promote (creates) or rollback (failures) → invalidate.
//!
//! Rollback restores the mutation's own snapshot. Two overlapping mutations
//! on the same cache are last-writer-wins.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::dnd::DropResolution;
use crate::domain::{
    DataKey, DateWindow, Entity, EntityKind, Item, ItemBatchEntry, ItemPatch, Milestone,
    MilestonePatch, ProjectData, SettingsPatch, StructureKey, SubProject, SubProjectPatch,
    TEMP_ID_PREFIX,
};
use crate::error::{SyncError, SyncResult};

use super::cache::TimelineCaches;
use super::home::{rehome, CacheHome, Cached, DataHome};
use super::remote::{RemoteCollection, TimelineApi};

/// What happens to a sub-project's items when it is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildPolicy {
    /// Items stay on their dates, outside any sub-project
    KeepItems,
    /// Items are deleted with their container
    DeleteItems,
}

pub struct MutationCoordinator<A> {
    api: Rc<A>,
    caches: TimelineCaches,
    next_temp: Cell<u64>,
}

impl<A: TimelineApi> MutationCoordinator<A> {
    pub fn new(api: Rc<A>, caches: TimelineCaches) -> Self {
        Self {
            api,
            caches,
            next_temp: Cell::new(1),
        }
    }

    pub fn caches(&self) -> &TimelineCaches {
        &self.caches
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn mint_temp_id(&self, kind: EntityKind) -> String {
        let n = self.next_temp.get();
        self.next_temp.set(n + 1);
        format!("{}{}-{}", TEMP_ID_PREFIX, kind.as_str(), n)
    }

    // ========================
    // Generic CRUD
    // ========================

    /// Insert `draft` under a temporary id, then swap in the canonical id once
    /// the store confirms. Returns the stored entity.
    pub async fn create<T>(&self, mut draft: T) -> SyncResult<T>
    where
        T: Cached,
        A: RemoteCollection<T>,
    {
        let temp_id = self.mint_temp_id(T::KIND);
        draft.set_id(temp_id.clone());

        let snapshot = <T::Home as CacheHome<T>>::snapshot(&self.caches);
        <T::Home as CacheHome<T>>::cancel_reads(&self.caches);
        <T::Home as CacheHome<T>>::insert(&self.caches, &draft);
        debug!("[SYNC] optimistic create {} {}", T::KIND, temp_id);

        match <A as RemoteCollection<T>>::create(&*self.api, &draft).await {
            Ok(stored) => {
                debug!("[SYNC] promote {} -> {}", temp_id, stored.id());
                self.caches.promote_id(&temp_id, stored.id());
                <T::Home as CacheHome<T>>::invalidate(&self.caches);
                Ok(stored)
            }
            Err(e) => {
                warn!("[SYNC] create {} failed, rolling back: {}", T::KIND, e);
                snapshot.restore(&self.caches);
                Err(e.into())
            }
        }
    }

    /// Merge `patch` into the cached entity, then persist it
    pub async fn update<T>(&self, id: &str, patch: T::Patch) -> SyncResult<()>
    where
        T: Cached,
        A: RemoteCollection<T>,
    {
        if <T::Home as CacheHome<T>>::find(&self.caches, id).is_none() {
            return Err(unknown::<T>(id));
        }

        let snapshot = <T::Home as CacheHome<T>>::snapshot(&self.caches);
        <T::Home as CacheHome<T>>::cancel_reads(&self.caches);
        <T::Home as CacheHome<T>>::update(&self.caches, id, &patch);
        debug!("[SYNC] optimistic update {} {}", T::KIND, id);

        let result = <A as RemoteCollection<T>>::update(&*self.api, id, &patch).await;
        if let Err(e) = &result {
            warn!("[SYNC] update {} {} failed, rolling back: {}", T::KIND, id, e);
            snapshot.restore(&self.caches);
        }
        <T::Home as CacheHome<T>>::invalidate(&self.caches);
        result.map_err(SyncError::from)
    }

    /// Remove the cached entity, then delete it remotely. Deleting a
    /// sub-project this way leaves its items pointing at it; see
    /// `delete_sub_project` for the cascading variants.
    pub async fn delete<T>(&self, id: &str) -> SyncResult<()>
    where
        T: Cached,
        A: RemoteCollection<T>,
    {
        if <T::Home as CacheHome<T>>::find(&self.caches, id).is_none() {
            return Err(unknown::<T>(id));
        }

        let snapshot = <T::Home as CacheHome<T>>::snapshot(&self.caches);
        <T::Home as CacheHome<T>>::cancel_reads(&self.caches);
        <T::Home as CacheHome<T>>::remove(&self.caches, id);
        debug!("[SYNC] optimistic delete {} {}", T::KIND, id);

        let result = <A as RemoteCollection<T>>::delete(&*self.api, id).await;
        if let Err(e) = &result {
            warn!("[SYNC] delete {} {} failed, rolling back: {}", T::KIND, id, e);
            snapshot.restore(&self.caches);
        }
        <T::Home as CacheHome<T>>::invalidate(&self.caches);
        result.map_err(SyncError::from)
    }

    // ========================
    // Sub-projects and their items
    // ========================

    /// Move a sub-project so it starts on `new_start`, carrying its items by
    /// the same number of days. One optimistic patch, two remote calls.
    pub async fn shift_sub_project(&self, id: &str, new_start: NaiveDate) -> SyncResult<()> {
        let sub_project = self.find_sub_project(id)?;
        let delta = new_start - sub_project.start_date;
        if delta.num_days() == 0 {
            return Ok(());
        }
        let (start_date, end_date) = sub_project.shifted(delta);
        let patch = SubProjectPatch {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        };

        let snapshot = self.caches.data.snapshot();
        self.caches.data.cancel_reads();
        let batch = self.caches.data.apply_patch(|entries| {
            let mut moved = sub_project.clone();
            moved.apply(&patch);
            rehome(entries, &moved);

            let mut batch = Vec::new();
            for mut item in sub_project_members(entries, id) {
                let entry = ItemPatch::date(item.date + delta);
                item.apply(&entry);
                rehome(entries, &item);
                batch.push(ItemBatchEntry { id: item.id.clone(), patch: entry });
            }
            batch
        });
        debug!("[SYNC] optimistic shift sub-project {} by {} days ({} items)", id, delta.num_days(), batch.len());

        let mut result = <A as RemoteCollection<SubProject>>::update(&*self.api, id, &patch).await;
        if result.is_ok() && !batch.is_empty() {
            result = self.api.batch_update_items(&batch).await;
        }
        if let Err(e) = &result {
            warn!("[SYNC] shift sub-project {} failed, rolling back: {}", id, e);
            self.caches.data.restore(snapshot);
        }
        self.caches.data.invalidate_all();
        result.map_err(SyncError::from)
    }

    /// Delete a sub-project, unlinking or deleting its items per `policy`
    pub async fn delete_sub_project(&self, id: &str, policy: ChildPolicy) -> SyncResult<()> {
        self.find_sub_project(id)?;

        let snapshot = self.caches.data.snapshot();
        self.caches.data.cancel_reads();
        let members = self.caches.data.apply_patch(|entries| {
            let members = sub_project_members(entries, id);
            for data in entries.values_mut() {
                data.sub_projects.retain(|sp| sp.id != id);
                match policy {
                    ChildPolicy::KeepItems => {
                        for item in data.items.iter_mut().filter(|i| i.sub_project_id.as_deref() == Some(id)) {
                            item.sub_project_id = None;
                        }
                    }
                    ChildPolicy::DeleteItems => {
                        data.items.retain(|i| i.sub_project_id.as_deref() != Some(id));
                    }
                }
            }
            members
        });
        debug!("[SYNC] optimistic delete sub-project {} ({:?}, {} items)", id, policy, members.len());

        let result = async {
            match policy {
                ChildPolicy::KeepItems if !members.is_empty() => {
                    let batch: Vec<ItemBatchEntry> = members
                        .iter()
                        .map(|item| ItemBatchEntry {
                            id: item.id.clone(),
                            patch: ItemPatch { sub_project_id: Some(None), ..Default::default() },
                        })
                        .collect();
                    self.api.batch_update_items(&batch).await?;
                }
                ChildPolicy::KeepItems => {}
                ChildPolicy::DeleteItems => {
                    for item in &members {
                        <A as RemoteCollection<Item>>::delete(&*self.api, &item.id).await?;
                    }
                }
            }
            <A as RemoteCollection<SubProject>>::delete(&*self.api, id).await
        }
        .await;

        if let Err(e) = &result {
            warn!("[SYNC] delete sub-project {} failed, rolling back: {}", id, e);
            self.caches.data.restore(snapshot);
        }
        self.caches.data.invalidate_all();
        result.map_err(SyncError::from)
    }

    fn find_sub_project(&self, id: &str) -> SyncResult<SubProject> {
        <DataHome as CacheHome<SubProject>>::find(&self.caches, id).ok_or_else(|| unknown::<SubProject>(id))
    }

    // ========================
    // Ordering and settings
    // ========================

    /// Persist a new top-level workspace order
    pub async fn reorder_workspaces(&self, ordered_ids: Vec<String>) -> SyncResult<()> {
        let snapshot = self.caches.structure.snapshot();
        self.caches.structure.cancel_reads();
        self.apply_workspace_order(&ordered_ids);
        debug!("[SYNC] optimistic workspace order {:?}", ordered_ids);

        let result = self.api.reorder_workspaces(&ordered_ids).await;
        match &result {
            // Same race as settings: the order lives in settings
            Ok(()) => self.apply_workspace_order(&ordered_ids),
            Err(e) => {
                warn!("[SYNC] reorder workspaces failed, rolling back: {}", e);
                self.caches.structure.restore(snapshot);
            }
        }
        self.caches.structure.invalidate(&StructureKey);
        result.map_err(SyncError::from)
    }

    fn apply_workspace_order(&self, ordered_ids: &[String]) {
        self.caches.structure.apply_patch(|entries| {
            if let Some(structure) = entries.get_mut(&StructureKey) {
                structure.settings.workspace_order = ordered_ids.to_vec();
                for workspace in &mut structure.workspaces {
                    if let Some(index) = ordered_ids.iter().position(|id| *id == workspace.id) {
                        workspace.position = index as i32;
                    }
                }
            }
        });
    }

    /// Persist a new project order inside one workspace
    pub async fn reorder_projects(&self, workspace_id: &str, ordered_ids: Vec<String>) -> SyncResult<()> {
        let snapshot = self.caches.structure.snapshot();
        self.caches.structure.cancel_reads();
        self.caches.structure.apply_patch(|entries| {
            if let Some(structure) = entries.get_mut(&StructureKey) {
                for project in structure.projects.iter_mut().filter(|p| p.workspace_id == workspace_id) {
                    if let Some(index) = ordered_ids.iter().position(|id| *id == project.id) {
                        project.position = index as i32;
                    }
                }
            }
        });
        debug!("[SYNC] optimistic project order in {}: {:?}", workspace_id, ordered_ids);

        let result = self.api.reorder_projects(workspace_id, &ordered_ids).await;
        if let Err(e) = &result {
            warn!("[SYNC] reorder projects failed, rolling back: {}", e);
            self.caches.structure.restore(snapshot);
        }
        self.caches.structure.invalidate(&StructureKey);
        result.map_err(SyncError::from)
    }

    /// Settings writes re-apply their patch after success: a structure read
    /// landing in between would otherwise put the old values back.
    pub async fn update_settings(&self, patch: SettingsPatch) -> SyncResult<()> {
        let snapshot = self.caches.structure.snapshot();
        self.caches.structure.cancel_reads();
        self.apply_settings(&patch);
        debug!("[SYNC] optimistic settings {:?}", patch);

        match self.api.update_settings(&patch).await {
            Ok(()) => {
                self.apply_settings(&patch);
                Ok(())
            }
            Err(e) => {
                warn!("[SYNC] settings update failed, rolling back: {}", e);
                self.caches.structure.restore(snapshot);
                Err(e.into())
            }
        }
    }

    fn apply_settings(&self, patch: &SettingsPatch) {
        self.caches.structure.apply_patch(|entries| {
            if let Some(structure) = entries.get_mut(&StructureKey) {
                structure.settings.apply(patch);
            }
        });
    }

    // ========================
    // UI entry points
    // ========================

    /// Persist what a drag resolved to
    pub async fn apply_drop(&self, resolution: DropResolution) -> SyncResult<()> {
        match resolution {
            DropResolution::MoveItem { id, patch } => self.update::<Item>(&id, patch).await,
            DropResolution::MoveMilestone { id, date } => {
                let patch = MilestonePatch { date: Some(date), ..Default::default() };
                self.update::<Milestone>(&id, patch).await
            }
            DropResolution::ShiftSubProject { id, new_start } => self.shift_sub_project(&id, new_start).await,
        }
    }

    /// Create a task from the inline input of a day cell. A blank title does
    /// nothing.
    pub async fn quick_create_item(
        &self,
        project_id: &str,
        date: NaiveDate,
        title: &str,
        sub_project_id: Option<&str>,
    ) -> SyncResult<Option<Item>> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }
        let mut draft = Item::new("", title, project_id, date);
        draft.sub_project_id = sub_project_id.map(str::to_string);
        self.create(draft).await.map(Some)
    }

    // ========================
    // Reads
    // ========================

    /// Fetch workspaces, projects and settings. Returns false if a write
    /// started meanwhile and the result was dropped.
    pub async fn load_structure(&self) -> SyncResult<bool> {
        let ticket = self.caches.structure.begin_read(StructureKey);
        let structure = self.api.fetch_structure().await?;
        info!(
            "[SYNC] loaded structure: {} workspaces, {} projects",
            structure.workspaces.len(),
            structure.projects.len()
        );
        let stored = self.caches.structure.finish_read(ticket, structure);
        if !stored {
            debug!("[SYNC] structure read superseded by a local write");
        }
        Ok(stored)
    }

    /// Fetch one project's items, milestones and sub-projects for a window
    pub async fn load_project(&self, project_id: &str, window: DateWindow) -> SyncResult<bool> {
        let ticket = self.caches.data.begin_read(DataKey::new(project_id, window));
        let data = ProjectData {
            items: self.api.list_items(project_id, window).await?,
            milestones: self.api.list_milestones(project_id, window).await?,
            sub_projects: self.api.list_sub_projects(project_id, window).await?,
        };
        info!(
            "[SYNC] loaded {} {}..{}: {} items, {} milestones, {} sub-projects",
            project_id,
            window.start,
            window.end,
            data.items.len(),
            data.milestones.len(),
            data.sub_projects.len()
        );
        let stored = self.caches.data.finish_read(ticket, data);
        if !stored {
            debug!("[SYNC] data read for {} superseded by a local write", project_id);
        }
        Ok(stored)
    }

    /// Refetch every invalidated entry. Data of projects that left the
    /// structure is dropped instead.
    pub async fn refetch_stale(&self) -> SyncResult<()> {
        if self.caches.structure.is_stale(&StructureKey) {
            self.load_structure().await?;
        }

        let structure = self.caches.structure_value();
        let (live, orphaned): (Vec<DataKey>, Vec<DataKey>) = self
            .caches
            .data
            .stale_keys()
            .into_iter()
            .partition(|key| structure.project(&key.project_id).is_some());
        for key in &orphaned {
            debug!("[SYNC] dropping data of removed project {}", key.project_id);
            self.caches.data.remove(key);
        }
        for key in live {
            self.load_project(&key.project_id, key.window).await?;
        }
        Ok(())
    }
}

/// Items of a sub-project across every cached window, once each
fn sub_project_members(entries: &BTreeMap<DataKey, ProjectData>, sub_project_id: &str) -> Vec<Item> {
    let mut members: BTreeMap<String, Item> = BTreeMap::new();
    for data in entries.values() {
        for item in data.members_of(sub_project_id) {
            members.entry(item.id.clone()).or_insert_with(|| item.clone());
        }
    }
    members.into_values().collect()
}

fn unknown<T: Entity>(id: &str) -> SyncError {
    SyncError::UnknownEntity {
        kind: T::KIND,
        id: id.to_string(),
    }
}
