//! Coordinator tests against an in-memory store

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use super::*;
use crate::dnd::DropResolution;
use crate::domain::{
    DataKey, DateWindow, Entity, Item, ItemBatchEntry, ItemPatch, Milestone, Project, Settings,
    SettingsPatch, Structure, StructureKey, SubProject, Workspace,
};
use crate::error::{ApiError, ApiResult, SyncError};

// ========================
// Fake store
// ========================

#[derive(Default)]
struct FakeState {
    next_id: u64,
    workspaces: Vec<Workspace>,
    projects: Vec<Project>,
    settings: Settings,
    items: Vec<Item>,
    milestones: Vec<Milestone>,
    sub_projects: Vec<SubProject>,
}

#[derive(Default)]
struct FakeApi {
    state: RefCell<FakeState>,
    /// Every write, in call order
    calls: RefCell<Vec<String>>,
    fail_on: RefCell<Vec<String>>,
    /// Holds the named call until notified
    gate: RefCell<Option<(String, Rc<Notify>)>>,
}

impl FakeApi {
    fn seeded() -> Self {
        let api = FakeApi::default();
        {
            let mut state = api.state.borrow_mut();
            state.next_id = 100;
            state.workspaces = vec![Workspace::new("w1", "Work", 0), Workspace::new("w2", "Home", 1)];
            state.projects = vec![Project::new("p1", "Launch", "w1", 0), Project::new("p2", "Docs", "w1", 1)];
            state.items = vec![
                Item::new("i1", "Kickoff", "p1", day(5)),
                Item::new("i2", "Draft", "p1", day(6)).in_sub_project("sp1"),
                Item::new("i3", "Review", "p1", day(7)).in_sub_project("sp1"),
            ];
            state.milestones = vec![Milestone::new("m1", "Beta", "p1", day(10))];
            state.sub_projects = vec![SubProject::new("sp1", "Sprint", "p1", day(6), day(8))];
        }
        api
    }

    fn fail(&self, call: &str) {
        self.fail_on.borrow_mut().push(call.to_string());
    }

    fn hold(&self, call: &str) -> Rc<Notify> {
        let notify = Rc::new(Notify::new());
        *self.gate.borrow_mut() = Some((call.to_string(), Rc::clone(&notify)));
        notify
    }

    /// Let every later call through without waiting
    fn release(&self) {
        self.gate.borrow_mut().take();
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    async fn pass(&self, call: &str) {
        let gate = self
            .gate
            .borrow()
            .as_ref()
            .filter(|(name, _)| name == call)
            .map(|(_, notify)| Rc::clone(notify));
        if let Some(notify) = gate {
            notify.notified().await;
        }
    }

    /// Records a write and fails it if asked to
    async fn write(&self, call: String) -> ApiResult<()> {
        self.pass(&call).await;
        self.calls.borrow_mut().push(call.clone());
        if self.fail_on.borrow().contains(&call) {
            return Err(ApiError::Internal(format!("{} refused", call)));
        }
        Ok(())
    }

    fn mint_id(&self) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id.to_string()
    }
}

macro_rules! fake_collection {
    ($ty:ty, $field:ident) => {
        #[async_trait(?Send)]
        impl RemoteCollection<$ty> for FakeApi {
            async fn create(&self, draft: &$ty) -> ApiResult<$ty> {
                self.write(format!("create {}", <$ty as Entity>::KIND)).await?;
                let mut stored = draft.clone();
                stored.set_id(self.mint_id());
                self.state.borrow_mut().$field.push(stored.clone());
                Ok(stored)
            }

            async fn update(&self, id: &str, patch: &<$ty as Entity>::Patch) -> ApiResult<()> {
                self.write(format!("update {} {}", <$ty as Entity>::KIND, id)).await?;
                let mut state = self.state.borrow_mut();
                let entity = state
                    .$field
                    .iter_mut()
                    .find(|e| e.id() == id)
                    .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
                entity.apply(patch);
                Ok(())
            }

            async fn delete(&self, id: &str) -> ApiResult<()> {
                self.write(format!("delete {} {}", <$ty as Entity>::KIND, id)).await?;
                self.state.borrow_mut().$field.retain(|e| e.id() != id);
                Ok(())
            }
        }
    };
}

fake_collection!(Workspace, workspaces);
fake_collection!(Project, projects);
fake_collection!(SubProject, sub_projects);
fake_collection!(Item, items);
fake_collection!(Milestone, milestones);

#[async_trait(?Send)]
impl TimelineApi for FakeApi {
    async fn fetch_structure(&self) -> ApiResult<Structure> {
        self.pass("fetch_structure").await;
        let state = self.state.borrow();
        Ok(Structure {
            workspaces: state.workspaces.clone(),
            projects: state.projects.clone(),
            settings: state.settings.clone(),
        })
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> ApiResult<()> {
        self.write("update_settings".to_string()).await?;
        self.state.borrow_mut().settings.apply(patch);
        Ok(())
    }

    async fn reorder_workspaces(&self, ordered_ids: &[String]) -> ApiResult<()> {
        self.write("reorder_workspaces".to_string()).await?;
        let mut state = self.state.borrow_mut();
        state.settings.workspace_order = ordered_ids.to_vec();
        for workspace in &mut state.workspaces {
            if let Some(index) = ordered_ids.iter().position(|id| *id == workspace.id) {
                workspace.position = index as i32;
            }
        }
        Ok(())
    }

    async fn reorder_projects(&self, workspace_id: &str, ordered_ids: &[String]) -> ApiResult<()> {
        self.write(format!("reorder_projects {}", workspace_id)).await?;
        for project in &mut self.state.borrow_mut().projects {
            if let Some(index) = ordered_ids.iter().position(|id| *id == project.id) {
                project.position = index as i32;
            }
        }
        Ok(())
    }

    async fn batch_update_items(&self, entries: &[ItemBatchEntry]) -> ApiResult<()> {
        self.write(format!("batch_update_items {}", entries.len())).await?;
        let mut state = self.state.borrow_mut();
        for entry in entries {
            if let Some(item) = state.items.iter_mut().find(|i| i.id == entry.id) {
                item.apply(&entry.patch);
            }
        }
        Ok(())
    }

    async fn list_items(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Item>> {
        // The answer is formed before the gate, like a response still on the wire
        let items: Vec<Item> = self
            .state
            .borrow()
            .items
            .iter()
            .filter(|i| i.project_id == project_id && window.contains(i.date))
            .cloned()
            .collect();
        self.pass("list_items").await;
        Ok(items)
    }

    async fn list_milestones(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<Milestone>> {
        Ok(self
            .state
            .borrow()
            .milestones
            .iter()
            .filter(|m| m.project_id == project_id && window.contains(m.date))
            .cloned()
            .collect())
    }

    async fn list_sub_projects(&self, project_id: &str, window: DateWindow) -> ApiResult<Vec<SubProject>> {
        Ok(self
            .state
            .borrow()
            .sub_projects
            .iter()
            .filter(|sp| sp.project_id == project_id && window.overlaps(sp.start_date, sp.end_date))
            .cloned()
            .collect())
    }
}

// ========================
// Helpers
// ========================

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn march() -> DateWindow {
    DateWindow::new(day(1), day(31))
}

async fn setup_with(api: FakeApi) -> (Rc<FakeApi>, MutationCoordinator<FakeApi>) {
    let api = Rc::new(api);
    let coordinator = MutationCoordinator::new(Rc::clone(&api), TimelineCaches::new());
    assert!(coordinator.load_structure().await.unwrap());
    assert!(coordinator.load_project("p1", march()).await.unwrap());
    (api, coordinator)
}

async fn setup() -> (Rc<FakeApi>, MutationCoordinator<FakeApi>) {
    setup_with(FakeApi::seeded()).await
}

fn cached_item(coordinator: &MutationCoordinator<FakeApi>, id: &str) -> Option<Item> {
    <DataHome as CacheHome<Item>>::find(coordinator.caches(), id)
}

fn p1_data(coordinator: &MutationCoordinator<FakeApi>) -> crate::domain::ProjectData {
    coordinator
        .caches()
        .data
        .get(&DataKey::new("p1", march()))
        .unwrap()
}

// ========================
// Rollback
// ========================

#[tokio::test]
async fn test_failed_update_restores_caches_exactly() {
    let (api, coordinator) = setup().await;
    let structure_before = coordinator.caches().structure.snapshot();
    let data_before = coordinator.caches().data.snapshot();

    api.fail("update item i1");
    let result = coordinator.update::<Item>("i1", ItemPatch::date(day(20))).await;

    assert!(matches!(result, Err(SyncError::Remote(ApiError::Internal(_)))));
    assert_eq!(coordinator.caches().structure.snapshot(), structure_before);
    assert_eq!(coordinator.caches().data.snapshot(), data_before);
}

#[tokio::test]
async fn test_failed_delete_puts_entity_back() {
    let (api, coordinator) = setup().await;
    let before = coordinator.caches().data.snapshot();

    api.fail("delete milestone m1");
    assert!(coordinator.delete::<Milestone>("m1").await.is_err());
    assert_eq!(coordinator.caches().data.snapshot(), before);
}

#[tokio::test]
async fn test_earlier_mutation_survives_later_rollback() {
    let (api, coordinator) = setup().await;

    let rename = ItemPatch { title: Some("Kickoff call".into()), ..Default::default() };
    coordinator.update::<Item>("i1", rename).await.unwrap();

    api.fail("update item i1");
    assert!(coordinator.update::<Item>("i1", ItemPatch::date(day(9))).await.is_err());

    let item = cached_item(&coordinator, "i1").unwrap();
    assert_eq!(item.title, "Kickoff call");
    assert_eq!(item.date, day(5));
}

#[tokio::test]
async fn test_update_of_uncached_entity_skips_remote() {
    let (api, coordinator) = setup().await;
    let result = coordinator.update::<Item>("nope", ItemPatch::date(day(2))).await;
    assert_eq!(
        result,
        Err(SyncError::UnknownEntity { kind: crate::domain::EntityKind::Item, id: "nope".into() })
    );
    assert!(api.calls().is_empty());
}

// ========================
// Creates and temp ids
// ========================

#[tokio::test]
async fn test_create_shows_temp_id_then_promotes() {
    let (api, coordinator) = setup().await;
    let gate = api.hold("create item");

    let (created, seen_in_flight) = tokio::join!(
        coordinator.create(Item::new("", "Ship notes", "p1", day(12))),
        async {
            let in_flight = coordinator.caches().mentions("temp-item-1");
            gate.notify_one();
            in_flight
        }
    );

    let created = created.unwrap();
    assert!(seen_in_flight);
    assert_eq!(created.id, "101");
    assert!(!coordinator.caches().mentions("temp-item-1"));

    let data = p1_data(&coordinator);
    let matching: Vec<&Item> = data.items.iter().filter(|i| i.title == "Ship notes").collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, "101");
    assert_eq!(matching[0].date, day(12));
}

#[tokio::test]
async fn test_failed_create_leaves_no_temp_id() {
    let (api, coordinator) = setup().await;
    let before = coordinator.caches().data.snapshot();

    api.fail("create item");
    let result = coordinator.create(Item::new("", "Lost", "p1", day(3))).await;

    assert!(result.is_err());
    assert!(!coordinator.caches().mentions("temp-item-1"));
    assert_eq!(coordinator.caches().data.snapshot(), before);
}

#[tokio::test]
async fn test_workspace_create_promotes_order_entry() {
    let api = FakeApi::seeded();
    api.state.borrow_mut().settings.workspace_order = vec!["w2".into(), "w1".into()];
    let (_api, coordinator) = setup_with(api).await;

    let created = coordinator.create(Workspace::new("", "Side", 2)).await.unwrap();

    let structure = coordinator.caches().structure_value();
    assert_eq!(structure.settings.workspace_order, vec!["w2".to_string(), "w1".into(), created.id.clone()]);
    assert!(!coordinator.caches().mentions("temp-workspace-1"));
    let ids: Vec<&str> = structure.ordered_workspaces().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w2", "w1", created.id.as_str()]);
}

#[tokio::test]
async fn test_quick_create_ignores_blank_title() {
    let (api, coordinator) = setup().await;
    let created = coordinator.quick_create_item("p1", day(4), "   ", None).await.unwrap();
    assert_eq!(created, None);
    assert!(api.calls().is_empty());

    let created = coordinator.quick_create_item("p1", day(7), " Demo ", Some("sp1")).await.unwrap().unwrap();
    assert_eq!(created.title, "Demo");
    assert_eq!(created.sub_project_id.as_deref(), Some("sp1"));
}

// ========================
// Settings and ordering
// ========================

#[tokio::test]
async fn test_settings_survive_structure_read_during_write() {
    let (api, coordinator) = setup().await;
    let gate = api.hold("update_settings");

    let (written, _) = tokio::join!(
        coordinator.update_settings(SettingsPatch { show_completed: Some(false), ..Default::default() }),
        async {
            // a read started after the write lands the store's old value
            assert!(coordinator.load_structure().await.unwrap());
            assert!(coordinator.caches().structure_value().settings.show_completed);
            gate.notify_one();
        }
    );

    written.unwrap();
    assert!(!coordinator.caches().structure_value().settings.show_completed);
}

#[tokio::test]
async fn test_failed_settings_write_rolls_back() {
    let (api, coordinator) = setup().await;
    api.fail("update_settings");
    let result = coordinator.update_settings(SettingsPatch { past_days: Some(7), ..Default::default() }).await;
    assert!(result.is_err());
    assert_eq!(coordinator.caches().structure_value().settings.past_days, 30);
}

#[tokio::test]
async fn test_reorder_workspaces() {
    let (api, coordinator) = setup().await;
    coordinator.reorder_workspaces(vec!["w2".into(), "w1".into()]).await.unwrap();

    let structure = coordinator.caches().structure_value();
    let ids: Vec<&str> = structure.ordered_workspaces().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w2", "w1"]);
    assert_eq!(api.calls(), vec!["reorder_workspaces".to_string()]);
    assert!(coordinator.caches().structure.is_stale(&StructureKey));
}

#[tokio::test]
async fn test_reorder_projects() {
    let (_api, coordinator) = setup().await;
    coordinator.reorder_projects("w1", vec!["p2".into(), "p1".into()]).await.unwrap();

    let structure = coordinator.caches().structure_value();
    let ids: Vec<&str> = structure.projects_of("w1").iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
}

// ========================
// Sub-projects
// ========================

#[tokio::test]
async fn test_shift_moves_container_and_items_before_remote_returns() {
    let (api, coordinator) = setup().await;
    let gate = api.hold("update sub-project sp1");

    let (shifted, _) = tokio::join!(coordinator.shift_sub_project("sp1", day(8)), async {
        let data = p1_data(&coordinator);
        let sp = &data.sub_projects[0];
        assert_eq!((sp.start_date, sp.end_date), (day(8), day(10)));
        let dates: Vec<NaiveDate> = data.members_of("sp1").map(|i| i.date).collect();
        assert_eq!(dates, vec![day(8), day(9)]);
        gate.notify_one();
    });

    shifted.unwrap();
    assert_eq!(
        api.calls(),
        vec!["update sub-project sp1".to_string(), "batch_update_items 2".to_string()]
    );
    assert_eq!(cached_item(&coordinator, "i1").unwrap().date, day(5));
    let stored = api.state.borrow().items.iter().map(|i| i.date).collect::<Vec<_>>();
    assert_eq!(stored, vec![day(5), day(8), day(9)]);
}

#[tokio::test]
async fn test_shift_rolls_back_container_when_batch_fails() {
    let (api, coordinator) = setup().await;
    let before = coordinator.caches().data.snapshot();

    api.fail("batch_update_items 2");
    assert!(coordinator.shift_sub_project("sp1", day(1)).await.is_err());
    assert_eq!(coordinator.caches().data.snapshot(), before);
}

#[tokio::test]
async fn test_shift_to_same_start_is_noop() {
    let (api, coordinator) = setup().await;
    coordinator.shift_sub_project("sp1", day(6)).await.unwrap();
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_delete_sub_project_keeping_items() {
    let (api, coordinator) = setup().await;
    coordinator.delete_sub_project("sp1", ChildPolicy::KeepItems).await.unwrap();

    let data = p1_data(&coordinator);
    assert!(data.sub_projects.is_empty());
    assert_eq!(data.items.len(), 3);
    assert!(data.items.iter().all(|i| i.sub_project_id.is_none()));
    assert_eq!(
        api.calls(),
        vec!["batch_update_items 2".to_string(), "delete sub-project sp1".to_string()]
    );
}

#[tokio::test]
async fn test_delete_sub_project_with_items() {
    let (api, coordinator) = setup().await;
    coordinator.delete_sub_project("sp1", ChildPolicy::DeleteItems).await.unwrap();

    let data = p1_data(&coordinator);
    let ids: Vec<&str> = data.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["i1"]);
    assert_eq!(api.state.borrow().items.len(), 1);
}

#[tokio::test]
async fn test_plain_delete_leaves_items_pointing_at_sub_project() {
    let (_api, coordinator) = setup().await;
    coordinator.delete::<SubProject>("sp1").await.unwrap();
    let item = cached_item(&coordinator, "i2").unwrap();
    assert_eq!(item.sub_project_id.as_deref(), Some("sp1"));
}

// ========================
// Drops
// ========================

#[tokio::test]
async fn test_drop_moves_item_between_projects() {
    let (_api, coordinator) = setup().await;
    coordinator.load_project("p2", march()).await.unwrap();

    let patch = ItemPatch { project_id: Some("p2".into()), date: Some(day(14)), ..Default::default() };
    coordinator
        .apply_drop(DropResolution::MoveItem { id: "i1".into(), patch })
        .await
        .unwrap();

    let window = coordinator.caches().window_data(march());
    assert!(window["p1"].items.iter().all(|i| i.id != "i1"));
    assert_eq!(window["p2"].items[0].id, "i1");
    assert_eq!(window["p2"].items[0].date, day(14));
}

#[tokio::test]
async fn test_drop_out_of_window_removes_from_entry() {
    let (_api, coordinator) = setup().await;
    let patch = ItemPatch::date(NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
    coordinator
        .apply_drop(DropResolution::MoveItem { id: "i1".into(), patch })
        .await
        .unwrap();
    assert!(p1_data(&coordinator).items.iter().all(|i| i.id != "i1"));
}

#[tokio::test]
async fn test_drop_moves_milestone() {
    let (api, coordinator) = setup().await;
    coordinator
        .apply_drop(DropResolution::MoveMilestone { id: "m1".into(), date: day(11) })
        .await
        .unwrap();
    assert_eq!(p1_data(&coordinator).milestones[0].date, day(11));
    assert_eq!(api.calls(), vec!["update milestone m1".to_string()]);
}

// ========================
// Reads
// ========================

#[tokio::test]
async fn test_read_in_flight_during_write_is_discarded() {
    let (api, coordinator) = setup().await;
    let gate = api.hold("list_items");

    let (loaded, _) = tokio::join!(coordinator.load_project("p1", march()), async {
        let rename = ItemPatch { title: Some("Renamed".into()), ..Default::default() };
        coordinator.update::<Item>("i1", rename).await.unwrap();
        gate.notify_one();
    });

    assert_eq!(loaded, Ok(false));
    assert_eq!(cached_item(&coordinator, "i1").unwrap().title, "Renamed");
    assert!(coordinator.caches().data.is_stale(&DataKey::new("p1", march())));
}

#[tokio::test]
async fn test_cancelled_first_read_is_refetched() {
    let (api, coordinator) = setup().await;
    let gate = api.hold("list_items");
    let key = DataKey::new("p2", march());

    let (loaded, _) = tokio::join!(coordinator.load_project("p2", march()), async {
        let rename = ItemPatch { title: Some("Renamed".into()), ..Default::default() };
        coordinator.update::<Item>("i1", rename).await.unwrap();
        gate.notify_one();
    });

    assert_eq!(loaded, Ok(false));
    assert!(!coordinator.caches().data.keys().contains(&key));
    assert!(coordinator.caches().data.is_stale(&key));

    api.release();
    coordinator.refetch_stale().await.unwrap();

    assert!(coordinator.caches().data.keys().contains(&key));
    assert!(coordinator.caches().data.stale_keys().is_empty());
}

#[tokio::test]
async fn test_refetch_stale_reloads_and_drops_orphans() {
    let (api, coordinator) = setup().await;
    coordinator.load_project("p2", march()).await.unwrap();

    api.state.borrow_mut().items[0].title = "Changed elsewhere".into();
    coordinator.delete::<Project>("p2").await.unwrap();
    coordinator.update::<Milestone>("m1", Default::default()).await.unwrap();

    coordinator.refetch_stale().await.unwrap();

    assert!(coordinator.caches().data.stale_keys().is_empty());
    assert!(!coordinator.caches().structure.is_stale(&StructureKey));
    assert_eq!(coordinator.caches().data.keys(), vec![DataKey::new("p1", march())]);
    assert_eq!(cached_item(&coordinator, "i1").unwrap().title, "Changed elsewhere");
}
