//! Versioned key-value caches
//!
//! Shared by `Rc` on the UI thread. Every write bumps the version and
//! notifies listeners after the borrow is released, so a listener may read
//! the cache it is subscribed to.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use chrono::NaiveDate;

use crate::domain::{DataKey, DateWindow, ProjectData, Structure, StructureKey};

type Listener = Rc<dyn Fn(u64)>;

struct CacheState<K, V> {
    entries: BTreeMap<K, V>,
    stale: BTreeSet<K>,
    version: u64,
    read_epoch: u64,
    listeners: Vec<Listener>,
}

/// Full copy of a cache's entries, taken before an optimistic patch
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<K, V> {
    entries: BTreeMap<K, V>,
}

/// Proof that a read started; rejected if writes cancelled reads since
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTicket<K> {
    key: K,
    epoch: u64,
}

pub struct CacheStore<K, V> {
    state: Rc<RefCell<CacheState<K, V>>>,
}

impl<K, V> Clone for CacheStore<K, V> {
    fn clone(&self) -> Self {
        Self { state: Rc::clone(&self.state) }
    }
}

impl<K: Ord + Clone, V: Clone> Default for CacheStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> CacheStore<K, V> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(CacheState {
                entries: BTreeMap::new(),
                stale: BTreeSet::new(),
                version: 0,
                read_epoch: 0,
                listeners: Vec::new(),
            })),
        }
    }

    fn bump(&self) {
        let (version, listeners) = {
            let mut state = self.state.borrow_mut();
            state.version += 1;
            (state.version, state.listeners.clone())
        };
        for listener in listeners {
            listener(version);
        }
    }

    pub fn version(&self) -> u64 {
        self.state.borrow().version
    }

    /// Called with the new version after every change
    pub fn subscribe(&self, listener: impl Fn(u64) + 'static) {
        self.state.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Read access without cloning the whole map
    pub fn with<R>(&self, f: impl FnOnce(&BTreeMap<K, V>) -> R) -> R {
        f(&self.state.borrow().entries)
    }

    pub fn keys(&self) -> Vec<K> {
        self.state.borrow().entries.keys().cloned().collect()
    }

    pub fn snapshot(&self) -> CacheSnapshot<K, V> {
        CacheSnapshot {
            entries: self.state.borrow().entries.clone(),
        }
    }

    /// Mutate entries in place
    pub fn apply_patch<R>(&self, patch: impl FnOnce(&mut BTreeMap<K, V>) -> R) -> R {
        let result = patch(&mut self.state.borrow_mut().entries);
        self.bump();
        result
    }

    /// Put back exactly what a snapshot held
    pub fn restore(&self, snapshot: CacheSnapshot<K, V>) {
        self.state.borrow_mut().entries = snapshot.entries;
        self.bump();
    }

    /// Drop an entry along with its stale flag
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = {
            let mut state = self.state.borrow_mut();
            state.stale.remove(key);
            state.entries.remove(key)
        };
        self.bump();
        removed
    }

    /// Mark an entry as needing a refetch
    pub fn invalidate(&self, key: &K) {
        self.state.borrow_mut().stale.insert(key.clone());
        self.bump();
    }

    pub fn invalidate_all(&self) {
        {
            let mut state = self.state.borrow_mut();
            let keys: Vec<K> = state.entries.keys().cloned().collect();
            state.stale.extend(keys);
        }
        self.bump();
    }

    pub fn is_stale(&self, key: &K) -> bool {
        self.state.borrow().stale.contains(key)
    }

    pub fn stale_keys(&self) -> Vec<K> {
        self.state.borrow().stale.iter().cloned().collect()
    }

    pub fn begin_read(&self, key: K) -> ReadTicket<K> {
        ReadTicket {
            key,
            epoch: self.state.borrow().read_epoch,
        }
    }

    /// Invalidate every outstanding read ticket. Local intent wins over a
    /// read that is still in flight.
    pub fn cancel_reads(&self) {
        self.state.borrow_mut().read_epoch += 1;
    }

    /// Store a read's result unless its ticket was cancelled meanwhile.
    /// A cancelled read of a key with no entry leaves the key stale, so the
    /// next `refetch_stale` loads it.
    pub fn finish_read(&self, ticket: ReadTicket<K>, value: V) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if ticket.epoch != state.read_epoch {
                if !state.entries.contains_key(&ticket.key) {
                    state.stale.insert(ticket.key);
                }
                return false;
            }
            state.stale.remove(&ticket.key);
            state.entries.insert(ticket.key, value);
        }
        self.bump();
        true
    }
}

/// The structure cache and the data cache, each snapshotted and invalidated
/// on its own
#[derive(Clone, Default)]
pub struct TimelineCaches {
    pub structure: CacheStore<StructureKey, Structure>,
    pub data: CacheStore<DataKey, ProjectData>,
}

impl TimelineCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_value(&self) -> Structure {
        self.structure.get(&StructureKey).unwrap_or_default()
    }

    /// Data of every live project for one window, keyed by project id
    pub fn window_data(&self, window: DateWindow) -> BTreeMap<String, ProjectData> {
        let structure = self.structure_value();
        let live = structure.live_project_ids();
        self.data.with(|entries| {
            entries
                .iter()
                .filter(|(key, _)| key.window == window && live.contains(key.project_id.as_str()))
                .map(|(key, data)| (key.project_id.clone(), data.clone()))
                .collect()
        })
    }

    /// Whether any cached entity, reference or ordered list mentions `id`
    pub fn mentions(&self, id: &str) -> bool {
        let in_structure = self.structure_value().mentions(id);
        in_structure
            || self.data.with(|entries| {
                entries
                    .iter()
                    .any(|(key, data)| key.project_id == id || data.mentions(id))
            })
    }

    /// Swap a temporary id for the canonical one in both caches
    pub fn promote_id(&self, temp_id: &str, canonical_id: &str) {
        self.structure.apply_patch(|entries| {
            for structure in entries.values_mut() {
                structure.rewrite_id(temp_id, canonical_id);
            }
        });
        self.data.apply_patch(|entries| {
            let renamed: Vec<DataKey> = entries
                .keys()
                .filter(|k| k.project_id == temp_id)
                .cloned()
                .collect();
            for key in renamed {
                if let Some(data) = entries.remove(&key) {
                    entries.insert(DataKey::new(canonical_id, key.window), data);
                }
            }
            for data in entries.values_mut() {
                data.rewrite_id(temp_id, canonical_id);
            }
        });
    }

    /// Data keys whose window covers `date` for a project
    pub fn keys_covering(&self, project_id: &str, date: NaiveDate) -> Vec<DataKey> {
        self.data.with(|entries| {
            entries
                .keys()
                .filter(|k| k.project_id == project_id && k.window.contains(date))
                .cloned()
                .collect()
        })
    }
}
