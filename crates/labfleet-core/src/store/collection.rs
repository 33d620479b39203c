// ── Two-projection entity collection ──
//
// One collection, two lookups: primary key (the node name) and secondary
// id (the controller id). Both projections live behind a single lock so a
// mutation can never leave them disagreeing.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

struct Projections<I, T> {
    /// Primary storage: key string -> entity.
    by_key: HashMap<String, Arc<T>>,
    /// Secondary index: id -> key string.
    id_to_key: HashMap<I, String>,
    /// Reverse of `id_to_key` for efficient removal.
    key_to_id: HashMap<String, I>,
}

impl<I: Eq + Hash + Clone, T> Projections<I, T> {
    fn remove_key(&mut self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key)?;
        if let Some(id) = self.key_to_id.remove(key) {
            self.id_to_key.remove(&id);
        }
        Some(removed)
    }

    fn insert(&mut self, key: String, id: I, entity: T) -> bool {
        // Drop stale mappings: the key may have carried another id, and the
        // id may have been filed under another key.
        if let Some(old_id) = self.key_to_id.get(&key) {
            if *old_id != id {
                let old_id = old_id.clone();
                self.id_to_key.remove(&old_id);
            }
        }
        if let Some(old_key) = self.id_to_key.get(&id).cloned() {
            if old_key != key {
                self.by_key.remove(&old_key);
                self.key_to_id.remove(&old_key);
            }
        }

        let is_new = self.by_key.insert(key.clone(), Arc::new(entity)).is_none();
        self.id_to_key.insert(id.clone(), key.clone());
        self.key_to_id.insert(key, id);
        is_new
    }
}

/// A collection indexed by key and by id, with a version counter bumped on
/// every mutation.
pub(crate) struct EntityCollection<I, T> {
    inner: RwLock<Projections<I, T>>,
    version: watch::Sender<u64>,
}

impl<I: Eq + Hash + Clone, T> EntityCollection<I, T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            inner: RwLock::new(Projections {
                by_key: HashMap::new(),
                id_to_key: HashMap::new(),
                key_to_id: HashMap::new(),
            }),
            version,
        }
    }

    /// Insert or update an entity. Returns `true` if the key was new.
    ///
    /// An entity keeps a single key: upserting an id under a new key drops
    /// the old key, which is how a rename is applied.
    pub(crate) fn upsert(&self, key: String, id: I, entity: T) -> bool {
        let is_new = self.write().insert(key, id, entity);
        self.bump_version();
        is_new
    }

    /// Remove an entity by key.
    #[cfg(test)]
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.write().remove_key(key);
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    /// Remove an entity by id.
    pub(crate) fn remove_by_id(&self, id: &I) -> Option<Arc<T>> {
        let removed = {
            let mut inner = self.write();
            let key = inner.id_to_key.get(id).cloned();
            key.and_then(|k| inner.remove_key(&k))
        };
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    /// Replace the whole contents in one step.
    pub(crate) fn replace_all(&self, entries: impl IntoIterator<Item = (String, I, T)>) {
        {
            let mut inner = self.write();
            inner.by_key.clear();
            inner.id_to_key.clear();
            inner.key_to_id.clear();
            for (key, id, entity) in entries {
                inner.insert(key, id, entity);
            }
        }
        self.bump_version();
    }

    /// Look up an entity by its primary key.
    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.read().by_key.get(key).map(Arc::clone)
    }

    /// Look up an entity by its id (secondary index).
    pub(crate) fn get_by_id(&self, id: &I) -> Option<Arc<T>> {
        let inner = self.read();
        let key = inner.id_to_key.get(id)?;
        inner.by_key.get(key).map(Arc::clone)
    }

    /// All entities, in no particular order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.read().by_key.values().map(Arc::clone).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.read().by_key.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.read().by_key.is_empty()
    }

    /// Current mutation count.
    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Projections<I, T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Projections<I, T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump_version(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v += 1);
    }
}
