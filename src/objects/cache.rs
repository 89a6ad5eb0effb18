//! Identity cache for engine objects.
//!
//! The cache holds weak handles: it never extends an object's lifetime, it
//! only guarantees that two lookups of the same live object hand back the
//! same allocation. That makes object equality a pointer comparison in the
//! common case and keeps repeated traversals (log views, branch lists)
//! from re-materializing the same commits.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, Weak};

use git2::Oid;

use super::commit::CommitData;
use super::reference::ReferenceData;

const PRUNE_FLOOR: usize = 64;

struct WeakMap<K, V> {
    entries: HashMap<K, Weak<V>>,
    prune_at: usize,
}

impl<K, V> Default for WeakMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            prune_at: PRUNE_FLOOR,
        }
    }
}

impl<K: Eq + Hash, V> WeakMap<K, V> {
    fn get_or_insert<F>(&mut self, key: K, make: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some(live) = self.entries.get(&key).and_then(Weak::upgrade) {
            return live;
        }
        if self.entries.len() >= self.prune_at {
            self.prune();
        }
        let fresh = Arc::new(make());
        self.entries.insert(key, Arc::downgrade(&fresh));
        fresh
    }

    fn prune(&mut self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        self.prune_at = (self.entries.len() * 2).max(PRUNE_FLOOR);
    }

    fn live_count(&self) -> usize {
        self.entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

#[derive(Default)]
pub(crate) struct ObjectCache {
    commits: Mutex<WeakMap<Oid, CommitData>>,
    references: Mutex<WeakMap<String, ReferenceData>>,
}

impl ObjectCache {
    pub(crate) fn commit<F>(&self, oid: Oid, make: F) -> Arc<CommitData>
    where
        F: FnOnce() -> CommitData,
    {
        self.commits
            .lock()
            .expect("commit cache lock poisoned")
            .get_or_insert(oid, make)
    }

    pub(crate) fn reference<F>(&self, name: &str, make: F) -> Arc<ReferenceData>
    where
        F: FnOnce() -> ReferenceData,
    {
        let mut map = self.references.lock().expect("ref cache lock poisoned");
        // Probe with the borrowed name; only a miss pays for the owned key.
        if let Some(live) = map.entries.get(name).and_then(Weak::upgrade) {
            return live;
        }
        map.get_or_insert(name.to_string(), make)
    }

    #[cfg(test)]
    pub(crate) fn live_commits(&self) -> usize {
        self.commits
            .lock()
            .expect("commit cache lock poisoned")
            .live_count()
    }
}
