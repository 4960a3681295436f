use dashmap::DashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Ids with a mutation currently pending.
#[derive(Debug)]
pub struct InFlight<K: Hash + Eq> {
    pending: Arc<DashSet<K>>,
}

impl<K: Hash + Eq + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(DashSet::new()),
        }
    }

    /// Marks `key` busy. Returns `None` if it already is; the mark is
    /// released when the returned guard drops.
    pub fn try_begin(&self, key: K) -> Option<InFlightGuard<K>> {
        if !self.pending.insert(key.clone()) {
            return None;
        }

        Some(InFlightGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    pub fn contains(&self, key: &K) -> bool {
        self.pending.contains(key)
    }
}

impl<K: Hash + Eq + Clone> Default for InFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct InFlightGuard<K: Hash + Eq> {
    pending: Arc<DashSet<K>>,
    key: K,
}

impl<K: Hash + Eq> Drop for InFlightGuard<K> {
    fn drop(&mut self) {
        self.pending.remove(&self.key);
    }
}
