//! Per-node memoization side-table.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Entry = Arc<dyn Any + Send + Sync>;

/// Ephemeral key/value storage attached to a node.
///
/// Entries are derived data only: they never take part in node equality and
/// may be dropped at any time. Concurrent readers may populate it, so all
/// access goes through a mutex and every write must be repeatable.
#[derive(Default)]
pub struct NodeCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl NodeCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the entry stored under `key` if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let entry = self.lock().get(key).cloned()?;
        entry.downcast::<T>().ok()
    }

    pub fn put<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.lock().insert(key.into(), Arc::new(value));
    }

    /// Returns the cached value or computes and stores it.
    ///
    /// `compute` runs without the lock held, so two racing readers may both
    /// compute; the first stored value wins.
    pub fn get_or_insert_with<T, F>(&self, key: &str, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(hit) = self.get::<T>(key) {
            return hit;
        }
        let fresh = Arc::new(compute());
        let mut entries = self.lock();
        if let Some(existing) = entries.get(key).cloned() {
            if let Ok(value) = existing.downcast::<T>() {
                return value;
            }
        }
        entries.insert(key.to_string(), Arc::clone(&fresh) as Entry);
        fresh
    }

    /// Records `key` and returns true the first time it is seen.
    pub fn mark_once(&self, key: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(key) {
            return false;
        }
        entries.insert(key.to_string(), Arc::new(()));
        true
    }

    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Clone for NodeCache {
    fn clone(&self) -> Self {
        Self {
            entries: Mutex::new(self.lock().clone()),
        }
    }
}

impl fmt::Debug for NodeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCache")
            .field("entries", &self.len())
            .finish()
    }
}
