//! Per-key async locks.
//!
//! Serializes read-then-write sequences that span several awaited store
//! calls for the same key, while letting different keys proceed in
//! parallel. Entries are dropped from the registry once nobody holds or
//! waits on them.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry<K> = Mutex<HashMap<K, Arc<AsyncMutex<()>>>>;

/// A set of async mutexes addressed by key.
pub struct KeyedLocks<K> {
    registry: Arc<Registry<K>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for and take the lock for `key`.
    pub async fn lock(&self, key: K) -> KeyedGuard<K> {
        let entry = {
            let mut registry = self.registry.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(registry.entry(key.clone()).or_default())
        };
        let guard = entry.lock_owned().await;

        KeyedGuard {
            key,
            registry: Arc::clone(&self.registry),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or waited on.
    pub fn active_keys(&self) -> usize {
        self.registry.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

/// Holds the lock for one key until dropped.
pub struct KeyedGuard<K: Eq + Hash> {
    key: K,
    registry: Arc<Registry<K>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash> Drop for KeyedGuard<K> {
    fn drop(&mut self) {
        self.guard.take();
        let mut registry = self.registry.lock().unwrap_or_else(|p| p.into_inner());
        // Only the registry's own handle left means no holder and no waiter
        if registry
            .get(&self.key)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            registry.remove(&self.key);
        }
    }
}
