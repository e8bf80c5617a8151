//! Cache Engine Module
//!
//! The public operation surface: typed get/set/update, invalidation,
//! stats, clear/export, and snapshot-backed construction. Warming and
//! prefetching live in the warming module but operate on this type.
//!
//! One engine design, instantiated per scope: an application builds a
//! durable-backed, a session-backed, and a memory-only engine from three
//! `CacheConfig` values and passes them to consumers explicitly.

use std::time::Duration;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::key::make_key;
use crate::cache::persist::PersistenceAdapter;
use crate::cache::{CacheEntry, CacheStats, EntryStore, Priority};
use crate::config::CacheConfig;
use crate::error::Result;

// == Cache Engine ==
/// Adaptive in-process cache engine.
///
/// Interior locking: one `RwLock` over the store, never held across an
/// await. Concurrent writes to the same key are last-write-wins.
#[derive(Debug)]
pub struct CacheEngine {
    store: RwLock<EntryStore>,
    persist: PersistenceAdapter,
    config: CacheConfig,
}

impl CacheEngine {
    // == Constructor ==
    /// Builds an engine from its configuration, restoring any persisted
    /// snapshot. Restore replays entries in last-accessed order so
    /// eviction order survives a restart.
    pub fn new(config: CacheConfig) -> Self {
        let persist = PersistenceAdapter::new(
            config.backing_store.clone(),
            config.schema_version.clone(),
        );

        let mut store = EntryStore::new(config.max_entries);
        let restored = persist.load();
        if !restored.is_empty() {
            store.restore(restored);
        }

        Self {
            store: RwLock::new(store),
            persist,
            config,
        }
    }

    // == Get ==
    /// Retrieves and deserializes the value cached under the namespace
    /// and optional parameter object.
    ///
    /// Returns `None` on an absent or expired key (the normal miss
    /// signal) and when the cached payload no longer deserializes as
    /// `T`, which is logged.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str, params: Option<&Value>) -> Option<T> {
        let key = make_key(namespace, params);
        let entry = self.store.write().get(&key)?;

        match serde_json::from_value(entry.data) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(%key, %err, "cached payload failed to deserialize");
                None
            }
        }
    }

    // == Set ==
    /// Serializes and stores a value, evicting one victim first if the
    /// store is full and the key is new, then re-persists the snapshot.
    ///
    /// # Arguments
    /// * `namespace` - Logical grouping name
    /// * `data` - The value to cache
    /// * `ttl` - Optional TTL (engine default when None)
    /// * `priority` - Eviction-bias tier
    /// * `params` - Optional parameter object folded into the key
    pub fn set<T: Serialize>(
        &self,
        namespace: &str,
        data: &T,
        ttl: Option<Duration>,
        priority: Priority,
        params: Option<&Value>,
    ) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.set_value(namespace, value, ttl, priority, params)
    }

    /// Stores an already-serialized payload. Shared by `set` and the
    /// warming coordinator.
    pub(crate) fn set_value(
        &self,
        namespace: &str,
        value: Value,
        ttl: Option<Duration>,
        priority: Priority,
        params: Option<&Value>,
    ) -> Result<()> {
        let key = make_key(namespace, params);
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let entry = CacheEntry::new(
            key.clone(),
            value,
            ttl.as_millis() as u64,
            priority,
            self.config.schema_version.clone(),
        );

        let evicted = self.store.write().insert(entry)?;
        if let Some(victim) = evicted {
            debug!(%key, %victim, "capacity eviction during set");
        }

        self.persist_snapshot();
        Ok(())
    }

    // == Update ==
    /// Read-modify-write through the public operations: reads the
    /// current value, applies the updater, stores and returns the
    /// result. The new entry takes the engine default TTL and priority.
    ///
    /// Two concurrent updates of the same key can lose one writer's
    /// effect; the engine does not serialize the read against the write.
    pub fn update<T, F>(&self, namespace: &str, updater: F, params: Option<&Value>) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> T,
    {
        let current = self.get(namespace, params);
        let next = updater(current);
        self.set(namespace, &next, None, Priority::default(), params)?;
        Ok(next)
    }

    // == Invalidate ==
    /// Removes the single entry at the derived key. Returns whether an
    /// entry was removed.
    pub fn invalidate(&self, namespace: &str, params: Option<&Value>) -> bool {
        let key = make_key(namespace, params);
        let removed = self.store.write().remove(&key);
        if removed {
            self.persist_snapshot();
        }
        removed
    }

    // == Invalidate Pattern ==
    /// Removes every entry whose canonical key matches the wildcard
    /// pattern (`*` = any substring, anchored at both ends). Returns the
    /// count removed.
    pub fn invalidate_pattern(&self, pattern: &str) -> usize {
        let removed = self.store.write().remove_matching(pattern);
        if removed > 0 {
            debug!(pattern, removed, "pattern invalidation");
            self.persist_snapshot();
        }
        removed
    }

    // == Stats ==
    /// Returns the current stats snapshot.
    pub fn stats(&self) -> CacheStats {
        self.store.read().stats()
    }

    // == Clear ==
    /// Removes every entry and re-persists the now-empty snapshot.
    /// Counters keep running; they are monotonic since construction.
    pub fn clear(&self) {
        self.store.write().clear();
        self.persist_snapshot();
    }

    // == Export ==
    /// Debugging dump of every entry occupying a slot, stale entries
    /// included (lazy expiry means they still count against capacity).
    pub fn export(&self) -> Vec<CacheEntry> {
        self.store.read().export()
    }

    // == Internal ==
    /// Non-mutating freshness probe used by prefetch.
    pub(crate) fn contains_fresh(&self, key: &str) -> bool {
        self.store.read().peek_fresh(key)
    }

    pub(crate) fn loader_timeout(&self) -> Duration {
        self.config.loader_timeout
    }

    /// Synchronously rewrites the backing snapshot after a mutation.
    /// Failure degrades to memory-only operation, never to the caller.
    fn persist_snapshot(&self) {
        if !self.persist.is_enabled() {
            return;
        }
        let store = self.store.read();
        if let Err(err) = self.persist.save(store.entries()) {
            warn!(%err, "snapshot write failed, continuing in memory");
        }
    }
}
