//! Entry Store Module
//!
//! Bounded key -> entry mapping with capacity enforcement, lazy expiry,
//! and stats accounting. Eviction order is delegated to the access
//! tracker; key derivation and persistence live with the engine.

use std::collections::HashMap;

use tracing::debug;

use crate::cache::key::wildcard_match;
use crate::cache::{AccessTracker, CacheEntry, CacheStats, StatsRecorder};
use crate::error::{CacheError, Result};

// == Entry Store ==
/// Bounded cache storage with two-tier LRU eviction and lazy TTL expiry.
#[derive(Debug)]
pub struct EntryStore {
    /// Key-entry storage
    entries: HashMap<String, CacheEntry>,
    /// Access-order tracker used for eviction
    tracker: AccessTracker,
    /// Performance counters
    stats: StatsRecorder,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl EntryStore {
    // == Constructor ==
    /// Creates a new store with the given capacity (clamped to >= 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            tracker: AccessTracker::new(),
            stats: StatsRecorder::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Get ==
    /// Retrieves an entry by key, updating access metadata and counters.
    ///
    /// An expired entry is dropped here (lazy expiry), counting both a
    /// miss and an eviction. Absent keys count a miss.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            debug!(key, "dropping expired entry on access");
            self.entries.remove(key);
            self.tracker.remove(key);
            self.stats.record_miss();
            self.stats.record_eviction();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();
        let snapshot = entry.clone();
        self.tracker.touch(key, snapshot.priority);
        self.stats.record_hit();
        Some(snapshot)
    }

    // == Insert ==
    /// Stores an entry under its canonical key.
    ///
    /// An existing key is overwritten in place. When the store is full
    /// and the key is new, exactly one victim is evicted first. Returns
    /// the evicted key, if any.
    pub fn insert(&mut self, entry: CacheEntry) -> Result<Option<String>> {
        let is_overwrite = self.entries.contains_key(&entry.key);

        let mut evicted = None;
        if !is_overwrite && self.entries.len() >= self.max_entries {
            match self.tracker.evict_candidate() {
                Some(victim) => {
                    debug!(victim = %victim, "evicting entry to make room");
                    self.entries.remove(&victim);
                    self.stats.record_eviction();
                    evicted = Some(victim);
                }
                None => {
                    return Err(CacheError::CapacityExhausted(
                        "store is full and no eviction candidate exists".to_string(),
                    ));
                }
            }
        }

        let key = entry.key.clone();
        let priority = entry.priority;
        self.entries.insert(key.clone(), entry);
        self.tracker.touch(&key, priority);

        Ok(evicted)
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.tracker.remove(key);
            true
        } else {
            false
        }
    }

    // == Remove Matching ==
    /// Removes every entry whose full canonical key matches the wildcard
    /// pattern. Returns the number of entries removed.
    pub fn remove_matching(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| wildcard_match(pattern, key))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.tracker.remove(key);
        }

        matching.len()
    }

    // == Peek Fresh ==
    /// Checks whether a non-expired entry exists for the key without
    /// touching access metadata or counters.
    pub fn peek_fresh(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Restore ==
    /// Reloads entries from a persisted snapshot.
    ///
    /// Entries are replayed in last-accessed order so eviction order
    /// survives a restart. If the snapshot holds more entries than the
    /// capacity allows, the least recently accessed overflow is dropped.
    pub fn restore(&mut self, entries: HashMap<String, CacheEntry>) {
        let mut ordered: Vec<CacheEntry> = entries.into_values().collect();
        ordered.sort_by_key(|entry| entry.last_accessed_at);

        let overflow = ordered.len().saturating_sub(self.max_entries);
        for entry in ordered.into_iter().skip(overflow) {
            let key = entry.key.clone();
            let priority = entry.priority;
            self.entries.insert(key.clone(), entry);
            self.tracker.touch(&key, priority);
        }
    }

    // == Export ==
    /// Debugging dump of every entry currently occupying a slot,
    /// including stale entries that have not been swept yet.
    pub fn export(&self) -> Vec<CacheEntry> {
        self.entries.values().cloned().collect()
    }

    // == Entries ==
    /// Read access to the raw map, used when persisting a snapshot.
    pub fn entries(&self) -> &HashMap<String, CacheEntry> {
        &self.entries
    }

    // == Stats ==
    /// Returns the current stats snapshot.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len(), self.max_entries)
    }

    // == Clear ==
    /// Removes every entry. Counters keep running.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tracker.clear();
    }

    // == Length ==
    /// Returns the current number of entries.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Test Support ==
    /// Inserts an entry directly, bypassing capacity and stats. Lets
    /// tests stage already-expired entries without sleeping.
    #[cfg(test)]
    pub fn insert_raw(&mut self, entry: CacheEntry) {
        let key = entry.key.clone();
        let priority = entry.priority;
        self.entries.insert(key.clone(), entry);
        self.tracker.touch(&key, priority);
    }
}
