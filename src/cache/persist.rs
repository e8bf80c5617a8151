//! Persistence Module
//!
//! Serializes the whole store to one JSON blob and restores it at engine
//! construction. A schema-version mismatch discards the entire snapshot;
//! individual entries that expired or carry a foreign version are skipped
//! at load. File writes go through a temp path and rename so a crash
//! mid-write leaves the previous snapshot intact.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::CacheEntry;
use crate::error::Result;

// == Memory Blob ==
/// Shared in-memory backing blob.
///
/// The in-process analogue of session-scoped storage: its scope is
/// whatever shares the handle. Cloning the handle and passing it to a
/// second engine instance makes the snapshot visible there.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlob {
    inner: Arc<Mutex<Option<String>>>,
}

impl MemoryBlob {
    /// Creates a new empty blob handle.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Option<String> {
        self.inner.lock().clone()
    }

    fn write(&self, text: String) {
        *self.inner.lock() = Some(text);
    }
}

// == Backing Store ==
/// Where snapshots live, if anywhere.
#[derive(Debug, Clone)]
pub enum BackingStore {
    /// Memory-only engine: nothing is persisted
    None,
    /// Durable snapshot file on disk
    File(PathBuf),
    /// Ephemeral shared blob, scoped by handle sharing
    Memory(MemoryBlob),
}

// == Snapshot Format ==
/// Persisted blob: `{ "schema_version": ..., "entries": { key: entry } }`.
#[derive(Deserialize)]
struct Snapshot {
    schema_version: String,
    entries: HashMap<String, CacheEntry>,
}

/// Borrowing mirror of [`Snapshot`] so saving does not clone the store.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    schema_version: &'a str,
    entries: &'a HashMap<String, CacheEntry>,
}

// == Persistence Adapter ==
/// Reads and writes the snapshot blob for one engine instance.
#[derive(Debug)]
pub struct PersistenceAdapter {
    backing: BackingStore,
    schema_version: String,
}

impl PersistenceAdapter {
    // == Constructor ==
    pub fn new(backing: BackingStore, schema_version: String) -> Self {
        Self {
            backing,
            schema_version,
        }
    }

    /// Whether any backing store is configured.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backing, BackingStore::None)
    }

    // == Load ==
    /// Restores entries from the backing store.
    ///
    /// Every failure mode degrades to a cold start: unreadable blob,
    /// unparseable JSON, or a schema-version mismatch all yield an empty
    /// map. Expired and version-mismatched entries are skipped.
    pub fn load(&self) -> HashMap<String, CacheEntry> {
        let blob = match self.read_blob() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("no snapshot found, starting cold");
                return HashMap::new();
            }
            Err(err) => {
                warn!(%err, "failed to read snapshot, starting cold");
                return HashMap::new();
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&blob) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(%err, "malformed snapshot discarded, starting cold");
                return HashMap::new();
            }
        };

        if snapshot.schema_version != self.schema_version {
            info!(
                found = %snapshot.schema_version,
                current = %self.schema_version,
                "snapshot schema version mismatch, discarding"
            );
            return HashMap::new();
        }

        let total = snapshot.entries.len();
        let entries: HashMap<String, CacheEntry> = snapshot
            .entries
            .into_iter()
            .filter(|(_, entry)| {
                !entry.is_expired() && entry.schema_version == self.schema_version
            })
            .collect();

        info!(
            restored = entries.len(),
            skipped = total - entries.len(),
            "snapshot restored"
        );
        entries
    }

    // == Save ==
    /// Serializes the whole store and overwrites the backing blob.
    ///
    /// Callers treat failure as non-fatal: the engine logs and keeps
    /// operating in memory.
    pub fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let snapshot = SnapshotRef {
            schema_version: &self.schema_version,
            entries,
        };
        let text = serde_json::to_string(&snapshot)?;
        self.write_blob(text)
    }

    // == Blob I/O ==
    fn read_blob(&self) -> Result<Option<String>> {
        match &self.backing {
            BackingStore::None => Ok(None),
            BackingStore::Memory(blob) => Ok(blob.read()),
            BackingStore::File(path) => match fs::read_to_string(path) {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err.into()),
            },
        }
    }

    fn write_blob(&self, text: String) -> Result<()> {
        match &self.backing {
            BackingStore::None => Ok(()),
            BackingStore::Memory(blob) => {
                blob.write(text);
                Ok(())
            }
            BackingStore::File(path) => {
                // Write-then-rename keeps the previous snapshot valid if
                // the process dies mid-write
                let tmp = path.with_extension("tmp");
                fs::write(&tmp, text)?;
                fs::rename(&tmp, path)?;
                Ok(())
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::current_timestamp_ms;
    use crate::cache::Priority;
    use serde_json::json;

    fn entry(key: &str, schema_version: &str) -> CacheEntry {
        CacheEntry::new(
            key.to_string(),
            json!(42),
            60_000,
            Priority::Medium,
            schema_version.to_string(),
        )
    }

    fn one_entry_map(key: &str, schema_version: &str) -> HashMap<String, CacheEntry> {
        let mut map = HashMap::new();
        map.insert(key.to_string(), entry(key, schema_version));
        map
    }

    #[test]
    fn test_none_backing_loads_empty_and_saves_nothing() {
        let adapter = PersistenceAdapter::new(BackingStore::None, "1".to_string());

        assert!(!adapter.is_enabled());
        assert!(adapter.load().is_empty());
        adapter.save(&one_entry_map("k", "1")).unwrap();
        assert!(adapter.load().is_empty());
    }

    #[test]
    fn test_memory_blob_roundtrip() {
        let blob = MemoryBlob::new();
        let adapter = PersistenceAdapter::new(BackingStore::Memory(blob.clone()), "1".to_string());

        adapter.save(&one_entry_map("k", "1")).unwrap();

        // A second adapter sharing the handle sees the snapshot
        let second = PersistenceAdapter::new(BackingStore::Memory(blob), "1".to_string());
        let restored = second.load();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored["k"].data, json!(42));
    }

    #[test]
    fn test_schema_version_mismatch_discards_snapshot() {
        let blob = MemoryBlob::new();
        let writer = PersistenceAdapter::new(BackingStore::Memory(blob.clone()), "1".to_string());
        writer.save(&one_entry_map("k", "1")).unwrap();

        let reader = PersistenceAdapter::new(BackingStore::Memory(blob), "2".to_string());
        assert!(reader.load().is_empty());
    }

    #[test]
    fn test_expired_entries_skipped_at_load() {
        let blob = MemoryBlob::new();
        let adapter = PersistenceAdapter::new(BackingStore::Memory(blob), "1".to_string());

        let mut map = one_entry_map("fresh", "1");
        let mut stale = entry("stale", "1");
        stale.expires_at = current_timestamp_ms().saturating_sub(10);
        map.insert("stale".to_string(), stale);

        adapter.save(&map).unwrap();
        let restored = adapter.load();

        assert_eq!(restored.len(), 1);
        assert!(restored.contains_key("fresh"));
    }

    #[test]
    fn test_entry_with_foreign_version_skipped_at_load() {
        let blob = MemoryBlob::new();
        let adapter = PersistenceAdapter::new(BackingStore::Memory(blob), "1".to_string());

        let mut map = one_entry_map("ok", "1");
        map.insert("old".to_string(), entry("old", "0"));

        adapter.save(&map).unwrap();
        let restored = adapter.load();

        assert_eq!(restored.len(), 1);
        assert!(restored.contains_key("ok"));
    }

    #[test]
    fn test_malformed_blob_degrades_to_cold_start() {
        let blob = MemoryBlob::new();
        blob.write("{not json".to_string());

        let adapter = PersistenceAdapter::new(BackingStore::Memory(blob), "1".to_string());
        assert!(adapter.load().is_empty());
    }

    #[test]
    fn test_file_backing_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let writer =
            PersistenceAdapter::new(BackingStore::File(path.clone()), "1".to_string());
        writer.save(&one_entry_map("k", "1")).unwrap();

        // No stray temp file after the rename
        assert!(!dir.path().join("cache.tmp").exists());

        let reader = PersistenceAdapter::new(BackingStore::File(path), "1".to_string());
        let restored = reader.load();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn test_missing_file_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = PersistenceAdapter::new(
            BackingStore::File(dir.path().join("absent.json")),
            "1".to_string(),
        );
        assert!(adapter.load().is_empty());
    }

    #[test]
    fn test_snapshot_blob_shape() {
        let blob = MemoryBlob::new();
        let adapter = PersistenceAdapter::new(BackingStore::Memory(blob.clone()), "1".to_string());
        adapter.save(&one_entry_map("k", "1")).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&blob.read().unwrap()).unwrap();
        assert_eq!(raw["schema_version"], "1");
        assert!(raw["entries"]["k"].is_object());
    }
}
