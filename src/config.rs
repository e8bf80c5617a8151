//! Configuration Module
//!
//! Engine configuration passed in explicitly at construction time.
//!
//! There is deliberately no global or environment-driven state here: an
//! application that wants a durable cache, a session-scoped cache, and a
//! memory-only cache builds three `CacheConfig` values during bootstrap
//! and constructs three engines from them.

use std::time::Duration;

use crate::cache::BackingStore;

/// Engine configuration parameters.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied to entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Maximum number of entries the store can hold (clamped to >= 1)
    pub max_entries: usize,
    /// Where snapshots are persisted, if anywhere
    pub backing_store: BackingStore,
    /// Snapshot schema version; a mismatch discards the snapshot at load
    pub schema_version: String,
    /// Deadline applied to each individual warm/prefetch loader
    pub loader_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_entries: 1000,
            backing_store: BackingStore::None,
            schema_version: "1".to_string(),
            loader_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.max_entries, 1000);
        assert!(matches!(config.backing_store, BackingStore::None));
        assert_eq!(config.schema_version, "1");
        assert_eq!(config.loader_timeout, Duration::from_secs(30));
    }
}
