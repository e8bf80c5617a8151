//! Adaptive Cache - an in-process cache engine
//!
//! Provides namespace-keyed caching with lazy TTL expiry, priority-aware
//! LRU eviction, snapshot persistence, wildcard invalidation, and
//! concurrent fault-tolerant warming.
//!
//! One engine design, instantiated per scope:
//!
//! ```
//! use adaptive_cache::{CacheConfig, CacheEngine, Priority};
//!
//! let cache = CacheEngine::new(CacheConfig::default());
//! cache.set("trusted_devices_all", &vec![1u32, 2, 3], None, Priority::High, None)?;
//!
//! let devices: Option<Vec<u32>> = cache.get("trusted_devices_all", None);
//! assert_eq!(devices, Some(vec![1, 2, 3]));
//! # Ok::<(), adaptive_cache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{
    make_key, BackingStore, CacheEngine, CacheEntry, CacheHealth, CacheLoader, CacheStats,
    MemoryBlob, Priority,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
