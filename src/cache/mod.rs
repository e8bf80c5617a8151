//! Cache Module
//!
//! The adaptive cache engine: canonical key derivation, lazy TTL expiry,
//! two-tier LRU eviction, snapshot persistence, wildcard invalidation,
//! and concurrent warming.

mod engine;
mod entry;
pub mod key;
mod persist;
mod stats;
mod store;
mod tracker;
mod warming;


// Re-export public types
pub use engine::CacheEngine;
pub use entry::{CacheEntry, Priority};
pub use key::make_key;
pub use persist::{BackingStore, MemoryBlob};
pub use stats::{CacheHealth, CacheStats};
pub use warming::CacheLoader;

pub(crate) use stats::StatsRecorder;
pub(crate) use store::EntryStore;
pub(crate) use tracker::AccessTracker;
