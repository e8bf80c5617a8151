//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support,
//! access metadata for eviction, and the priority tier used to bias
//! eviction order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

// == Priority Tier ==
/// Eviction-bias hint for an entry.
///
/// Priority only influences which entry is evicted when the store is
/// full; it never affects TTL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

// == Cache Entry ==
/// Represents a single cache entry with payload and metadata.
///
/// The payload is stored as a `serde_json::Value`; the engine converts
/// to and from caller types at its public boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub data: Value,
    /// Canonical key this entry is stored under
    pub key: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Absolute expiration deadline (Unix milliseconds)
    pub expires_at: u64,
    /// Snapshot schema version the entry was written under
    pub schema_version: String,
    /// Eviction-bias tier
    pub priority: Priority,
    /// Number of successful reads of this entry
    pub access_count: u64,
    /// Timestamp of the most recent read or write (Unix milliseconds)
    pub last_accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// The TTL is clamped to at least 1 ms so `expires_at > created_at`
    /// always holds.
    ///
    /// # Arguments
    /// * `key` - Canonical key for the entry
    /// * `data` - The payload to store
    /// * `ttl_ms` - TTL in milliseconds
    /// * `priority` - Eviction-bias tier
    /// * `schema_version` - Current engine schema version
    pub fn new(
        key: String,
        data: Value,
        ttl_ms: u64,
        priority: Priority,
        schema_version: String,
    ) -> Self {
        let now = current_timestamp_ms();

        Self {
            data,
            key,
            created_at: now,
            expires_at: now + ttl_ms.max(1),
            schema_version,
            priority,
            access_count: 0,
            last_accessed_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration deadline.
    pub fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }

    // == Touch ==
    /// Records a successful read: bumps the access count and refreshes
    /// the last-accessed timestamp.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.expires_at.saturating_sub(current_timestamp_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}
