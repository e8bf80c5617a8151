//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! A cache miss is never an error: `get` returns `None` for absent or
//! expired keys. Errors here cover payload serialization, snapshot I/O,
//! and the defended capacity-exhaustion case.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Payload could not be serialized or a snapshot could not be parsed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store could not be read or written
    #[error("snapshot I/O failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// Store is full and no eviction victim could be selected
    #[error("cache full: {0}")]
    CapacityExhausted(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
