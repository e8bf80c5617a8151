//! Access Tracker Module
//!
//! Tracks access order for the two-tier eviction policy.
//!
//! Keys live in a global access-order deque (front = most recently used,
//! back = least recently used). Low-priority keys are additionally
//! tracked in their own deque. Eviction takes the least-recently-used
//! low-priority key first and falls back to the globally least-recently
//! used key when no low-priority key exists. Ties resolve to the oldest
//! access because deque order is access order.

use std::collections::VecDeque;

use crate::cache::Priority;

// == Access Tracker ==
/// Tracks access order across priority tiers for eviction.
#[derive(Debug, Default)]
pub struct AccessTracker {
    /// Global order of keys by access time
    order: VecDeque<String>,
    /// Order of low-priority keys only
    low: VecDeque<String>,
}

impl AccessTracker {
    // == Constructor ==
    /// Creates a new empty access tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as recently used (moves it to the front of its tiers).
    ///
    /// The priority is the entry's current tier; an overwrite that changes
    /// priority re-tiers the key here.
    pub fn touch(&mut self, key: &str, priority: Priority) {
        self.remove(key);
        self.order.push_front(key.to_string());
        if priority == Priority::Low {
            self.low.push_front(key.to_string());
        }
    }

    // == Remove ==
    /// Removes a key from all tiers.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.low.retain(|k| k != key);
    }

    // == Evict Candidate ==
    /// Selects, removes, and returns the eviction victim.
    ///
    /// Least-recently-used low-priority key first; otherwise the globally
    /// least-recently-used key. Returns None if the tracker is empty.
    pub fn evict_candidate(&mut self) -> Option<String> {
        let victim = self
            .low
            .pop_back()
            .or_else(|| self.order.pop_back())?;
        self.remove(&victim);
        Some(victim)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    // == Clear ==
    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
        self.low.clear();
    }
}
