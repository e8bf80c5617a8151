//! Cache Statistics Module
//!
//! Tracks cache performance counters and derives the health metrics
//! consumers use to decide whether a cache is worth keeping warm.

use serde::Serialize;

// == Cache Health ==
/// Coarse effectiveness classification derived from the hit rate.
///
/// Advisory only: a caller may flush a `Poor` cache, but no such policy
/// lives in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheHealth {
    Excellent,
    Good,
    Fair,
    Poor,
}

// == Stats Recorder ==
/// Monotonic hit/miss/eviction counters, running since engine construction.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl StatsRecorder {
    // == Constructor ==
    /// Creates a new recorder with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    ///
    /// Counted both for capacity-triggered victims and for expired
    /// entries dropped lazily on access.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Hit Rate ==
    /// Hit rate as a percentage in [0, 100]; 0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        (self.hits as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }

    // == Snapshot ==
    /// Produces the derived stats snapshot for the current store shape.
    pub fn snapshot(&self, size: usize, max_entries: usize) -> CacheStats {
        let hit_rate = self.hit_rate();
        let utilization = if max_entries == 0 {
            0.0
        } else {
            size as f64 / max_entries as f64 * 100.0
        };

        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            hit_rate,
            size,
            max_entries,
            utilization,
            health: CacheStats::classify(hit_rate),
        }
    }
}

// == Cache Stats Snapshot ==
/// Point-in-time view of counters and derived metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries removed by eviction or lazy expiry
    pub evictions: u64,
    /// hits / (hits + misses) as a percentage, clamped to [0, 100]
    pub hit_rate: f64,
    /// Current number of entries in the store
    pub size: usize,
    /// Configured capacity
    pub max_entries: usize,
    /// size / max_entries as a percentage
    pub utilization: f64,
    /// Effectiveness classification derived from the hit rate
    pub health: CacheHealth,
}

impl CacheStats {
    /// Maps a hit-rate percentage onto the health scale.
    fn classify(hit_rate: f64) -> CacheHealth {
        if hit_rate > 80.0 {
            CacheHealth::Excellent
        } else if hit_rate > 60.0 {
            CacheHealth::Good
        } else if hit_rate > 40.0 {
            CacheHealth::Fair
        } else {
            CacheHealth::Poor
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_new() {
        let stats = StatsRecorder::new().snapshot(0, 10);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let recorder = StatsRecorder::new();
        assert_eq!(recorder.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_hit();
        assert_eq!(recorder.hit_rate(), 100.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.hit_rate(), 50.0);
    }

    #[test]
    fn test_hit_rate_in_bounds() {
        let mut recorder = StatsRecorder::new();
        for _ in 0..7 {
            recorder.record_hit();
        }
        for _ in 0..3 {
            recorder.record_miss();
        }
        let rate = recorder.hit_rate();
        assert!((0.0..=100.0).contains(&rate));
        assert!((rate - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_eviction() {
        let mut recorder = StatsRecorder::new();
        recorder.record_eviction();
        recorder.record_eviction();
        assert_eq!(recorder.snapshot(0, 10).evictions, 2);
    }

    #[test]
    fn test_utilization() {
        let recorder = StatsRecorder::new();
        let stats = recorder.snapshot(5, 10);
        assert!((stats.utilization - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_health_thresholds() {
        assert_eq!(CacheStats::classify(95.0), CacheHealth::Excellent);
        assert_eq!(CacheStats::classify(80.0), CacheHealth::Good);
        assert_eq!(CacheStats::classify(61.0), CacheHealth::Good);
        assert_eq!(CacheStats::classify(60.0), CacheHealth::Fair);
        assert_eq!(CacheStats::classify(41.0), CacheHealth::Fair);
        assert_eq!(CacheStats::classify(40.0), CacheHealth::Poor);
        assert_eq!(CacheStats::classify(0.0), CacheHealth::Poor);
    }

    #[test]
    fn test_health_serializes_lowercase() {
        let json = serde_json::to_string(&CacheHealth::Excellent).unwrap();
        assert_eq!(json, "\"excellent\"");
    }
}
