//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Aggregated view of the cache's performance metrics.
///
/// Built by summing every set's counters one set at a time, so the numbers
/// are not a single atomic snapshot of the whole cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Number of new keys stored in a free way
    pub insertions: u64,
    /// Number of writes that overwrote an existing key
    pub updates: u64,
    /// Number of entries evicted to make room in a full set
    pub evictions: u64,
    /// Number of entries removed explicitly
    pub removals: u64,
    /// Current number of live entries
    pub total_entries: usize,
    /// Total number of ways (sets * set size)
    pub capacity: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Occupancy ==
    /// Fraction of all ways currently holding a live entry.
    pub fn occupancy(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.total_entries as f64 / self.capacity as f64
        }
    }
}

// == Set Counters ==
/// Per-set event counters.
///
/// Updated with relaxed atomics so that reads holding only the shared set
/// lock can still record hits and misses.
#[derive(Debug, Default)]
pub struct SetCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
    removals: AtomicU64,
}

impl SetCounters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_insertion(&self) {
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_removals(&self, count: u64) {
        self.removals.fetch_add(count, Ordering::Relaxed);
    }

    // == Accumulate ==
    /// Adds this set's counters into `stats`.
    pub fn accumulate(&self, stats: &mut CacheStats) {
        stats.hits += self.hits.load(Ordering::Relaxed);
        stats.misses += self.misses.load(Ordering::Relaxed);
        stats.insertions += self.insertions.load(Ordering::Relaxed);
        stats.updates += self.updates.load(Ordering::Relaxed);
        stats.evictions += self.evictions.load(Ordering::Relaxed);
        stats.removals += self.removals.load(Ordering::Relaxed);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.capacity, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..CacheStats::default()
        };
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_occupancy() {
        let stats = CacheStats {
            total_entries: 2,
            capacity: 8,
            ..CacheStats::default()
        };
        assert_eq!(stats.occupancy(), 0.25);
        assert_eq!(CacheStats::new().occupancy(), 0.0);
    }

    #[test]
    fn test_set_counters_accumulate() {
        let first = SetCounters::new();
        first.record_hit();
        first.record_hit();
        first.record_miss();
        first.record_eviction();

        let second = SetCounters::new();
        second.record_hit();
        second.record_insertion();
        second.record_update();
        second.record_removals(3);

        let mut stats = CacheStats::new();
        first.accumulate(&mut stats);
        second.accumulate(&mut stats);

        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.removals, 3);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = CacheStats {
            hits: 1,
            capacity: 4,
            ..CacheStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["capacity"], 4);
        assert!(json.get("evictions").is_some());
    }
}
