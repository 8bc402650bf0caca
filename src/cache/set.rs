//! Entry Set Module
//!
//! One set of an N-way set-associative cache: a fixed run of ways guarded by
//! its own reader/writer lock, with least-recently-used replacement scoped to
//! those ways only.

use std::borrow::Borrow;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use crate::cache::{CacheStats, Entry, SetCounters};

// == Upsert ==
/// Outcome of writing a key into its set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert<K, V> {
    /// The key was new and took a free way.
    Inserted,
    /// The key was already present; its value was replaced.
    Updated { previous: V },
    /// The set was full; the least recently used pair was dropped for the key.
    Evicted { key: K, value: V },
}

impl<K, V> Upsert<K, V> {
    /// Returns true if the write displaced another key.
    pub fn is_eviction(&self) -> bool {
        matches!(self, Upsert::Evicted { .. })
    }
}

// == Entry Set ==
/// A fixed partition of the cache's ways.
///
/// The ways are allocated once and never resized. Reads take the shared lock
/// and writes take the exclusive lock. Recency stamps come from a counter
/// owned by this set, so they are only comparable between ways of the same
/// set.
#[derive(Debug)]
pub struct EntrySet<K, V> {
    /// Position of this set in the cache
    index: usize,
    /// Half-open range of global way indices owned by this set
    range: Range<usize>,
    /// Storage for the ways
    ways: RwLock<Box<[Entry<K, V>]>>,
    /// Last stamp handed out
    next_usage: AtomicU64,
    counters: SetCounters,
}

impl<K, V> EntrySet<K, V> {
    // == Constructor ==
    /// Creates set `index` owning the global ways `range`, all unused.
    pub fn new(index: usize, range: Range<usize>) -> Self {
        let ways: Box<[Entry<K, V>]> = range.clone().map(|_| Entry::new()).collect();
        Self {
            index,
            range,
            ways: RwLock::new(ways),
            next_usage: AtomicU64::new(0),
            counters: SetCounters::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Global way indices owned by this set.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Number of ways.
    pub fn ways(&self) -> usize {
        self.range.len()
    }

    #[inline]
    fn next_stamp(&self) -> u64 {
        self.next_usage.fetch_add(1, Ordering::Relaxed) + 1
    }

    // == Lookup ==
    /// Returns a clone of the value stored for `key`.
    ///
    /// A hit refreshes the way's stamp; this only needs the shared lock since
    /// stamps are atomic.
    pub fn lookup<Q>(&self, key_hash: u64, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        V: Clone,
    {
        let ways = self.ways.read();
        match ways.iter().find(|entry| entry.matches(key_hash, key)) {
            Some(entry) => {
                entry.touch(self.next_stamp());
                self.counters.record_hit();
                entry.value().cloned()
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }

    // == Contains ==
    /// Checks for `key` whose value satisfies `accept`.
    ///
    /// Membership tests leave recency and hit/miss counters untouched.
    pub fn contains<Q, F>(&self, key_hash: u64, key: &Q, accept: F) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        F: FnOnce(&V) -> bool,
    {
        let ways = self.ways.read();
        ways.iter()
            .find(|entry| entry.matches(key_hash, key))
            .and_then(Entry::value)
            .is_some_and(accept)
    }

    // == Insert Or Update ==
    /// Writes `key` into this set.
    ///
    /// An existing key is overwritten in place. Otherwise the first unused
    /// way is taken, and when none is left the way with the smallest stamp
    /// (lowest index on ties) is evicted and reused.
    pub fn insert_or_update(&self, key_hash: u64, key: K, value: V) -> Upsert<K, V>
    where
        K: Eq,
    {
        let mut ways = self.ways.write();
        let stamp = self.next_stamp();

        if let Some(current) = ways
            .iter_mut()
            .filter(|entry| entry.matches(key_hash, &key))
            .find_map(|entry| entry.refresh(stamp))
        {
            self.counters.record_update();
            let previous = std::mem::replace(current, value);
            return Upsert::Updated { previous };
        }

        if let Some(entry) = ways.iter_mut().find(|entry| !entry.is_used()) {
            entry.occupy(key_hash, key, value, stamp);
            self.counters.record_insertion();
            return Upsert::Inserted;
        }

        // Set is full: every way is used, so a victim always exists
        let victim = ways
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| entry.usage_stamp())
            .map(|(way, _)| way)
            .unwrap_or(0);
        trace!(
            set = self.index,
            way = self.range.start + victim,
            "evicting least recently used entry"
        );
        self.counters.record_eviction();
        match ways[victim].occupy(key_hash, key, value, stamp) {
            Some((key, value)) => Upsert::Evicted { key, value },
            None => Upsert::Inserted,
        }
    }

    // == Remove ==
    /// Clears the way holding `key` if its value satisfies `accept`.
    ///
    /// Returns the removed pair, or `None` if the key is absent or rejected.
    pub fn remove<Q, F>(&self, key_hash: u64, key: &Q, accept: F) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        F: FnOnce(&V) -> bool,
    {
        let mut ways = self.ways.write();
        let entry = ways
            .iter_mut()
            .find(|entry| entry.matches(key_hash, key))?;
        if !entry.value().is_some_and(accept) {
            return None;
        }
        let removed = entry.clear();
        if removed.is_some() {
            self.counters.record_removals(1);
        }
        removed
    }

    // == Used Count ==
    /// Number of live entries in this set.
    pub fn used_count(&self) -> usize {
        self.ways.read().iter().filter(|entry| entry.is_used()).count()
    }

    // == Snapshot ==
    /// Copies out every live pair, in way order, under one lock acquisition.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.ways
            .read()
            .iter()
            .filter_map(Entry::pair)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    // == Clear ==
    /// Marks every way unused and returns how many were live.
    pub fn clear(&self) -> usize {
        let mut ways = self.ways.write();
        let cleared = ways
            .iter_mut()
            .filter_map(|entry| entry.clear())
            .count();
        self.counters.record_removals(cleared as u64);
        cleared
    }

    /// Adds this set's counters into `stats`.
    pub fn accumulate_stats(&self, stats: &mut CacheStats) {
        self.counters.accumulate(stats);
    }
}
