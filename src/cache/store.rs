//! Cache Store Module
//!
//! The N-way set-associative cache: a fixed number of sets, each holding a
//! fixed number of ways, with least-recently-used replacement inside a set.

use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

use tracing::{debug, info};

use crate::cache::{CacheStats, EntrySet, Iter, Keys, Upsert, Values};
use crate::error::{CacheError, Result};

// == N-Way Set-Associative Cache ==
/// A fixed-capacity concurrent map partitioned into sets of ways.
///
/// A key always lives in set `hash(key) % number_of_sets`. When that set is
/// full, the least recently used key of that set is evicted; other sets are
/// never affected. Each set has its own reader/writer lock, so operations on
/// different sets run in parallel.
///
/// Writes never fail for lack of space. Reads through [`try_get`] and
/// [`get`] count as a use of the entry; [`contains_key`] and [`contains`] do
/// not.
///
/// Keys must hash the same way for as long as they are stored. Mutating a
/// key's hash (through interior mutability) after insertion leaves it in the
/// wrong set.
///
/// [`try_get`]: NWaySetAssociativeCache::try_get
/// [`get`]: NWaySetAssociativeCache::get
/// [`contains_key`]: NWaySetAssociativeCache::contains_key
/// [`contains`]: NWaySetAssociativeCache::contains
#[derive(Debug)]
pub struct NWaySetAssociativeCache<K, V, S = RandomState> {
    /// Sets in order; set `i` owns ways `[i * set_size, (i + 1) * set_size)`
    sets: Box<[EntrySet<K, V>]>,
    /// Ways per set
    set_size: usize,
    hash_builder: S,
}

impl<K, V> NWaySetAssociativeCache<K, V, RandomState>
where
    K: Hash + Eq,
{
    // == Constructor ==
    /// Creates a cache of `number_of_sets` sets with `set_size` ways each.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`] if either dimension is zero.
    pub fn new(number_of_sets: usize, set_size: usize) -> Result<Self> {
        Self::with_hasher(number_of_sets, set_size, RandomState::new())
    }
}

impl<K, V, S> NWaySetAssociativeCache<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a cache that routes keys with `hash_builder`.
    ///
    /// # Errors
    /// [`CacheError::InvalidArgument`] if either dimension is zero or the
    /// total capacity overflows `usize`.
    pub fn with_hasher(number_of_sets: usize, set_size: usize, hash_builder: S) -> Result<Self> {
        if number_of_sets == 0 {
            return Err(CacheError::InvalidArgument(
                "number of sets must be greater than zero".to_string(),
            ));
        }
        if set_size == 0 {
            return Err(CacheError::InvalidArgument(
                "set size must be greater than zero".to_string(),
            ));
        }
        let capacity = number_of_sets.checked_mul(set_size).ok_or_else(|| {
            CacheError::InvalidArgument(format!(
                "capacity of {} sets of {} ways overflows",
                number_of_sets, set_size
            ))
        })?;

        let sets = (0..number_of_sets)
            .map(|index| {
                let begin = index * set_size;
                EntrySet::new(index, begin..begin + set_size)
            })
            .collect();

        info!(number_of_sets, set_size, capacity, "Set-associative cache created");

        Ok(Self {
            sets,
            set_size,
            hash_builder,
        })
    }

    // == Routing ==
    #[inline]
    fn hash_of<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.hash_builder.hash_one(key)
    }

    #[inline]
    fn route<Q>(&self, key: &Q) -> (u64, &EntrySet<K, V>)
    where
        Q: Hash + ?Sized,
    {
        let hash = self.hash_of(key);
        let index = (hash % self.sets.len() as u64) as usize;
        (hash, &self.sets[index])
    }

    /// Index of the set `key` belongs to.
    ///
    /// Depends only on the key's hash, never on what the cache holds.
    pub fn set_index_for<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.route(key).1.index()
    }

    // == Try Get ==
    /// Returns a copy of the value stored for `key`, refreshing its recency.
    pub fn try_get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let (hash, set) = self.route(key);
        set.lookup(hash, key)
    }

    // == Get ==
    /// Like [`try_get`](Self::try_get), but a miss is an error.
    ///
    /// # Errors
    /// [`CacheError::KeyNotFound`] if `key` is not cached.
    pub fn get<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: Clone,
    {
        self.try_get(key)
            .ok_or_else(|| CacheError::KeyNotFound(format!("{:?}", key)))
    }

    // == Insert ==
    /// Stores `value` under `key`.
    ///
    /// Overwriting an existing key refreshes its recency and leaves the entry
    /// count unchanged. A new key takes a free way of its set or, if the set
    /// is full, replaces that set's least recently used entry.
    pub fn insert(&self, key: K, value: V) -> Upsert<K, V> {
        let (hash, set) = self.route(&key);
        set.insert_or_update(hash, key, value)
    }

    // == Remove ==
    /// Removes `key`, returning whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (hash, set) = self.route(key);
        set.remove(hash, key, |_| true).is_some()
    }

    /// Removes `key` only if it currently maps to `value`.
    pub fn remove_entry<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let (hash, set) = self.route(key);
        set.remove(hash, key, |current| current == value).is_some()
    }

    // == Contains ==
    /// Checks whether `key` is cached without touching its recency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (hash, set) = self.route(key);
        set.contains(hash, key, |_| true)
    }

    /// Checks whether `key` is cached with exactly `value`.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        let (hash, set) = self.route(key);
        set.contains(hash, key, |current| current == value)
    }
}

impl<K, V, S> NWaySetAssociativeCache<K, V, S> {
    pub fn number_of_sets(&self) -> usize {
        self.sets.len()
    }

    pub fn set_size(&self) -> usize {
        self.set_size
    }

    /// Total number of ways.
    pub fn capacity(&self) -> usize {
        self.sets.len() * self.set_size
    }

    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    // == Length ==
    /// Number of live entries.
    ///
    /// Each set is counted under its own lock in turn, so concurrent writers
    /// may make the total slightly stale.
    pub fn len(&self) -> usize {
        self.sets.iter().map(EntrySet::used_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(|set| set.used_count() == 0)
    }

    /// Live entries per set, in set order.
    pub fn set_occupancy(&self) -> Vec<usize> {
        self.sets.iter().map(EntrySet::used_count).collect()
    }

    // == Clear ==
    /// Empties every set without releasing any storage.
    pub fn clear(&self) {
        let cleared: usize = self.sets.iter().map(EntrySet::clear).sum();
        debug!(cleared, "Cache cleared");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::new();
        for set in self.sets.iter() {
            set.accumulate_stats(&mut stats);
        }
        stats.total_entries = self.len();
        stats.capacity = self.capacity();
        stats
    }

    // == Iteration ==
    /// Iterates over clones of every live pair.
    ///
    /// Sets are visited in order and each one is copied under a single
    /// shared lock acquisition when the iterator reaches it. Writes to sets
    /// not yet reached may or may not show up.
    pub fn iter(&self) -> Iter<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        Iter::new(&self.sets)
    }

    pub fn keys(&self) -> Keys<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V>
    where
        K: Clone,
        V: Clone,
    {
        Values::new(self.iter())
    }

    // == Copy To ==
    /// Copies every live pair into `dest`, starting at `index`.
    ///
    /// # Errors
    /// - [`CacheError::OutOfRange`] if `index` is past the end of `dest`.
    /// - [`CacheError::InvalidArgument`] if the pairs do not fit after `index`.
    ///   Nothing is written in that case.
    pub fn copy_to(&self, dest: &mut [(K, V)], index: usize) -> Result<()>
    where
        K: Clone,
        V: Clone,
    {
        if index > dest.len() {
            return Err(CacheError::OutOfRange {
                index,
                len: dest.len(),
            });
        }
        let pairs: Vec<(K, V)> = self.iter().collect();
        let available = dest.len() - index;
        if pairs.len() > available {
            return Err(CacheError::InvalidArgument(format!(
                "destination has room for {} entries after index {}, {} needed",
                available,
                index,
                pairs.len()
            )));
        }
        for (slot, pair) in dest[index..].iter_mut().zip(pairs) {
            *slot = pair;
        }
        Ok(())
    }
}

impl<'a, K, V, S> IntoIterator for &'a NWaySetAssociativeCache<K, V, S>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
