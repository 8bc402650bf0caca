//! Cache Entry Module
//!
//! Defines a single way of a set: an optional key/value pair plus the
//! metadata used for routing checks and recency ranking.

use std::borrow::Borrow;
use std::sync::atomic::{AtomicU64, Ordering};

// == Entry ==
/// One way of a set.
///
/// Entries are allocated once, when their set is built, and are never freed
/// individually afterwards. Occupying a way marks it used; removing or
/// evicting it is a logical clear of the slot.
#[derive(Debug)]
pub struct Entry<K, V> {
    /// Live key/value pair, `None` while the way is unused
    slot: Option<(K, V)>,
    /// Hash of the key, only meaningful while the way is used
    key_hash: u64,
    /// Recency rank within the owning set; larger is more recent
    usage_stamp: AtomicU64,
}

impl<K, V> Default for Entry<K, V> {
    fn default() -> Self {
        Self {
            slot: None,
            key_hash: 0,
            usage_stamp: AtomicU64::new(0),
        }
    }
}

impl<K, V> Entry<K, V> {
    // == Constructor ==
    /// Creates an unused way.
    pub fn new() -> Self {
        Self::default()
    }

    // == Is Used ==
    /// Returns true iff the way currently holds a live pair.
    #[inline]
    pub fn is_used(&self) -> bool {
        self.slot.is_some()
    }

    #[inline]
    pub fn key_hash(&self) -> u64 {
        self.key_hash
    }

    #[inline]
    pub fn usage_stamp(&self) -> u64 {
        self.usage_stamp.load(Ordering::Relaxed)
    }

    pub fn key(&self) -> Option<&K> {
        self.slot.as_ref().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&V> {
        self.slot.as_ref().map(|(_, value)| value)
    }

    pub fn pair(&self) -> Option<(&K, &V)> {
        self.slot.as_ref().map(|(key, value)| (key, value))
    }

    // == Matches ==
    /// Checks whether this way holds `key`.
    ///
    /// The cached hash is compared first so that most mismatches never reach
    /// the full key comparison.
    #[inline]
    pub fn matches<Q>(&self, key_hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match &self.slot {
            Some((k, _)) => self.key_hash == key_hash && k.borrow() == key,
            None => false,
        }
    }

    // == Touch ==
    /// Refreshes the recency stamp.
    ///
    /// Takes `&self` so that reads holding only a shared set lock can still
    /// record the access.
    #[inline]
    pub fn touch(&self, stamp: u64) {
        self.usage_stamp.store(stamp, Ordering::Relaxed);
    }

    // == Occupy ==
    /// Stores a new pair in this way, returning whatever pair it displaced.
    pub fn occupy(&mut self, key_hash: u64, key: K, value: V, stamp: u64) -> Option<(K, V)> {
        self.key_hash = key_hash;
        *self.usage_stamp.get_mut() = stamp;
        self.slot.replace((key, value))
    }

    // == Refresh ==
    /// Refreshes the stamp of a used way and hands out its value for
    /// overwriting.
    ///
    /// Returns `None` (and leaves the stamp alone) if the way is unused.
    pub fn refresh(&mut self, stamp: u64) -> Option<&mut V> {
        let (_, current) = self.slot.as_mut()?;
        *self.usage_stamp.get_mut() = stamp;
        Some(current)
    }

    // == Clear ==
    /// Marks the way unused and hands back the pair it held.
    pub fn clear(&mut self) -> Option<(K, V)> {
        self.key_hash = 0;
        self.slot.take()
    }
}
