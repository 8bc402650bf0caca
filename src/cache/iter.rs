//! Cache Iterators
//!
//! Lazy iteration over the live pairs of a cache, copying one set at a time.

use std::iter::FusedIterator;

use crate::cache::EntrySet;

// == Iter ==
/// Iterator over clones of a cache's live `(key, value)` pairs.
///
/// Each set is snapshotted under its shared lock the first time the iterator
/// reaches it, so no lock is held between calls to `next`.
#[derive(Debug)]
pub struct Iter<'a, K, V> {
    sets: &'a [EntrySet<K, V>],
    next_set: usize,
    pending: std::vec::IntoIter<(K, V)>,
}

impl<'a, K, V> Iter<'a, K, V>
where
    K: Clone,
    V: Clone,
{
    pub(crate) fn new(sets: &'a [EntrySet<K, V>]) -> Self {
        Self {
            sets,
            next_set: 0,
            pending: Vec::new().into_iter(),
        }
    }
}

impl<K, V> Iterator for Iter<'_, K, V>
where
    K: Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.next() {
                return Some(pair);
            }
            let set = self.sets.get(self.next_set)?;
            self.next_set += 1;
            self.pending = set.snapshot().into_iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining_ways: usize = self.sets[self.next_set..]
            .iter()
            .map(EntrySet::ways)
            .sum();
        let pending = self.pending.len();
        (pending, Some(pending + remaining_ways))
    }
}

impl<K: Clone, V: Clone> FusedIterator for Iter<'_, K, V> {}

// == Keys ==
/// Iterator over clones of a cache's live keys.
#[derive(Debug)]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K: Clone, V: Clone> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone, V: Clone> FusedIterator for Keys<'_, K, V> {}

// == Values ==
/// Iterator over clones of a cache's live values.
#[derive(Debug)]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<K: Clone, V: Clone> Iterator for Values<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: Clone, V: Clone> FusedIterator for Values<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets() -> Vec<EntrySet<u32, char>> {
        let sets: Vec<_> = (0..3)
            .map(|index| EntrySet::new(index, index * 2..index * 2 + 2))
            .collect();
        sets[0].insert_or_update(0, 0, 'a');
        sets[2].insert_or_update(2, 2, 'c');
        sets[2].insert_or_update(5, 5, 'f');
        sets
    }

    #[test]
    fn test_iter_skips_empty_sets() {
        let sets = sets();

        let pairs: Vec<_> = Iter::new(&sets).collect();
        assert_eq!(pairs, vec![(0, 'a'), (2, 'c'), (5, 'f')]);
    }

    #[test]
    fn test_iter_is_fused() {
        let sets = sets();
        let mut iter = Iter::new(&sets);

        assert_eq!(iter.by_ref().count(), 3);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_iter_size_hint_bounds() {
        let sets = sets();
        let iter = Iter::new(&sets);

        assert_eq!(iter.size_hint(), (0, Some(6)));
    }

    #[test]
    fn test_iter_sees_writes_to_unvisited_sets() {
        let sets = sets();
        let mut iter = Iter::new(&sets);

        assert_eq!(iter.next(), Some((0, 'a')));
        sets[1].insert_or_update(3, 3, 'd');

        let rest: Vec<_> = iter.collect();
        assert_eq!(rest, vec![(3, 'd'), (2, 'c'), (5, 'f')]);
    }

    #[test]
    fn test_keys_and_values() {
        let sets = sets();

        let keys: Vec<_> = Keys::new(Iter::new(&sets)).collect();
        let values: Vec<_> = Values::new(Iter::new(&sets)).collect();

        assert_eq!(keys, vec![0, 2, 5]);
        assert_eq!(values, vec!['a', 'c', 'f']);
    }
}
