//! Sorted scalar index.
//!
//! Keys are kept in a sorted vector with a parallel vector of buckets; each
//! bucket holds the arena slots of every resource sharing that exact key, in
//! insertion order. Range walks start from the position found by
//! [`closest`] and never include the query value's own bucket.

use crate::ordering::{IndexKey, closest};

/// A sorted multi-map from [`IndexKey`] to resource slots.
#[derive(Debug, Clone, Default)]
pub struct ScalarIndex {
    /// Sorted ascending, no duplicates.
    keys: Vec<IndexKey>,
    /// `buckets[i]` holds the slots stored under `keys[i]`.
    buckets: Vec<Vec<usize>>,
}

impl ScalarIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `slot` to the bucket for `value`, creating it if needed.
    pub fn insert(&mut self, value: f64, slot: usize) {
        let key = IndexKey(value);
        match self.keys.binary_search(&key) {
            Ok(pos) => self.buckets[pos].push(slot),
            Err(pos) => {
                self.keys.insert(pos, key);
                self.buckets.insert(pos, vec![slot]);
            }
        }
    }

    /// The slots stored under exactly `value`.
    #[must_use]
    pub fn bucket(&self, value: f64) -> &[usize] {
        match self.keys.binary_search(&IndexKey(value)) {
            Ok(pos) => &self.buckets[pos],
            Err(_) => &[],
        }
    }

    /// Slots stored under keys strictly below `value`, nearest key first.
    pub fn before(&self, value: f64) -> impl Iterator<Item = usize> + '_ {
        let key = IndexKey(value);
        let end = match closest(&self.keys, key, true) {
            Some(pos) if self.keys[pos] == key => pos,
            Some(pos) => pos + 1,
            None => 0,
        };
        self.buckets[..end]
            .iter()
            .rev()
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Slots stored under keys strictly above `value`, nearest key first.
    pub fn after(&self, value: f64) -> impl Iterator<Item = usize> + '_ {
        let key = IndexKey(value);
        let start = match closest(&self.keys, key, false) {
            Some(pos) if self.keys[pos] == key => pos + 1,
            Some(pos) => pos,
            None => self.keys.len(),
        };
        self.buckets[start..]
            .iter()
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// The distinct keys, ascending.
    #[must_use]
    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if nothing has been indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slots 0..4 valued [1, 3, 3, 5].
    fn sample() -> ScalarIndex {
        let mut index = ScalarIndex::new();
        for (slot, value) in [1.0, 3.0, 3.0, 5.0].into_iter().enumerate() {
            index.insert(value, slot);
        }
        index
    }

    #[test]
    fn test_bucket_exact() {
        let index = sample();
        assert_eq!(index.bucket(3.0), &[1, 2]);
        assert_eq!(index.bucket(1.0), &[0]);
        assert!(index.bucket(4.0).is_empty());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_after_is_exclusive() {
        let index = sample();
        assert_eq!(index.after(3.0).collect::<Vec<_>>(), vec![3]);
        assert_eq!(index.after(2.0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(index.after(0.0).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(index.after(5.0).count(), 0);
        assert_eq!(index.after(9.0).count(), 0);
    }

    #[test]
    fn test_before_is_exclusive_and_descending() {
        let index = sample();
        assert_eq!(index.before(3.0).collect::<Vec<_>>(), vec![0]);
        assert_eq!(index.before(4.0).collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_eq!(index.before(9.0).collect::<Vec<_>>(), vec![3, 1, 2, 0]);
        assert_eq!(index.before(1.0).count(), 0);
        assert_eq!(index.before(-1.0).count(), 0);
    }

    #[test]
    fn test_empty_index() {
        let index = ScalarIndex::new();
        assert!(index.is_empty());
        assert!(index.bucket(1.0).is_empty());
        assert_eq!(index.before(1.0).count(), 0);
        assert_eq!(index.after(1.0).count(), 0);
    }

    #[test]
    fn test_nan_bucket_sorts_first() {
        let mut index = sample();
        index.insert(f64::NAN, 10);
        index.insert(f64::NAN, 11);
        assert!(index.keys()[0].is_nan());
        assert_eq!(index.bucket(f64::NAN), &[10, 11]);
        assert_eq!(index.before(1.0).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(index.after(f64::NAN).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(index.before(f64::NAN).count(), 0);
    }
}
