//! NaN-aware ordering key and the binary search used by the scalar index.
//!
//! Indexed values are plain `f64`. Natural float comparison is only a
//! partial order, so sorted indices use [`IndexKey`] instead: NaN is less
//! than every other value and equal to every other NaN, everything else
//! compares numerically (`-0.0 == 0.0`). Comparison never panics.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An indexed scalar value with a total order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexKey(pub f64);

impl IndexKey {
    /// Returns the wrapped value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns `true` if the wrapped value is NaN.
    #[must_use]
    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }
}

impl From<f64> for IndexKey {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                if self.0 < other.0 {
                    Ordering::Less
                } else if self.0 > other.0 {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }
    }
}

impl std::fmt::Display for IndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Find the position of `key` in the sorted slice `keys`, or the closest
/// neighbour when there is no exact match.
///
/// With `lower` set, the result is the greatest key `<= key`; otherwise the
/// least key `>= key`. Returns `None` when `keys` is empty or when no key
/// lies on the requested side.
#[must_use]
pub fn closest(keys: &[IndexKey], key: IndexKey, lower: bool) -> Option<usize> {
    match keys.binary_search(&key) {
        Ok(pos) => Some(pos),
        Err(insert) if lower => insert.checked_sub(1),
        Err(insert) => (insert < keys.len()).then_some(insert),
    }
}
