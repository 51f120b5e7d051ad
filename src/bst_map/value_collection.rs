use core::fmt;
use core::hash::{Hash, Hasher};

use super::view::{Cursor, View};
use super::{BstMap, Values};
use crate::hashing::{element_hash, sum_hashes};

/// A live view of the values of a [`BstMap`].
///
/// Created by [`BstMap::value_collection`]. Values may repeat; removing a value
/// removes the first entry holding it, in pre-order.
///
/// ```
/// use bst_map::{BstMap, View};
///
/// let mut map = BstMap::from([(2, "x"), (1, "x"), (3, "y")]);
/// let mut values = map.value_collection();
/// assert!(values.remove(&"x"));
/// assert!(values.contains(&"x"));
/// assert!(values.remove_all(&["x"]));
/// assert!(!values.contains(&"x"));
/// assert_eq!(map.len(), 1);
/// ```
pub struct ValueCollection<'a, K, V> {
    map: &'a mut BstMap<K, V>,
}

impl<'a, K, V> ValueCollection<'a, K, V> {
    pub(crate) fn new(map: &'a mut BstMap<K, V>) -> Self {
        ValueCollection { map }
    }

    /// Borrowing iterator over the values in ascending key order.
    pub fn iter(&self) -> Values<'_, K, V> {
        self.map.values()
    }

    /// Sum of the value hashes, one term per entry.
    #[must_use]
    pub fn hash_code(&self) -> u64
    where
        V: Hash,
    {
        sum_hashes(self.iter().map(element_hash))
    }
}

impl<K: Ord + Clone, V: PartialEq + Clone> View for ValueCollection<'_, K, V> {
    type Item = V;
    type Cursor<'c>
        = Cursor<'c, K, V, V>
    where
        Self: 'c;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, value: &V) -> bool {
        self.map.contains_value(value)
    }

    fn remove(&mut self, value: &V) -> bool {
        self.map.raw.remove_first_value(value)
    }

    /// Removes every occurrence of each listed value.
    fn remove_all(&mut self, values: &[V]) -> bool {
        let mut changed = false;
        for value in values {
            changed |= self.map.remove_by_value(value);
        }
        changed
    }

    fn cursor(&mut self) -> Cursor<'_, K, V, V> {
        Cursor::new(&mut *self.map, |_, value| value.clone())
    }
}

impl<K, V: PartialEq, W> PartialEq<ValueCollection<'_, W, V>> for ValueCollection<'_, K, V> {
    fn eq(&self, other: &ValueCollection<'_, W, V>) -> bool {
        self.map.len() == other.map.len()
            && self.iter().all(|value| other.iter().any(|candidate| candidate == value))
            && other.iter().all(|value| self.iter().any(|candidate| candidate == value))
    }
}

impl<K, V: Hash> Hash for ValueCollection<'_, K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K, V: fmt::Debug> fmt::Debug for ValueCollection<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
