use core::fmt;
use core::hash::{Hash, Hasher};

use super::view::{Cursor, View};
use super::{BstMap, Iter};

/// A live view of the entries of a [`BstMap`] as `(key, value)` pairs.
///
/// Created by [`BstMap::entry_set`]. An entry is contained only if its key is
/// present *and* maps to an equal value; removal follows the same rule.
///
/// ```
/// use bst_map::{BstMap, View};
///
/// let mut map = BstMap::from([(1, 'a'), (2, 'b')]);
/// let mut entries = map.entry_set();
/// assert!(!entries.remove(&(1, 'z')));
/// assert!(entries.remove(&(1, 'a')));
/// assert_eq!(map.len(), 1);
/// ```
pub struct EntrySet<'a, K, V> {
    map: &'a mut BstMap<K, V>,
}

impl<'a, K, V> EntrySet<'a, K, V> {
    pub(crate) fn new(map: &'a mut BstMap<K, V>) -> Self {
        EntrySet { map }
    }

    /// Borrowing iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    /// Same as the owning map's [`hash_code`](BstMap::hash_code).
    #[must_use]
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        self.map.hash_code()
    }
}

impl<K: Ord + Clone, V: PartialEq + Clone> View for EntrySet<'_, K, V> {
    type Item = (K, V);
    type Cursor<'c>
        = Cursor<'c, K, V, (K, V)>
    where
        Self: 'c;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, (key, value): &(K, V)) -> bool {
        self.map.get(key) == Some(value)
    }

    fn remove(&mut self, entry: &(K, V)) -> bool {
        self.contains(entry) && self.map.remove(&entry.0).is_some()
    }

    fn cursor(&mut self) -> Cursor<'_, K, V, (K, V)> {
        Cursor::new(&mut *self.map, |key, value| (key.clone(), value.clone()))
    }
}

impl<K: Ord, V: PartialEq> PartialEq for EntrySet<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        *self.map == *other.map
    }
}

impl<K: Ord, V: Eq> Eq for EntrySet<'_, K, V> {}

impl<K: Hash, V: Hash> Hash for EntrySet<'_, K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntrySet<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
