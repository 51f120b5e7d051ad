use core::fmt;
use core::hash::{Hash, Hasher};

use super::view::{Cursor, View};
use super::{BstMap, Keys};
use crate::hashing::{element_hash, sum_hashes};

/// A live view of the keys of a [`BstMap`].
///
/// Created by [`BstMap::key_set`]. Removing a key removes its whole entry.
///
/// ```
/// use bst_map::{BstMap, View};
///
/// let mut map = BstMap::from([("a", 1), ("b", 2), ("c", 3)]);
/// let mut keys = map.key_set();
/// assert!(keys.contains(&"b"));
/// assert!(keys.retain_all(&["a"]));
/// assert_eq!(keys.len(), 1);
/// ```
pub struct KeySet<'a, K, V> {
    map: &'a mut BstMap<K, V>,
}

impl<'a, K, V> KeySet<'a, K, V> {
    pub(crate) fn new(map: &'a mut BstMap<K, V>) -> Self {
        KeySet { map }
    }

    /// Borrowing iterator over the keys in ascending order.
    pub fn iter(&self) -> Keys<'_, K, V> {
        self.map.keys()
    }

    /// Sum of the key hashes.
    #[must_use]
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
    {
        sum_hashes(self.iter().map(element_hash))
    }
}

impl<K: Ord + Clone, V> View for KeySet<'_, K, V> {
    type Item = K;
    type Cursor<'c>
        = Cursor<'c, K, V, K>
    where
        Self: 'c;

    fn len(&self) -> usize {
        self.map.len()
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    fn cursor(&mut self) -> Cursor<'_, K, V, K> {
        Cursor::new(&mut *self.map, |key, _| key.clone())
    }
}

impl<K: Ord, V, W> PartialEq<KeySet<'_, K, W>> for KeySet<'_, K, V> {
    fn eq(&self, other: &KeySet<'_, K, W>) -> bool {
        self.map.len() == other.map.len()
            && self.map.keys().all(|key| other.map.contains_key(key))
            && other.map.keys().all(|key| self.map.contains_key(key))
    }
}

impl<K: Ord, V> Eq for KeySet<'_, K, V> {}

impl<K: Hash, V> Hash for KeySet<'_, K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: fmt::Debug, V> fmt::Debug for KeySet<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
