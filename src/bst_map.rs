use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use alloc::collections::BTreeMap;

use crate::error::MapError;
use crate::hashing::{entry_hash, sum_hashes};
use crate::raw::{Inorder, RawBstMap};

mod entry_set;
mod key_set;
mod value_collection;
mod view;

pub use entry_set::EntrySet;
pub use key_set::KeySet;
pub use value_collection::ValueCollection;
pub use view::{Cursor, View};

/// An ordered map backed by an unbalanced [binary search tree].
///
/// Keys must implement [`Ord`]. Each entry lives in its own tree node; nodes
/// are never rotated, so the shape of the tree is decided entirely by the
/// order of insertions and removals. Sorted insertions therefore produce a
/// list-shaped tree with linear height. Use [`height`](BstMap::height) to
/// observe this.
///
/// Besides the usual map operations, a `BstMap` hands out three *live views*
/// ([`key_set`], [`value_collection`], [`entry_set`]) that read through to the
/// map and shrink it when elements are removed from them.
///
/// # Examples
///
/// ```
/// use bst_map::BstMap;
///
/// let mut map = BstMap::new();
/// map.insert("b", "2");
/// map.insert("a", "1");
/// map.insert("c", "3");
///
/// assert_eq!(map.get("a"), Some(&"1"));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
///
/// // `b` has two children; removing it keeps the map ordered.
/// assert_eq!(map.remove("b"), Some("2"));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "c"]);
/// ```
///
/// # Removal
///
/// Removing a node with two children promotes the taller child subtree into
/// its place (the left one when both are equally tall) and hangs the shorter
/// subtree from the outermost free slot of the promoted one. Nothing is
/// rebalanced afterwards, so long sequences of such removals can deepen the
/// tree.
///
/// [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree
/// [`key_set`]: BstMap::key_set
/// [`value_collection`]: BstMap::value_collection
/// [`entry_set`]: BstMap::entry_set
pub struct BstMap<K, V> {
    raw: RawBstMap<K, V>,
}

/// An iterator over the entries of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`iter`] method on [`BstMap`].
///
/// [`iter`]: BstMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    raw: &'a RawBstMap<K, V>,
    inner: Inorder<'a, K, V>,
}

/// A mutable iterator over the entries of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`iter_mut`] method on [`BstMap`].
///
/// [`iter_mut`]: BstMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V> {
    inner: alloc::vec::IntoIter<(&'a K, &'a mut V)>,
}

/// An owning iterator over the entries of a `BstMap`, sorted by key.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a `BstMap`, in ascending order.
///
/// This `struct` is created by the [`keys`] method on [`BstMap`].
///
/// [`keys`]: BstMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BstMap`, in ascending key order.
///
/// This `struct` is created by the [`values`] method on [`BstMap`].
///
/// [`values`]: BstMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of a `BstMap`, in ascending key order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<K, V> BstMap<K, V> {
    /// Makes a new, empty `BstMap`. Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> BstMap<K, V> {
        BstMap { raw: RawBstMap::new() }
    }

    /// Creates an empty map with room for at least `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        BstMap {
            raw: RawBstMap::with_capacity(capacity),
        }
    }

    /// Returns the number of nodes the map can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of elements in the map. O(1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of levels in the tree: 0 when empty, 1 for a lone
    /// root, and up to `len()` for a list-shaped tree.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let sorted: BstMap<_, _> = (0..5).map(|k| (k, ())).collect();
    /// assert_eq!(sorted.height(), 5);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.tree_height()
    }

    /// Clears the map, dropping every entry.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: &self.raw,
            inner: self.raw.inorder(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::from([("a", 1), ("b", 2)]);
    /// for (_, value) in map.iter_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map["b"], 20);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw.inorder_mut().into_iter(),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Creates a consuming iterator visiting all the keys, in sorted order.
    pub fn into_keys(self) -> impl Iterator<Item = K> {
        self.into_iter().map(|(key, _)| key)
    }

    /// Creates a consuming iterator visiting all the values, in order by key.
    pub fn into_values(self) -> impl Iterator<Item = V> {
        self.into_iter().map(|(_, value)| value)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.node(self.raw.first()?);
        Some((&node.key, &node.value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.node(self.raw.last()?);
        Some((&node.key, &node.value))
    }

    /// Returns the sum over all entries of `hash(key) ^ hash(value)`.
    ///
    /// The sum does not depend on tree shape or insertion order, so equal
    /// maps always produce equal codes.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let a = BstMap::from([(1, 'x'), (2, 'y')]);
    /// let b = BstMap::from([(2, 'y'), (1, 'x')]);
    /// assert_eq!(a.hash_code(), b.hash_code());
    /// ```
    #[must_use]
    pub fn hash_code(&self) -> u64
    where
        K: Hash,
        V: Hash,
    {
        sum_hashes(self.iter().map(|(key, value)| entry_hash(key, value)))
    }
}

impl<K: Ord, V> BstMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Returns `true` if any entry holds `value`. Visits every node.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let map = BstMap::from([("a", Some(1)), ("b", None)]);
    /// assert!(map.contains_value(&None));
    /// assert!(!map.contains_value(&Some(2)));
    /// ```
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.raw.contains_value(value)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is replaced in place and the
    /// old value is returned; the key itself is not updated.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    #[doc(alias = "put")]
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Inserts every pair from `other`. Later pairs win on key collisions.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "a")]);
    /// map.put_all(BTreeMap::from([(1, "b"), (2, "c")]));
    /// assert_eq!(map, BTreeMap::from([(1, "b"), (2, "c")]));
    /// ```
    #[doc(alias = "putAll")]
    pub fn put_all<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in other {
            self.insert(key, value);
        }
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Removes a key from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove_entry(key)
    }

    /// Removes every entry holding `value`, returning whether any was removed.
    ///
    /// ```
    /// use bst_map::BstMap;
    ///
    /// let mut map = BstMap::from([(1, "x"), (2, "y"), (3, "x")]);
    /// assert!(map.remove_by_value(&"x"));
    /// assert_eq!(map.len(), 1);
    /// assert!(!map.remove_by_value(&"x"));
    /// ```
    pub fn remove_by_value(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.raw.remove_by_value(value)
    }

    /// Checks every structural invariant of the underlying tree: strict key
    /// order, parent links mirroring child links, and the cached length.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::CorruptTree`] naming the first violated invariant.
    pub fn validate(&self) -> Result<(), MapError> {
        self.raw.validate()
    }

    /// Returns a live view of the keys.
    ///
    /// ```
    /// use bst_map::{BstMap, View};
    ///
    /// let mut map = BstMap::from([(1, 'a'), (2, 'b')]);
    /// assert!(map.key_set().remove(&1));
    /// assert_eq!(map.len(), 1);
    /// ```
    #[doc(alias = "keySet")]
    pub fn key_set(&mut self) -> KeySet<'_, K, V> {
        KeySet::new(self)
    }

    /// Returns a live view of the values.
    #[doc(alias = "values")]
    pub fn value_collection(&mut self) -> ValueCollection<'_, K, V> {
        ValueCollection::new(self)
    }

    /// Returns a live view of the entries as `(key, value)` pairs.
    #[doc(alias = "entrySet")]
    pub fn entry_set(&mut self) -> EntrySet<'_, K, V> {
        EntrySet::new(self)
    }

    /// Entry equality against any map-like lookup, independent of shape.
    fn same_entries<'a, I>(&self, other_len: usize, mut other: I) -> bool
    where
        K: 'a,
        V: PartialEq + 'a,
        I: Iterator<Item = (&'a K, &'a V)>,
    {
        self.len() == other_len && other.all(|(key, value)| self.get(key) == Some(value))
    }
}

impl<K: Clone, V: Clone> Clone for BstMap<K, V> {
    fn clone(&self) -> Self {
        BstMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for BstMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl<K: Ord, V: PartialEq> PartialEq for BstMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.same_entries(other.len(), other.iter())
    }
}

impl<K: Ord, V: Eq> Eq for BstMap<K, V> {}

impl<K: Ord, V: PartialEq> PartialEq<BTreeMap<K, V>> for BstMap<K, V> {
    fn eq(&self, other: &BTreeMap<K, V>) -> bool {
        self.same_entries(other.len(), other.iter())
    }
}

impl<K: Ord, V: PartialEq> PartialEq<BstMap<K, V>> for BTreeMap<K, V> {
    fn eq(&self, other: &BstMap<K, V>) -> bool {
        other == self
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BstMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for BstMap<K, V> {
    fn default() -> Self {
        BstMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BstMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BstMap::new();
        map.put_all(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for BstMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.put_all(iter);
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for BstMap<K, V> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.put_all(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BstMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for BstMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a BstMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut BstMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for BstMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.raw.node(self.inner.next()?);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            raw: self.raw,
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.len()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.inner.len()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V> fmt::Debug for ValuesMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.len()).finish()
    }
}
