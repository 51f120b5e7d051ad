use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use super::BstMap;
use crate::error::MapError;

/// Operations shared by the live views of a [`BstMap`].
///
/// A view borrows its map: every query reads the map's current state, and
/// every removal goes through the map. Views can never grow the map, so
/// [`add`](View::add) and [`add_all`](View::add_all) always fail.
pub trait View {
    /// The element type the view presents.
    type Item;

    /// Snapshot cursor returned by [`cursor`](View::cursor).
    type Cursor<'c>: Iterator<Item = Self::Item>
    where
        Self: 'c;

    /// Number of elements; always the length of the map.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, item: &Self::Item) -> bool;

    fn contains_all(&self, items: &[Self::Item]) -> bool {
        items.iter().all(|item| self.contains(item))
    }

    /// Removes one element from the map. Returns whether the map changed.
    fn remove(&mut self, item: &Self::Item) -> bool;

    /// Removes each listed element. Returns whether the map changed.
    fn remove_all(&mut self, items: &[Self::Item]) -> bool {
        let mut changed = false;
        for item in items {
            changed |= self.remove(item);
        }
        changed
    }

    /// Removes every element not listed in `keep`. Returns whether the map
    /// changed.
    fn retain_all(&mut self, keep: &[Self::Item]) -> bool
    where
        Self::Item: PartialEq,
    {
        let doomed: Vec<Self::Item> = self.cursor().filter(|item| !keep.contains(item)).collect();
        let mut changed = false;
        for item in &doomed {
            changed |= self.remove(item);
        }
        changed
    }

    /// # Errors
    ///
    /// Always [`MapError::Unsupported`].
    fn add(&mut self, item: Self::Item) -> Result<bool, MapError> {
        drop(item);
        Err(MapError::Unsupported { operation: "add" })
    }

    /// # Errors
    ///
    /// Always [`MapError::Unsupported`].
    fn add_all<I>(&mut self, items: I) -> Result<bool, MapError>
    where
        I: IntoIterator<Item = Self::Item>,
    {
        drop(items);
        Err(MapError::Unsupported { operation: "add_all" })
    }

    /// Captures the current elements in pre-order (root, left subtree, right
    /// subtree) and returns a cursor over that snapshot.
    fn cursor(&mut self) -> Self::Cursor<'_>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CursorState {
    Fresh,
    AfterNext,
    AfterRemove,
}

/// A cursor over a point-in-time snapshot of a view.
///
/// The elements are captured when the cursor is created; later changes to the
/// map do not alter what it yields. [`remove`](Cursor::remove) deletes the
/// entry behind the element most recently yielded, looking it up again by key
/// in the live map.
///
/// # Examples
///
/// ```
/// use bst_map::{BstMap, MapError, View};
///
/// let mut map = BstMap::from([(2, 'b'), (1, 'a'), (3, 'c')]);
/// let mut keys = map.key_set();
/// let mut cursor = keys.cursor();
///
/// assert_eq!(cursor.remove(), Err(MapError::InvalidIteratorState));
/// assert_eq!(cursor.next(), Some(2)); // the root comes first
/// cursor.remove().unwrap();
/// assert_eq!(cursor.remove(), Err(MapError::InvalidIteratorState));
/// assert_eq!(cursor.next(), Some(1));
/// assert_eq!(cursor.next(), Some(3));
/// assert_eq!(cursor.next(), None);
///
/// assert_eq!(map.len(), 2);
/// ```
pub struct Cursor<'a, K, V, T> {
    map: &'a mut BstMap<K, V>,
    pending: alloc::vec::IntoIter<(K, T)>,
    last: Option<K>,
    state: CursorState,
}

impl<'a, K: Clone, V, T> Cursor<'a, K, V, T> {
    pub(crate) fn new(map: &'a mut BstMap<K, V>, project: impl Fn(&K, &V) -> T) -> Self {
        let snapshot: Vec<(K, T)> = map
            .raw
            .preorder()
            .map(|handle| {
                let node = map.raw.node(handle);
                (node.key.clone(), project(&node.key, &node.value))
            })
            .collect();
        Cursor {
            map,
            pending: snapshot.into_iter(),
            last: None,
            state: CursorState::Fresh,
        }
    }
}

impl<K: Ord, V, T> Cursor<'_, K, V, T> {
    /// Removes, through the map, the entry whose element was returned by the
    /// latest call to `next`.
    ///
    /// If that entry has meanwhile left the map, nothing is removed.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidIteratorState`] if `next` has not been called yet, or
    /// if `remove` was already called since the latest `next`.
    pub fn remove(&mut self) -> Result<(), MapError> {
        match (self.state, self.last.take()) {
            (CursorState::AfterNext, Some(key)) => {
                self.map.remove(&key);
                self.state = CursorState::AfterRemove;
                Ok(())
            }
            _ => Err(MapError::InvalidIteratorState),
        }
    }
}

impl<K, V, T> Iterator for Cursor<'_, K, V, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (key, item) = self.pending.next()?;
        self.last = Some(key);
        self.state = CursorState::AfterNext;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pending.size_hint()
    }
}

impl<K, V, T> ExactSizeIterator for Cursor<'_, K, V, T> {}

impl<K, V, T> FusedIterator for Cursor<'_, K, V, T> {}

impl<K, V, T> fmt::Debug for Cursor<'_, K, V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("state", &self.state)
            .field("remaining", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn map() -> BstMap<u8, char> {
        BstMap::from([(5, 'e'), (3, 'c'), (8, 'h'), (1, 'a')])
    }

    #[test]
    fn fresh_cursor_rejects_remove() {
        let mut map = map();
        let mut cursor = Cursor::new(&mut map, |key, _| *key);
        assert_eq!(cursor.state, CursorState::Fresh);
        assert_eq!(cursor.remove(), Err(MapError::InvalidIteratorState));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn state_transitions() {
        let mut map = map();
        let mut cursor = Cursor::new(&mut map, |_, value| *value);
        assert_eq!(cursor.next(), Some('e'));
        assert_eq!(cursor.state, CursorState::AfterNext);
        assert_eq!(cursor.next(), Some('c'));
        assert_eq!(cursor.remove(), Ok(()));
        assert_eq!(cursor.state, CursorState::AfterRemove);
        assert_eq!(cursor.remove(), Err(MapError::InvalidIteratorState));
        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.state, CursorState::AfterNext);
        assert!(!map.contains_key(&3));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn exhausted_cursor_keeps_returning_none() {
        let mut map = map();
        let mut cursor = Cursor::new(&mut map, |key, value| (*key, *value));
        assert_eq!(cursor.len(), 4);
        assert_eq!(cursor.by_ref().count(), 4);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.next(), None);
        // The last yielded element can still be removed.
        assert_eq!(cursor.remove(), Ok(()));
        assert!(!map.contains_key(&8));
    }

    #[test]
    fn snapshot_ignores_later_removals() {
        let mut map = map();
        let mut cursor = Cursor::new(&mut map, |key, _| *key);
        assert_eq!(cursor.next(), Some(5));
        cursor.remove().unwrap();
        let rest: Vec<u8> = cursor.collect();
        assert_eq!(rest, [3, 1, 8]);
        map.validate().unwrap();
    }
}
