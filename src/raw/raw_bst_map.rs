use core::borrow::Borrow;
use core::cmp::Ordering;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::error::MapError;

/// Traversal stack; deep enough for most random trees without spilling.
type Stack = SmallVec<[Handle; 32]>;

/// The unbalanced binary search tree backing `BstMap`.
#[derive(Clone)]
pub(crate) struct RawBstMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of reachable nodes.
    len: usize,
}

impl<K, V> RawBstMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Drops every node.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        &self.nodes[handle]
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        &mut self.nodes[handle]
    }

    /// Root, then left subtree, then right subtree.
    pub(crate) fn preorder(&self) -> Preorder<'_, K, V> {
        Preorder {
            nodes: &self.nodes,
            stack: self.root.into_iter().collect(),
        }
    }

    /// Ascending key order.
    pub(crate) fn inorder(&self) -> Inorder<'_, K, V> {
        let mut inorder = Inorder {
            nodes: &self.nodes,
            stack: Stack::new(),
            remaining: self.len,
        };
        inorder.descend_left(self.root);
        inorder
    }

    /// Leftmost node.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.extreme(Side::Left)
    }

    /// Rightmost node.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(next) = self.nodes[current].child(side) {
            current = next;
        }
        Some(current)
    }

    /// Height of the subtree rooted at `subtree`; zero when empty.
    ///
    /// Counted level by level so degenerate (list-shaped) trees cannot exhaust
    /// the call stack.
    pub(crate) fn height(&self, subtree: Option<Handle>) -> usize {
        let mut level: Vec<Handle> = subtree.into_iter().collect();
        let mut height = 0;
        while !level.is_empty() {
            height += 1;
            level = level.iter().flat_map(|&handle| self.nodes[handle].children()).collect();
        }
        height
    }

    /// Height of the whole tree.
    pub(crate) fn tree_height(&self) -> usize {
        self.height(self.root)
    }

    /// Borrows every value mutably, in ascending key order.
    pub(crate) fn inorder_mut(&mut self) -> Vec<(&K, &mut V)> {
        let order: Vec<Handle> = self.inorder().collect();
        let mut slots: Vec<Option<(&K, &mut V)>> = self
            .nodes
            .slots_mut()
            .map(|slot| {
                slot.map(|node| {
                    let Node { key, value, .. } = node;
                    (&*key, value)
                })
            })
            .collect();
        order.into_iter().filter_map(|handle| slots[handle.to_index()].take()).collect()
    }

    /// Moves every pair out in ascending key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let order: Vec<Handle> = self.inorder().collect();
        let mut result = Vec::with_capacity(order.len());
        for handle in order {
            let node = self.nodes.take(handle);
            result.push((node.key, node.value));
        }
        self.clear();
        result
    }

    /// Unlinks `handle` from the tree and returns its pair.
    ///
    /// Only the removed node's slot is released, so handles to every other
    /// node stay valid across the call.
    pub(crate) fn remove_handle(&mut self, handle: Handle) -> (K, V) {
        let Node {
            parent, left, right, ..
        } = self.nodes[handle];

        match (left, right) {
            (None, None) => {
                trace!(case = "leaf", "removing node");
                self.replace_child(parent, handle, None);
            }
            (Some(child), None) | (None, Some(child)) => {
                trace!(case = "one child", "removing node");
                self.replace_child(parent, handle, Some(child));
            }
            (Some(left), Some(right)) => {
                let left_height = self.height(Some(left));
                let right_height = self.height(Some(right));
                // Ties promote the left subtree.
                let (taller, shorter, graft_side) = if left_height >= right_height {
                    (left, right, Side::Right)
                } else {
                    (right, left, Side::Left)
                };
                let promoted = if graft_side == Side::Right { "left" } else { "right" };
                debug!(left_height, right_height, promoted, "removing node with two children");
                self.replace_child(parent, handle, Some(taller));
                self.graft(taller, shorter, graft_side);
            }
        }

        self.len -= 1;
        let node = self.nodes.take(handle);
        (node.key, node.value)
    }

    /// Points whatever referenced `old` (its parent's child slot, or the root)
    /// at `new`, and gives `new` the old node's parent.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent_node = &mut self.nodes[parent];
                let side = parent_node.side_of(old).expect("parent link does not mirror a child link");
                parent_node.set_child(side, new);
            }
        }
        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    /// Hangs `subtree` from the first empty `side` slot found by walking down
    /// from `host` along `side`.
    ///
    /// Every key in `subtree` lies beyond every key in `host`'s subtree in the
    /// `side` direction, so the outermost empty slot is the only ordered one.
    fn graft(&mut self, host: Handle, subtree: Handle, side: Side) {
        let mut attach = host;
        let mut depth = 0_usize;
        while let Some(next) = self.nodes[attach].child(side) {
            attach = next;
            depth += 1;
        }
        trace!(depth, "grafting subtree");
        self.nodes[attach].set_child(side, Some(subtree));
        self.nodes[subtree].parent = Some(attach);
    }
}

impl<K: Ord, V> RawBstMap<K, V> {
    /// Single-path descent to the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            let next = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            current = next?;
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|handle| &self.nodes[handle].value)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(&mut self.nodes[handle].value)
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = &self.nodes[self.search(key)?];
        Some((&node.key, &node.value))
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Inserts a pair, overwriting the value in place when the key exists.
    /// Returns the old value if the key was already present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let Some(mut current) = self.root else {
            self.root = Some(self.nodes.alloc(Node::new(key, value, None)));
            self.len = 1;
            trace!("attached root");
            return None;
        };

        loop {
            let node = &mut self.nodes[current];
            let side = match key.cmp(&node.key) {
                Ordering::Equal => return Some(core::mem::replace(&mut node.value, value)),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            match node.child(side) {
                Some(child) => current = child,
                None => {
                    let handle = self.nodes.alloc(Node::new(key, value, Some(current)));
                    self.nodes[current].set_child(side, Some(handle));
                    self.len += 1;
                    trace!(?side, "attached node");
                    return None;
                }
            }
        }
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.search(key)?;
        Some(self.remove_handle(handle))
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Checks ordering, link symmetry, and bookkeeping across the whole tree.
    pub(crate) fn validate(&self) -> Result<(), MapError> {
        if self.root.is_some_and(|root| self.nodes[root].parent.is_some()) {
            return Err(MapError::CorruptTree {
                detail: "root has a parent",
            });
        }

        let mut reachable = 0_usize;
        for handle in self.preorder() {
            reachable += 1;
            for child in self.nodes[handle].children() {
                if self.nodes[child].parent != Some(handle) {
                    return Err(MapError::CorruptTree {
                        detail: "child does not link back to its parent",
                    });
                }
            }
        }
        if reachable != self.len || self.nodes.len() != self.len {
            return Err(MapError::CorruptTree {
                detail: "node count disagrees with cached length",
            });
        }

        let mut previous: Option<&K> = None;
        for handle in self.inorder() {
            let key = &self.nodes[handle].key;
            if previous.is_some_and(|previous| previous >= key) {
                return Err(MapError::CorruptTree {
                    detail: "in-order keys are not strictly ascending",
                });
            }
            previous = Some(key);
        }
        Ok(())
    }
}

impl<K, V: PartialEq> RawBstMap<K, V> {
    /// Full traversal; values carry no ordering.
    pub(crate) fn contains_value(&self, value: &V) -> bool {
        self.preorder().any(|handle| self.nodes[handle].value == *value)
    }

    /// Removes every node holding `value`. Returns whether anything was removed.
    pub(crate) fn remove_by_value(&mut self, value: &V) -> bool {
        let matches: Vec<Handle> = self.preorder().filter(|&handle| self.nodes[handle].value == *value).collect();
        for &handle in &matches {
            self.remove_handle(handle);
        }
        !matches.is_empty()
    }

    /// Removes the first node in pre-order holding `value`.
    pub(crate) fn remove_first_value(&mut self, value: &V) -> bool {
        match self.preorder().find(|&handle| self.nodes[handle].value == *value) {
            Some(handle) => {
                self.remove_handle(handle);
                true
            }
            None => false,
        }
    }
}

/// Handles in root-left-right order.
pub(crate) struct Preorder<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    stack: Stack,
}

impl<K, V> Iterator for Preorder<'_, K, V> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let handle = self.stack.pop()?;
        let node = &self.nodes[handle];
        self.stack.extend(node.right);
        self.stack.extend(node.left);
        Some(handle)
    }
}

impl<K, V> FusedIterator for Preorder<'_, K, V> {}

/// Handles in ascending key order.
pub(crate) struct Inorder<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    stack: Stack,
    remaining: usize,
}

impl<K, V> Inorder<'_, K, V> {
    fn descend_left(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.nodes[handle].left;
        }
    }
}

impl<K, V> Iterator for Inorder<'_, K, V> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let handle = self.stack.pop()?;
        self.remaining -= 1;
        self.descend_left(self.nodes[handle].right);
        Some(handle)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Inorder<'_, K, V> {}

impl<K, V> FusedIterator for Inorder<'_, K, V> {}

impl<K, V> Clone for Inorder<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    fn tree<const N: usize>(keys: [&'static str; N]) -> RawBstMap<&'static str, usize> {
        let mut tree = RawBstMap::new();
        for (value, key) in keys.into_iter().enumerate() {
            assert_eq!(tree.insert(key, value), None);
        }
        tree.validate().unwrap();
        tree
    }

    fn keys(tree: &RawBstMap<&'static str, usize>) -> Vec<&'static str> {
        tree.inorder().map(|handle| tree.node(handle).key).collect()
    }

    fn preorder_keys(tree: &RawBstMap<&'static str, usize>) -> Vec<&'static str> {
        tree.preorder().map(|handle| tree.node(handle).key).collect()
    }

    fn root_key(tree: &RawBstMap<&'static str, usize>) -> Option<&'static str> {
        tree.root.map(|root| tree.node(root).key)
    }

    #[test]
    fn insert_descends_by_comparison() {
        let tree = tree(["b", "a", "c"]);
        assert_eq!(preorder_keys(&tree), ["b", "a", "c"]);
        assert_eq!(keys(&tree), ["a", "b", "c"]);
        assert_eq!(tree.get("a"), Some(&1));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.tree_height(), 2);
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut tree = tree(["m", "f"]);
        let handle = tree.search("f").unwrap();
        assert_eq!(tree.insert("f", 9), Some(1));
        assert_eq!(tree.search("f"), Some(handle));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_missing_key() {
        let mut tree = tree(["m", "f", "t"]);
        assert_eq!(tree.remove("x"), None);
        assert_eq!(tree.len(), 3);
        assert_eq!(RawBstMap::<&str, usize>::new().remove("x"), None);
    }

    #[test]
    fn remove_leaf() {
        let mut tree = tree(["m", "f", "t"]);
        assert_eq!(tree.remove("t"), Some(2));
        tree.validate().unwrap();
        assert_eq!(preorder_keys(&tree), ["m", "f"]);
        assert_eq!(tree.node(tree.search("m").unwrap()).right, None);
    }

    #[test]
    fn remove_only_node() {
        let mut tree = tree(["m"]);
        assert_eq!(tree.remove("m"), Some(0));
        tree.validate().unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn remove_one_child_splices_child_up() {
        // m -> f -> c (left chain under f)
        let mut tree = tree(["m", "f", "c", "a", "d"]);
        assert_eq!(tree.remove("f"), Some(1));
        tree.validate().unwrap();
        assert_eq!(preorder_keys(&tree), ["m", "c", "a", "d"]);
        let c = tree.search("c").unwrap();
        assert_eq!(tree.node(c).parent, tree.search("m"));
    }

    #[test]
    fn remove_root_with_one_child_promotes_it() {
        let mut tree = tree(["a", "b", "c"]);
        assert_eq!(tree.remove("a"), Some(0));
        tree.validate().unwrap();
        assert_eq!(root_key(&tree), Some("b"));
        assert_eq!(tree.node(tree.root.unwrap()).parent, None);
        assert_eq!(keys(&tree), ["b", "c"]);
    }

    #[test]
    fn remove_two_children_tie_promotes_left() {
        let mut tree = tree(["b", "a", "c"]);
        assert_eq!(tree.remove("b"), Some(0));
        tree.validate().unwrap();
        assert_eq!(root_key(&tree), Some("a"));
        assert_eq!(preorder_keys(&tree), ["a", "c"]);
        assert_eq!(tree.get("a"), Some(&1));
        assert_eq!(tree.get("c"), Some(&2));
    }

    #[test]
    fn remove_two_children_taller_right_is_promoted() {
        //      d
        //    b   h
        //       f  j
        //      e
        let mut tree = tree(["d", "b", "h", "f", "j", "e"]);
        assert_eq!(tree.remove("d"), Some(0));
        tree.validate().unwrap();
        assert_eq!(root_key(&tree), Some("h"));
        // `b` hangs from the leftmost slot of the promoted subtree.
        let b = tree.search("b").unwrap();
        assert_eq!(tree.node(b).parent, tree.search("e"));
        assert_eq!(keys(&tree), ["b", "e", "f", "h", "j"]);
    }

    #[test]
    fn remove_two_children_below_root() {
        //        m
        //      f
        //    c   h
        //   a   g  k
        let mut tree = tree(["m", "f", "c", "h", "a", "g", "k"]);
        assert_eq!(tree.remove("f"), Some(1));
        tree.validate().unwrap();
        let c = tree.search("c").unwrap();
        assert_eq!(tree.node(tree.root.unwrap()).left, Some(c));
        assert_eq!(tree.node(c).parent, tree.root);
        // Equal heights: `h` hangs from the rightmost slot of the promoted `c`.
        assert_eq!(tree.node(c).right, tree.search("h"));
        assert_eq!(keys(&tree), ["a", "c", "g", "h", "k", "m"]);
    }

    #[test]
    fn height_counts_levels() {
        assert_eq!(RawBstMap::<u8, u8>::new().tree_height(), 0);
        let tree = tree(["a", "b", "c", "d"]);
        assert_eq!(tree.tree_height(), 4);
        let b = tree.search("b");
        assert_eq!(tree.height(b), 3);
    }

    #[test]
    fn remove_by_value_takes_every_match() {
        let mut tree = RawBstMap::new();
        for (key, value) in [(5, Some('x')), (2, None), (8, Some('x')), (1, Some('y')), (9, None), (7, Some('x'))] {
            tree.insert(key, value);
        }
        assert!(tree.remove_by_value(&Some('x')));
        tree.validate().unwrap();
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains_value(&Some('x')));

        assert!(tree.remove_by_value(&None));
        tree.validate().unwrap();
        assert_eq!(tree.inorder().map(|h| tree.node(h).key).collect::<Vec<_>>(), vec![1]);
        assert!(!tree.remove_by_value(&Some('z')));
    }

    #[test]
    fn remove_first_value_follows_preorder() {
        let mut tree = RawBstMap::new();
        for key in [5, 2, 8] {
            tree.insert(key, 'v');
        }
        assert!(tree.remove_first_value(&'v'));
        tree.validate().unwrap();
        assert!(!tree.contains_key(&5));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn inorder_mut_yields_sorted_values() {
        let mut tree = tree(["q", "c", "x", "a"]);
        for (_, value) in tree.inorder_mut() {
            *value *= 10;
        }
        assert_eq!(tree.get("x"), Some(&20));
        let drained = tree.drain_to_vec();
        assert_eq!(drained, [("a", 30), ("c", 10), ("q", 0), ("x", 20)]);
        assert!(tree.is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn validate_reports_broken_parent_link() {
        let mut tree = tree(["b", "a"]);
        let a = tree.search("a").unwrap();
        tree.node_mut(a).parent = None;
        assert_eq!(
            tree.validate(),
            Err(MapError::CorruptTree {
                detail: "child does not link back to its parent"
            })
        );
    }

    #[test]
    fn validate_reports_unordered_keys() {
        let mut tree = tree(["b", "a"]);
        let a = tree.search("a").unwrap();
        tree.node_mut(a).key = "z";
        assert_eq!(
            tree.validate(),
            Err(MapError::CorruptTree {
                detail: "in-order keys are not strictly ascending"
            })
        );
    }
}
