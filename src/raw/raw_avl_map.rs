use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::counters::Counters;
use super::handle::Handle;
use super::node::{Node, Side};

/// The core AVL tree backing `AvlMap`.
#[derive(Clone)]
pub(crate) struct RawAvlMap<K, V> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K, V>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Comparison and rotation instrumentation.
    counters: Counters,
}

/// One step of an insertion descent.
#[derive(Clone, Copy)]
struct PathElement {
    /// Node that was compared against.
    node: Handle,
    /// Child link the descent continued through.
    side: Side,
}

/// Descent path from the root. An AVL tree addressable by a `u32` handle is at
/// most 45 levels deep, so this never spills.
type Path = SmallVec<[PathElement; 64]>;

impl<K, V> RawAvlMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            counters: Counters::new(),
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            counters: Counters::new(),
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the capacity of the tree.
    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the root handle, if any.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Height of an optional subtree, with an absent subtree at -1.
    #[inline]
    pub(crate) fn height(&self, handle: Option<Handle>) -> i32 {
        handle.map_or(-1, |h| self.nodes.get(h).height())
    }

    /// `height(right) - height(left)` of the node at `handle`.
    #[inline]
    pub(crate) fn balance_factor(&self, handle: Handle) -> i32 {
        let node = self.nodes.get(handle);
        self.height(node.right()) - self.height(node.left())
    }

    /// Leftmost node of the tree. Performs no comparisons.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.spine(Side::Left)
    }

    /// Rightmost node of the tree. Performs no comparisons.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.spine(Side::Right)
    }

    fn spine(&self, side: Side) -> Option<Handle> {
        let mut current = self.root?;
        while let Some(next) = self.nodes.get(current).child(side) {
            current = next;
        }
        Some(current)
    }

    fn fix_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = self.height(node.left()).max(self.height(node.right())) + 1;
        self.nodes.get_mut(handle).set_height(height);
    }

    /// Rotates the subtree rooted at `q` to the left and returns the new subtree root.
    ///
    /// `q`'s right child `p` is lifted; `q` adopts `p`'s former left subtree as its
    /// right subtree and becomes `p`'s left child. `q`'s height is fixed before `p`'s
    /// because the latter depends on the former.
    fn rotate_left(&mut self, q: Handle) -> Handle {
        let p = self.nodes.get(q).right().expect("`RawAvlMap::rotate_left()` - node has no right child!");
        let inner = self.nodes.get(p).left();
        self.nodes.get_mut(q).set_child(Side::Right, inner);
        self.nodes.get_mut(p).set_child(Side::Left, Some(q));
        self.fix_height(q);
        self.fix_height(p);
        self.counters.count_rotation();
        p
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, p: Handle) -> Handle {
        let q = self.nodes.get(p).left().expect("`RawAvlMap::rotate_right()` - node has no left child!");
        let inner = self.nodes.get(q).right();
        self.nodes.get_mut(p).set_child(Side::Left, inner);
        self.nodes.get_mut(q).set_child(Side::Right, Some(p));
        self.fix_height(p);
        self.fix_height(q);
        self.counters.count_rotation();
        q
    }

    /// Restores height and balance at `handle`, returning the (possibly new) subtree root.
    fn balance(&mut self, handle: Handle) -> Handle {
        self.fix_height(handle);
        match self.balance_factor(handle) {
            2 => {
                if let Some(right) = self.nodes.get(handle).right() {
                    if self.balance_factor(right) < 0 {
                        let lifted = self.rotate_right(right);
                        self.nodes.get_mut(handle).set_child(Side::Right, Some(lifted));
                    }
                }
                self.rotate_left(handle)
            }
            -2 => {
                if let Some(left) = self.nodes.get(handle).left() {
                    if self.balance_factor(left) > 0 {
                        let lifted = self.rotate_left(left);
                        self.nodes.get_mut(handle).set_child(Side::Left, Some(lifted));
                    }
                }
                self.rotate_right(handle)
            }
            _ => handle,
        }
    }

    /// Rebalances every node on `path`, deepest first, relinking any subtree
    /// whose root changed into its parent (or the tree root).
    fn rebalance_path(&mut self, path: &[PathElement]) {
        for depth in (0..path.len()).rev() {
            let handle = path[depth].node;
            let subtree = self.balance(handle);
            if subtree == handle {
                continue;
            }
            match depth.checked_sub(1) {
                Some(parent) => {
                    let parent = path[parent];
                    self.nodes.get_mut(parent.node).set_child(parent.side, Some(subtree));
                }
                None => self.root = Some(subtree),
            }
        }
    }
}

impl<K: Ord, V> RawAvlMap<K, V> {
    /// Searches for a key, counting one search comparison per visited node.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            self.counters.count_search_comparison();
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key().borrow()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts a key-value pair unless an equal key is already present.
    ///
    /// Returns `true` if a node was created. An existing entry is never
    /// overwritten: the first value stored for a key wins.
    pub(crate) fn insert(&mut self, key: K, value: V) -> bool {
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(key, value)));
            return true;
        };

        let mut path: Path = SmallVec::new();
        let mut current = root;

        let side = loop {
            self.counters.count_insert_comparison();
            let node = self.nodes.get(current);
            let side = match key.cmp(node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return false,
            };
            path.push(PathElement { node: current, side });
            match node.child(side) {
                Some(child) => current = child,
                None => break side,
            }
        };

        let leaf = self.nodes.alloc(Node::leaf(key, value));
        self.nodes.get_mut(current).set_child(side, Some(leaf));
        self.rebalance_path(&path);
        true
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    /// Renders the tree as `(left key right)` with heights, e.g. `((1)2(3))`.
    fn shape(tree: &RawAvlMap<i32, ()>) -> alloc::string::String {
        fn walk(tree: &RawAvlMap<i32, ()>, handle: Option<Handle>, out: &mut alloc::string::String) {
            use core::fmt::Write;
            if let Some(handle) = handle {
                let node = tree.node(handle);
                out.push('(');
                walk(tree, node.left(), out);
                write!(out, "{}:{}", node.key(), node.height()).unwrap();
                walk(tree, node.right(), out);
                out.push(')');
            }
        }
        let mut out = alloc::string::String::new();
        walk(tree, tree.root(), &mut out);
        out
    }

    fn build(keys: &[i32]) -> RawAvlMap<i32, ()> {
        let mut tree = RawAvlMap::new();
        for &key in keys {
            tree.insert(key, ());
        }
        tree
    }

    #[test]
    fn empty_insert_makes_root_without_comparisons() {
        let mut tree = RawAvlMap::new();
        assert!(tree.insert(1, ()));
        assert_eq!(tree.counters().insert_comparisons(), 0);
        assert_eq!(shape(&tree), "(1:0)");
    }

    #[test]
    fn empty_search_makes_no_comparisons() {
        let tree: RawAvlMap<i32, ()> = RawAvlMap::new();
        assert_eq!(tree.search(&1), None);
        assert_eq!(tree.counters().search_comparisons(), 0);
    }

    #[test]
    fn right_right_case_rotates_left_once() {
        let mut tree = build(&[1, 2]);
        tree.counters().reset();
        tree.insert(3, ());
        assert_eq!(shape(&tree), "((1:0)2:1(3:0))");
        assert_eq!(tree.counters().rotations(), 1);
    }

    #[test]
    fn left_left_case_rotates_right_once() {
        let mut tree = build(&[3, 2]);
        tree.counters().reset();
        tree.insert(1, ());
        assert_eq!(shape(&tree), "((1:0)2:1(3:0))");
        assert_eq!(tree.counters().rotations(), 1);
    }

    #[test]
    fn left_right_case_rotates_twice() {
        let mut tree = build(&[3, 1]);
        tree.counters().reset();
        tree.insert(2, ());
        assert_eq!(shape(&tree), "((1:0)2:1(3:0))");
        assert_eq!(tree.counters().rotations(), 2);
    }

    #[test]
    fn right_left_case_rotates_twice() {
        let mut tree = build(&[1, 3]);
        tree.counters().reset();
        tree.insert(2, ());
        assert_eq!(shape(&tree), "((1:0)2:1(3:0))");
        assert_eq!(tree.counters().rotations(), 2);
    }

    #[test]
    fn rotation_below_root_relinks_parent() {
        let mut tree = build(&[5, 3, 8, 1, 4, 7, 9, 10]);
        tree.counters().reset();
        tree.insert(11, ());
        assert_eq!(
            shape(&tree),
            "(((1:0)3:1(4:0))5:3((7:0)8:2((9:0)10:1(11:0))))"
        );
        assert_eq!(tree.counters().rotations(), 1);
    }

    #[test]
    fn rotations_do_not_count_comparisons() {
        let mut tree = build(&[1, 2]);
        tree.counters().reset();
        tree.insert(3, ());
        // 3 is compared against 1 and 2 only.
        assert_eq!(tree.counters().insert_comparisons(), 2);
        assert_eq!(tree.counters().search_comparisons(), 0);
    }

    #[test]
    fn rotate_left_then_right_restores_shape() {
        let mut tree = build(&[2, 1, 4, 3, 5]);
        let before = shape(&tree);
        let root = tree.root().unwrap();
        let lifted = tree.rotate_left(root);
        tree.root = Some(lifted);
        assert_eq!(shape(&tree), "(((1:0)2:1(3:0))4:2(5:0))");
        let restored = tree.rotate_right(lifted);
        tree.root = Some(restored);
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn duplicate_is_dropped_after_one_comparison() {
        let mut tree = RawAvlMap::new();
        tree.insert(1, "first");
        tree.counters().reset();
        assert!(!tree.insert(1, "second"));
        assert_eq!(tree.counters().insert_comparisons(), 1);
        assert_eq!(tree.len(), 1);
        let handle = tree.search(&1).unwrap();
        assert_eq!(*tree.node(handle).value(), "first");
    }

    #[test]
    fn descent_path_fits_inline_capacity() {
        let keys: Vec<i32> = (0..40_000).collect();
        let tree = build(&keys);
        let height = usize::try_from(tree.height(tree.root())).unwrap();
        // Every insert pushes at most one element per level.
        assert!(height < Path::new().inline_size());
    }

    #[test]
    fn first_and_last_follow_the_spines() {
        let keys: Vec<i32> = (0..100).rev().collect();
        let tree = build(&keys);
        assert_eq!(tree.first().map(|h| *tree.node(h).key()), Some(0));
        assert_eq!(tree.last().map(|h| *tree.node(h).key()), Some(99));
        assert_eq!(tree.counters().search_comparisons(), 0);
    }
}
