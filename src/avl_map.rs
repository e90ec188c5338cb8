use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::raw::{Handle, Node, RawAvlMap};

/// An ordered map based on an [AVL tree], instrumented with comparison counters.
///
/// Given a key type with a [total order], the map stores its entries in key order
/// and keeps every node's subtrees within one level of each other, so lookups and
/// insertions take O(log n) comparisons in the worst case.
///
/// Unlike [`BTreeMap`](std::collections::BTreeMap), inserting a key that is
/// already present does **not** replace the stored value: the first write wins
/// and later duplicates are dropped. There is no removal.
///
/// Every key comparison made while inserting or looking up is counted. The two
/// categories are tracked separately and can be read with
/// [`comparisons`](AvlMap::comparisons) and zeroed with
/// [`reset_counters`](AvlMap::reset_counters), which makes it possible to measure
/// the cost of a single operation.
///
/// # Examples
///
/// ```
/// use avl_index::AvlMap;
///
/// let mut map = AvlMap::new();
/// map.insert("dog", "animal");
/// map.insert("oak", "tree");
///
/// // the first write wins
/// map.insert("dog", "pet");
/// assert_eq!(map.lookup("dog"), Some(&"animal"));
///
/// map.reset_counters();
/// assert_eq!(map.lookup("cat"), None);
/// assert_eq!(map.search_comparisons(), 1);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
/// [total order]: https://en.wikipedia.org/wiki/Total_order
pub struct AvlMap<K, V> {
    raw: RawAvlMap<K, V>,
}

/// Snapshot of an [`AvlMap`]'s comparison counters.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Comparisons {
    /// Key comparisons made by [`AvlMap::insert`].
    pub insert: u64,
    /// Key comparisons made by [`AvlMap::lookup`] and the other searching methods.
    pub search: u64,
}

impl fmt::Display for Comparisons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "insert comparisons: {}, search comparisons: {}", self.insert, self.search)
    }
}

/// A read-only view of one node of an [`AvlMap`].
///
/// Obtained from [`AvlMap::root`]; used to inspect the shape of the tree.
/// Walking the tree through `NodeRef`s performs no comparisons.
///
/// # Examples
///
/// ```
/// use avl_index::AvlMap;
///
/// let map = AvlMap::from([(1, ()), (2, ()), (3, ())]);
/// let root = map.root().unwrap();
/// assert_eq!(*root.key(), 2);
/// assert_eq!(root.height(), 1);
/// assert_eq!(root.left().map(|n| *n.key()), Some(1));
/// assert_eq!(root.right().map(|n| *n.key()), Some(3));
/// ```
pub struct NodeRef<'a, K, V> {
    tree: &'a RawAvlMap<K, V>,
    handle: Handle,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    fn new(tree: &'a RawAvlMap<K, V>, handle: Handle) -> Self {
        Self { tree, handle }
    }

    fn node(&self) -> &'a Node<K, V> {
        self.tree.node(self.handle)
    }

    /// Returns the node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        self.node().key()
    }

    /// Returns the node's value.
    #[must_use]
    pub fn value(&self) -> &'a V {
        self.node().value()
    }

    /// Returns the height of the subtree rooted at this node. A leaf has height 0.
    #[must_use]
    pub fn height(&self) -> usize {
        self.node().height().unsigned_abs() as usize
    }

    /// Returns `height(right) - height(left)`, counting an absent child as -1.
    #[must_use]
    pub fn balance_factor(&self) -> i32 {
        self.tree.balance_factor(self.handle)
    }

    /// Returns the left child, if any.
    #[must_use]
    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.node().left().map(|h| NodeRef::new(self.tree, h))
    }

    /// Returns the right child, if any.
    #[must_use]
    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.node().right().map(|h| NodeRef::new(self.tree, h))
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}

/// An in-order iterator over the entries of an `AvlMap`.
///
/// This `struct` is created by the [`iter`] method on [`AvlMap`]. See its
/// documentation for more.
///
/// [`iter`]: AvlMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawAvlMap<K, V>,
    // Nodes whose left subtree has been (or is being) visited, innermost last.
    stack: SmallVec<[Handle; 64]>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a RawAvlMap<K, V>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        iter.descend_left(tree.root());
        iter
    }

    fn descend_left(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.tree.node(handle).left();
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        let node = self.tree.node(handle);
        self.descend_left(node.right());
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

/// An iterator over the keys of an `AvlMap`, in order.
///
/// This `struct` is created by the [`keys`](AvlMap::keys) method on [`AvlMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K: 'a, V: 'a> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// An iterator over the values of an `AvlMap`, in key order.
///
/// This `struct` is created by the [`values`](AvlMap::values) method on [`AvlMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K: 'a, V: 'a> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> AvlMap<K, V> {
    /// Makes a new, empty `AvlMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    ///
    /// // entries can now be inserted into the empty map
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> AvlMap<K, V> {
        AvlMap { raw: RawAvlMap::new() }
    }

    /// Makes a new, empty `AvlMap` with room for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> AvlMap<K, V> {
        AvlMap {
            raw: RawAvlMap::with_capacity(capacity),
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut a = AvlMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// a.insert(1, "b");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree, or `None` if the map is empty.
    ///
    /// A map holding a single entry has height 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.height(), None);
    /// for i in 0..7 {
    ///     map.insert(i, ());
    /// }
    /// assert_eq!(map.height(), Some(2));
    /// ```
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.root().map(|root| root.height())
    }

    /// Returns a view of the root node, or `None` if the map is empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        self.raw.root().map(|h| NodeRef::new(&self.raw, h))
    }

    /// Returns the first key-value pair in the map. The key in this pair is the
    /// minimum key in the map.
    ///
    /// Walks the left spine and performs no comparisons.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|h| {
            let node = self.raw.node(h);
            (node.key(), node.value())
        })
    }

    /// Returns the last key-value pair in the map. The key in this pair is the
    /// maximum key in the map.
    ///
    /// Walks the right spine and performs no comparisons.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|h| {
            let node = self.raw.node(h);
            (node.key(), node.value())
        })
    }

    /// Returns the current comparison counters.
    #[must_use]
    pub fn comparisons(&self) -> Comparisons {
        Comparisons {
            insert: self.insert_comparisons(),
            search: self.search_comparisons(),
        }
    }

    /// Returns the number of key comparisons made by insertions since the last reset.
    #[must_use]
    pub fn insert_comparisons(&self) -> u64 {
        self.raw.counters().insert_comparisons()
    }

    /// Returns the number of key comparisons made by lookups since the last reset.
    #[must_use]
    pub fn search_comparisons(&self) -> u64 {
        self.raw.counters().search_comparisons()
    }

    /// Returns the number of single rotations performed since the last reset.
    ///
    /// A double rotation counts as two.
    #[must_use]
    pub fn rotations(&self) -> u64 {
        self.raw.counters().rotations()
    }

    /// Zeroes every counter.
    ///
    /// Call this immediately before an operation to read off that operation's
    /// cost afterwards.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut map: AvlMap<i32, ()> = [5, 3, 8].into_iter().map(|k| (k, ())).collect();
    /// map.reset_counters();
    /// map.insert(9, ());
    /// assert_eq!(map.insert_comparisons(), 2);
    /// ```
    pub fn reset_counters(&self) {
        self.raw.counters().reset();
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// Iteration performs no comparisons.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let map = AvlMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let pairs: Vec<_> = map.iter().collect();
    /// assert_eq!(pairs, [(&1, &"a"), (&2, &"b"), (&3, &"c")]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Inserts a key-value pair into the map unless the key is already present.
    ///
    /// Returns `true` if the pair was inserted. If the map already holds an equal
    /// key, nothing is changed and `false` is returned: the stored key and value
    /// are kept.
    ///
    /// Each comparison against an existing node adds one to the insert counter,
    /// including the comparison that finds an equal key. Inserting into an empty
    /// map makes no comparisons.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.lookup(&37), Some(&"a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.raw.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// Each node visited adds one to the search counter. The tree itself is not
    /// modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_index::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(String::from("dog"), 0.9);
    /// assert_eq!(map.lookup("dog"), Some(&0.9));
    /// assert_eq!(map.lookup("cat"), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|h| self.raw.node(h).value())
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// Counted as a search.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|h| {
            let node = self.raw.node(h);
            (node.key(), node.value())
        })
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// Counted as a search.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }
}

impl<K: Clone, V: Clone> Clone for AvlMap<K, V> {
    fn clone(&self) -> Self {
        AvlMap { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        AvlMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    /// Converts a `[(K, V); N]` into an `AvlMap<K, V>`, keeping the first value
    /// of any duplicated key.
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn iteration_does_not_touch_counters() {
        let map: AvlMap<i32, i32> = (0..50).map(|k| (k, k)).collect();
        map.reset_counters();
        let keys: Vec<i32> = map.keys().copied().collect();
        let sum: i32 = map.values().sum();
        assert_eq!(keys, (0..50).collect::<Vec<_>>());
        assert_eq!(sum, (0..50).sum::<i32>());
        assert_eq!(map.comparisons(), Comparisons::default());
    }

    #[test]
    fn iter_reports_exact_len() {
        let map: AvlMap<i32, ()> = (0..10).map(|k| (k, ())).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.len(), 9);
        assert_eq!(iter.count(), 9);
    }

    #[test]
    fn iter_stack_stays_inline_for_deep_trees() {
        let map: AvlMap<u32, ()> = (0..40_000).map(|k| (k, ())).collect();
        let mut iter = map.iter();
        let mut visited = 0;
        while iter.next().is_some() {
            assert!(!iter.stack.spilled());
            visited += 1;
        }
        assert_eq!(visited, 40_000);
    }

    #[test]
    fn debug_lists_entries_in_order() {
        let map = AvlMap::from([(2, 'b'), (1, 'a')]);
        assert_eq!(alloc::format!("{map:?}"), "{1: 'a', 2: 'b'}");
    }

    #[test]
    fn comparisons_display() {
        let c = Comparisons { insert: 3, search: 4 };
        assert_eq!(alloc::format!("{c}"), "insert comparisons: 3, search comparisons: 4");
    }
}
