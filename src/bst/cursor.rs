use crate::arena::Handle;
use crate::bst::tree::Tree;
use crate::entry::Entry;
use std::fmt;
use std::ptr;

/// A position in a map's in-order key sequence.
///
/// A cursor either rests on an entry or sits at the end position past the maximum key. Lookups
/// for absent keys and cursors stepped off either end all become the end position, and any two
/// end cursors of the same map compare equal.
///
/// # Examples
///
/// ```
/// use ordered_collections::avl_tree::AvlMap;
///
/// let mut map = AvlMap::new();
/// map.insert(1, 'a');
/// map.insert(2, 'b');
///
/// let mut cursor = map.find(&1);
/// assert_eq!(cursor.key(), Some(&1));
///
/// cursor.move_next();
/// assert_eq!(cursor.value(), Some(&'b'));
///
/// cursor.move_next();
/// assert!(cursor.is_end());
/// assert_eq!(cursor, map.find(&7));
/// ```
pub struct Cursor<'a, T, U> {
    pub(crate) tree: &'a Tree<T, U>,
    pub(crate) node: Option<Handle>,
}

impl<'a, T, U> Cursor<'a, T, U> {
    /// Returns the key-value pair under the cursor, or `None` at the end position.
    pub fn entry(&self) -> Option<(&'a T, &'a U)> {
        self.node.map(|handle| {
            let entry = &self.tree.node(handle).entry;
            (&entry.key, &entry.value)
        })
    }

    /// Returns the key under the cursor, or `None` at the end position.
    pub fn key(&self) -> Option<&'a T> {
        self.entry().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` at the end position.
    pub fn value(&self) -> Option<&'a U> {
        self.entry().map(|(_, value)| value)
    }

    /// Returns `true` at the end position.
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Advances to the in-order successor. Stepping past the maximum key reaches the end
    /// position, where further calls are no-ops.
    pub fn move_next(&mut self) {
        if let Some(handle) = self.node {
            self.node = self.tree.successor(handle);
        }
    }

    /// Steps back to the in-order predecessor. From the end position this rests on the maximum
    /// key, so walking backwards from the end visits the map in descending order.
    pub fn move_prev(&mut self) {
        self.node = match self.node {
            Some(handle) => self.tree.predecessor(handle),
            None => self.tree.max(),
        };
    }
}

impl<'a, T, U> Clone for Cursor<'a, T, U> {
    fn clone(&self) -> Self {
        Cursor {
            tree: self.tree,
            node: self.node,
        }
    }
}

impl<'a, T, U> Copy for Cursor<'a, T, U> {}

impl<'a, T, U> PartialEq for Cursor<'a, T, U> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<'a, T, U> Eq for Cursor<'a, T, U> {}

impl<'a, T, U> fmt::Debug for Cursor<'a, T, U>
where
    T: fmt::Debug,
    U: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.entry()).finish()
    }
}

/// An iterator for the map types.
///
/// Entries are yielded in-order by walking the parent links between neighbors; no traversal
/// stack is kept.
pub struct Iter<'a, T, U> {
    pub(crate) tree: &'a Tree<T, U>,
    pub(crate) front: Option<Handle>,
    pub(crate) back: Option<Handle>,
}

impl<'a, T, U> Iter<'a, T, U> {
    pub(crate) fn new(tree: &'a Tree<T, U>) -> Self {
        Iter {
            tree,
            front: tree.min(),
            back: tree.max(),
        }
    }
}

impl<'a, T, U> Iterator for Iter<'a, T, U> {
    type Item = (&'a T, &'a U);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.front?;
        if Some(handle) == self.back {
            self.front = None;
            self.back = None;
        } else {
            self.front = self.tree.successor(handle);
        }
        let entry = &self.tree.node(handle).entry;
        Some((&entry.key, &entry.value))
    }
}

impl<'a, T, U> DoubleEndedIterator for Iter<'a, T, U> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.back?;
        if Some(handle) == self.front {
            self.front = None;
            self.back = None;
        } else {
            self.back = self.tree.predecessor(handle);
        }
        let entry = &self.tree.node(handle).entry;
        Some((&entry.key, &entry.value))
    }
}

/// An owning iterator for the map types.
///
/// Each step detaches the minimum remaining node, so the walk consumes the tree in-order.
pub struct IntoIter<T, U> {
    pub(crate) tree: Tree<T, U>,
    pub(crate) next: Option<Handle>,
}

impl<T, U> IntoIter<T, U> {
    pub(crate) fn new(tree: Tree<T, U>) -> Self {
        let next = tree.min();
        IntoIter { tree, next }
    }
}

impl<T, U> Iterator for IntoIter<T, U> {
    type Item = (T, U);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        self.next = self.tree.successor(handle);
        let (entry, _) = self.tree.detach(handle);
        let Entry { key, value } = entry;
        Some((key, value))
    }
}

/// An iterator for the set types, yielding keys in ascending order.
pub struct SetIter<'a, T> {
    pub(crate) inner: Iter<'a, T, ()>,
}

impl<'a, T> Iterator for SetIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

impl<'a, T> DoubleEndedIterator for SetIter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

/// An owning iterator for the set types, yielding keys in ascending order.
pub struct SetIntoIter<T> {
    pub(crate) inner: IntoIter<T, ()>,
}

impl<T> Iterator for SetIntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}
