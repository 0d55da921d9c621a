use crate::arena::{Arena, Handle};
use crate::bst::node::{Node, Side};
use crate::entry::Entry;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

/// Outcome of attaching a key-value pair at its search position.
pub(crate) enum Attach<T, U> {
    /// The key was already present; the previous entry is handed back.
    Replaced(Entry<T, U>),
    /// A fresh leaf was linked in.
    Inserted(Handle),
}

/// The link-level core shared by the map types: an unbalanced binary search tree over
/// arena-allocated nodes.
///
/// This layer maintains the search order and the parent/left/right links but never rebalances on
/// its own; the AVL layer drives the rotation primitives and the balance factors.
pub(crate) struct Tree<T, U> {
    pub arena: Arena<Node<T, U>>,
    pub root: Option<Handle>,
}

impl<T, U> Tree<T, U> {
    pub fn new() -> Self {
        Tree {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn node(&self, handle: Handle) -> &Node<T, U> {
        &self.arena[handle]
    }

    pub fn node_mut(&mut self, handle: Handle) -> &mut Node<T, U> {
        &mut self.arena[handle]
    }

    /// The side of `parent` that `child` hangs from.
    pub fn side_of(&self, child: Handle, parent: Handle) -> Side {
        if self.node(parent).left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn find<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Handle of the greatest key not exceeding `key`.
    pub fn floor<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut candidate = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => {
                    candidate = Some(handle);
                    node.right
                }
                Ordering::Equal => return Some(handle),
            };
        }
        candidate
    }

    /// Handle of the smallest key not less than `key`.
    pub fn ceil<V>(&self, key: &V) -> Option<Handle>
    where
        T: Borrow<V>,
        V: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut candidate = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.entry.key.borrow()) {
                Ordering::Less => {
                    candidate = Some(handle);
                    node.left
                }
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        candidate
    }

    pub fn min(&self) -> Option<Handle> {
        self.extremum(self.root, Side::Left)
    }

    pub fn max(&self) -> Option<Handle> {
        self.extremum(self.root, Side::Right)
    }

    /// Walks from `start` to the last node on `side`.
    fn extremum(&self, start: Option<Handle>, side: Side) -> Option<Handle> {
        let mut current = start?;
        while let Some(next) = self.node(current).child(side) {
            current = next;
        }
        Some(current)
    }

    /// In-order successor: the leftmost node of the right subtree when there is one, otherwise
    /// the first ancestor reached by ascending out of a left-child link.
    pub fn successor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Right)
    }

    /// In-order predecessor; the mirror of [`successor`](Tree::successor).
    pub fn predecessor(&self, handle: Handle) -> Option<Handle> {
        self.neighbor(handle, Side::Left)
    }

    fn neighbor(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.node(handle).child(side) {
            return self.extremum(Some(child), side.opposite());
        }
        let mut current = handle;
        while let Some(parent) = self.node(current).parent {
            if self.side_of(current, parent) != side {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Attaches a key-value pair at its search position: equal keys overwrite the entry in place
    /// with no structural change, otherwise a fresh leaf is linked under the located parent.
    pub fn attach(&mut self, key: T, value: U) -> Attach<T, U>
    where
        T: Ord,
    {
        let mut parent = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.allocate(Node::new(key, value, None));
                self.root = Some(root);
                return Attach::Inserted(root);
            }
        };

        loop {
            let side = match key.cmp(&self.node(parent).entry.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => {
                    let entry = Entry { key, value };
                    let old = mem::replace(&mut self.node_mut(parent).entry, entry);
                    return Attach::Replaced(old);
                }
            };
            match self.node(parent).child(side) {
                Some(child) => parent = child,
                None => {
                    let leaf = self.arena.allocate(Node::new(key, value, Some(parent)));
                    self.node_mut(parent).set_child(side, Some(leaf));
                    return Attach::Inserted(leaf);
                }
            }
        }
    }

    /// Unlinks a node and frees it. A node with two children is first structurally swapped with
    /// its in-order predecessor (balance factors travel with the structural position), so the
    /// spliced node has at most one child, which is promoted into its place.
    ///
    /// Returns the removed entry together with the former parent and the side the node was
    /// spliced from, which is the height-change signal the AVL fix-up needs.
    pub fn detach(&mut self, handle: Handle) -> (Entry<T, U>, Option<(Handle, Side)>) {
        if self.node(handle).left.is_some() && self.node(handle).right.is_some() {
            let predecessor = self
                .predecessor(handle)
                .expect("Error: node with two children has no predecessor.");
            self.swap_nodes(handle, predecessor);
            let balance = self.node(handle).balance;
            let predecessor_balance = self.node(predecessor).balance;
            self.node_mut(handle).balance = predecessor_balance;
            self.node_mut(predecessor).balance = balance;
        }

        let spliced_from = match self.node(handle).parent {
            Some(parent) => Some((parent, self.side_of(handle, parent))),
            None => None,
        };
        let child = self.node(handle).left.or(self.node(handle).right);
        if let Some(child) = child {
            self.node_mut(child).parent = spliced_from.map(|(parent, _)| parent);
        }
        match spliced_from {
            Some((parent, side)) => self.node_mut(parent).set_child(side, child),
            None => self.root = child,
        }

        let node = self.arena.free(handle);
        (node.entry, spliced_from)
    }

    /// Exchanges the structural positions of two nodes while leaving their identities (handles
    /// and entries) untouched, so cursors held elsewhere keep pointing at the same entries.
    /// The directly linked parent/child arrangement is handled as well.
    pub fn swap_nodes(&mut self, n1: Handle, n2: Handle) {
        if n1 == n2 {
            return;
        }

        let (p1, l1, r1) = {
            let node = self.node(n1);
            (node.parent, node.left, node.right)
        };
        let side1 = p1.map(|parent| self.side_of(n1, parent));
        let (p2, l2, r2) = {
            let node = self.node(n2);
            (node.parent, node.left, node.right)
        };
        let side2 = p2.map(|parent| self.side_of(n2, parent));

        {
            let node = self.node_mut(n1);
            node.parent = p2;
            node.left = l2;
            node.right = r2;
        }
        {
            let node = self.node_mut(n2);
            node.parent = p1;
            node.left = l1;
            node.right = r1;
        }

        // The wholesale exchange leaves a node linked to itself when the two were adjacent.
        if r1 == Some(n2) {
            self.node_mut(n2).right = Some(n1);
            self.node_mut(n1).parent = Some(n2);
        } else if r2 == Some(n1) {
            self.node_mut(n1).right = Some(n2);
            self.node_mut(n2).parent = Some(n1);
        } else if l1 == Some(n2) {
            self.node_mut(n2).left = Some(n1);
            self.node_mut(n1).parent = Some(n2);
        } else if l2 == Some(n1) {
            self.node_mut(n1).left = Some(n2);
            self.node_mut(n2).parent = Some(n1);
        }

        if let (Some(parent), Some(side)) = (p1, side1) {
            if parent != n2 {
                self.node_mut(parent).set_child(side, Some(n2));
            }
        }
        if let Some(left) = l1 {
            if left != n2 {
                self.node_mut(left).parent = Some(n2);
            }
        }
        if let Some(right) = r1 {
            if right != n2 {
                self.node_mut(right).parent = Some(n2);
            }
        }
        if let (Some(parent), Some(side)) = (p2, side2) {
            if parent != n1 {
                self.node_mut(parent).set_child(side, Some(n1));
            }
        }
        if let Some(left) = l2 {
            if left != n1 {
                self.node_mut(left).parent = Some(n1);
            }
        }
        if let Some(right) = r2 {
            if right != n1 {
                self.node_mut(right).parent = Some(n1);
            }
        }

        if self.root == Some(n1) {
            self.root = Some(n2);
        } else if self.root == Some(n2) {
            self.root = Some(n1);
        }
    }

    /// Left rotation about `node`: the right child is promoted into its place and the child's
    /// displaced left subtree is reattached under `node`. Pure link surgery; the caller assigns
    /// the affected balance factors.
    pub fn rotate_left(&mut self, node: Handle) {
        self.rotate(node, Side::Left)
    }

    /// Mirror of [`rotate_left`](Tree::rotate_left).
    pub fn rotate_right(&mut self, node: Handle) {
        self.rotate(node, Side::Right)
    }

    fn rotate(&mut self, node: Handle, direction: Side) {
        let up = direction.opposite();
        let child = self
            .node(node)
            .child(up)
            .expect("Error: rotation with no child to promote.");
        let grandchild = self.node(child).child(direction);
        let parent = self.node(node).parent;

        self.node_mut(node).set_child(up, grandchild);
        if let Some(grandchild) = grandchild {
            self.node_mut(grandchild).parent = Some(node);
        }

        self.node_mut(child).parent = parent;
        match parent {
            Some(parent) => {
                let side = self.side_of(node, parent);
                self.node_mut(parent).set_child(side, Some(child));
            }
            None => self.root = Some(child),
        }

        self.node_mut(child).set_child(direction, Some(node));
        self.node_mut(node).parent = Some(child);
    }

    /// Frees every node and resets to empty. The arena owns all of them, so there is no
    /// child-before-parent ordering to respect.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Diagnostic: recomputed subtree heights differ by at most one at every node. O(n).
    pub fn is_balanced(&self) -> bool {
        self.balanced_height(self.root).is_some()
    }

    /// Height of the subtree when it is height-balanced everywhere, `None` otherwise.
    fn balanced_height(&self, tree: Option<Handle>) -> Option<usize> {
        let handle = match tree {
            Some(handle) => handle,
            None => return Some(0),
        };
        let left = self.balanced_height(self.node(handle).left)?;
        let right = self.balanced_height(self.node(handle).right)?;
        if left.max(right) - left.min(right) > 1 {
            return None;
        }
        Some(left.max(right) + 1)
    }

    /// Recomputed height of the whole tree; test diagnostics only.
    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.height_below(self.root)
    }

    #[cfg(test)]
    fn height_below(&self, tree: Option<Handle>) -> usize {
        match tree {
            None => 0,
            Some(handle) => {
                let left = self.height_below(self.node(handle).left);
                let right = self.height_below(self.node(handle).right);
                left.max(right) + 1
            }
        }
    }

    /// Every stored balance factor agrees with the recomputed height difference; test
    /// diagnostics only.
    #[cfg(test)]
    pub fn balance_factors_consistent(&self) -> bool {
        self.checked_height(self.root).is_some()
    }

    #[cfg(test)]
    fn checked_height(&self, tree: Option<Handle>) -> Option<i64> {
        let handle = match tree {
            Some(handle) => handle,
            None => return Some(0),
        };
        let left = self.checked_height(self.node(handle).left)?;
        let right = self.checked_height(self.node(handle).right)?;
        if i64::from(self.node(handle).balance) != right - left {
            return None;
        }
        Some(left.max(right) + 1)
    }
}
