use crate::arena::Handle;
use crate::bst::node::Side;
use crate::bst::tree::{Attach, Tree};
use crate::entry::Entry;
use std::borrow::Borrow;

/// Balance contribution of a subtree hanging on `side`: balance factors are height(right) minus
/// height(left), so growth on the left drives a node negative.
fn lean(side: Side) -> i8 {
    match side {
        Side::Left => -1,
        Side::Right => 1,
    }
}

fn rotate_toward<T, U>(tree: &mut Tree<T, U>, node: Handle, direction: Side) {
    match direction {
        Side::Left => tree.rotate_left(node),
        Side::Right => tree.rotate_right(node),
    }
}

/// Inserts a key-value pair, then repairs the balance factors along the search path. Returns the
/// replaced entry when the key was already present (no shape change, nothing to repair).
pub(crate) fn insert<T, U>(tree: &mut Tree<T, U>, key: T, value: U) -> Option<Entry<T, U>>
where
    T: Ord,
{
    let leaf = match tree.attach(key, value) {
        Attach::Replaced(entry) => return Some(entry),
        Attach::Inserted(leaf) => leaf,
    };
    let parent = match tree.node(leaf).parent {
        Some(parent) => parent,
        None => return None,
    };

    if tree.node(parent).balance != 0 {
        // The parent had exactly one child and just gained its other: it evens out and its
        // subtree height is unchanged, so nothing above can tell.
        tree.node_mut(parent).balance = 0;
        return None;
    }
    let side = tree.side_of(leaf, parent);
    tree.node_mut(parent).balance = lean(side);
    propagate_growth(tree, parent);
    None
}

/// Climbs from `child`, whose subtree just grew one level, adjusting ancestor balance factors
/// until the growth is absorbed or rotated away.
fn propagate_growth<T, U>(tree: &mut Tree<T, U>, mut child: Handle) {
    while let Some(parent) = tree.node(child).parent {
        let side = tree.side_of(child, parent);
        let balance = tree.node(parent).balance;
        if balance == 0 {
            tree.node_mut(parent).balance = lean(side);
            child = parent;
        } else if balance == lean(side.opposite()) {
            tree.node_mut(parent).balance = 0;
            return;
        } else {
            // Already leaning toward the grown side: a rotation restores the pre-insert height,
            // so the climb ends here.
            rebalance(tree, parent, side);
            return;
        }
    }
}

/// Removes a key and repairs the balance factors along the former search path. Returns the
/// removed entry; an absent key is a no-op.
pub(crate) fn remove<T, U, V>(tree: &mut Tree<T, U>, key: &V) -> Option<Entry<T, U>>
where
    T: Borrow<V>,
    V: Ord + ?Sized,
{
    let handle = tree.find(key)?;
    let (entry, spliced_from) = tree.detach(handle);
    if let Some((parent, side)) = spliced_from {
        propagate_shrink(tree, parent, side);
    }
    Some(entry)
}

/// Climbs from `node`, whose `side` subtree just shrank one level, adjusting balance factors and
/// rotating until the shrink stops being visible from above.
fn propagate_shrink<T, U>(tree: &mut Tree<T, U>, node: Handle, side: Side) {
    let mut current = Some((node, side));
    while let Some((node, side)) = current {
        // The next hop has to be captured before a rotation relocates `node`.
        current = tree
            .node(node)
            .parent
            .map(|parent| (parent, tree.side_of(node, parent)));

        let balance = tree.node(node).balance;
        if balance == 0 {
            // The sibling side is now the taller one; the height seen from above is unchanged.
            tree.node_mut(node).balance = lean(side.opposite());
            return;
        } else if balance == lean(side) {
            // Was leaning toward the removed side: now even, and one level shorter.
            tree.node_mut(node).balance = 0;
        } else {
            // Leaning two levels away from the removed side once the shrink is counted; keep
            // climbing only if the rotation shortened this subtree.
            if !rebalance(tree, node, side.opposite()) {
                return;
            }
        }
    }
}

/// Restores the AVL shape at `node`, whose `side` subtree is two levels taller than its sibling.
/// The rotated nodes' balance factors are assigned from the standard case tables rather than
/// patched incrementally. Returns `true` when the rebalanced subtree came out one level shorter
/// than `node`'s subtree was before.
fn rebalance<T, U>(tree: &mut Tree<T, U>, node: Handle, side: Side) -> bool {
    let child = tree
        .node(node)
        .child(side)
        .expect("Error: imbalance without a taller child.");
    let child_balance = tree.node(child).balance;

    if child_balance == lean(side.opposite()) {
        // The taller child leans away from the node's own lean: double rotation, with the final
        // balances keyed on the grandchild that ends up on top.
        let grandchild = tree
            .node(child)
            .child(side.opposite())
            .expect("Error: zig-zag without a grandchild.");
        let grandchild_balance = tree.node(grandchild).balance;
        rotate_toward(tree, child, side);
        rotate_toward(tree, node, side.opposite());

        let (node_balance, child_balance) = if grandchild_balance == lean(side) {
            (lean(side.opposite()), 0)
        } else if grandchild_balance == 0 {
            (0, 0)
        } else {
            (0, lean(side))
        };
        tree.node_mut(node).balance = node_balance;
        tree.node_mut(child).balance = child_balance;
        tree.node_mut(grandchild).balance = 0;
        true
    } else if child_balance == 0 {
        // Only reachable when a removal shortened the sibling. The single rotation shuffles the
        // surplus level across without shortening the subtree, so the climb above can stop.
        rotate_toward(tree, node, side.opposite());
        tree.node_mut(node).balance = lean(side);
        tree.node_mut(child).balance = lean(side.opposite());
        false
    } else {
        // Child leans the same way: the single rotation evens out both nodes.
        rotate_toward(tree, node, side.opposite());
        tree.node_mut(node).balance = 0;
        tree.node_mut(child).balance = 0;
        true
    }
}
