//! Standalone check that every leaf of a plain binary tree lies within one level of the others.
//!
//! This works on bare `left`/`right` nodes and shares nothing with the map types.

/// A node of a plain binary tree.
#[derive(Debug)]
pub struct TreeNode<T> {
    pub key: T,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    /// Constructs a node with no children.
    pub fn new(key: T) -> Self {
        TreeNode {
            key,
            left: None,
            right: None,
        }
    }
}

/// Checks that the depths of all leaves in the tree differ by at most one. An empty tree holds
/// trivially.
///
/// # Examples
///
/// ```
/// use ordered_collections::leaf_depth::{leaves_within_one_level, TreeNode};
///
/// let mut root = TreeNode::new(4);
/// root.left = Some(Box::new(TreeNode::new(2)));
/// root.right = Some(Box::new(TreeNode::new(5)));
/// root.left.as_mut().unwrap().left = Some(Box::new(TreeNode::new(1)));
/// // Leaves 1 and 5 sit one level apart.
/// assert!(leaves_within_one_level(Some(&root)));
///
/// let deep = &mut root.left.as_mut().unwrap().left;
/// deep.as_mut().unwrap().left = Some(Box::new(TreeNode::new(0)));
/// // Leaf 0 is now two levels below leaf 5.
/// assert!(!leaves_within_one_level(Some(&root)));
/// ```
pub fn leaves_within_one_level<T>(root: Option<&TreeNode<T>>) -> bool {
    match leaf_depth_range(root) {
        Some((shallowest, deepest)) => deepest - shallowest <= 1,
        None => true,
    }
}

/// Shallowest and deepest leaf depths below `node`, or `None` for an empty subtree.
fn leaf_depth_range<T>(node: Option<&TreeNode<T>>) -> Option<(usize, usize)> {
    let node = node?;
    let left = leaf_depth_range(node.left.as_deref());
    let right = leaf_depth_range(node.right.as_deref());
    match (left, right) {
        (None, None) => Some((0, 0)),
        (Some((shallowest, deepest)), None) | (None, Some((shallowest, deepest))) => {
            Some((shallowest + 1, deepest + 1))
        }
        (Some((left_min, left_max)), Some((right_min, right_max))) => {
            Some((left_min.min(right_min) + 1, left_max.max(right_max) + 1))
        }
    }
}
