mod entry;

pub mod arena;
pub mod avl_tree;
pub mod bst;
pub mod leaf_depth;
