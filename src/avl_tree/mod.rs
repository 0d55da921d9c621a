//! Self-balancing binary search tree where the heights of the two child subtrees of any node
//! differ by at most one, maintained through per-node balance factors and rotations.

mod map;
mod set;
pub(crate) mod tree;

pub use self::map::AvlMap;
pub use self::set::AvlSet;
pub use crate::bst::{Cursor, IntoIter, Iter, SetIntoIter, SetIter};
