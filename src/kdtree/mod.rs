//! An implementation of an immutable K-dimensional tree.
//!
//! Items are median-partitioned into a balanced binary tree whose nodes each hold one item and
//! the tight bounding box of their subtree. Queries prune subtrees by those boxes.

#![warn(missing_docs)]

mod bbox;
mod builder;
mod distance;
mod geo;
mod index;
#[cfg(feature = "rayon")]
mod par;
mod store;
mod r#trait;
pub mod traversal;

pub use bbox::BBox;
pub use builder::{KdTreeBuilder, KdTreeOptions, SelectionStrategy};
pub use distance::{box_sq_dist, sq_dist};
pub use index::{KdTree, TreeNode};
pub use r#trait::{KdTreeIndex, Neighbor};
pub use store::ItemStore;

#[cfg(test)]
mod test;
