//! # kd-index
//!
//! A static, in-process K-dimensional tree over points with optional payloads, supporting exact
//! nearest neighbor, k-nearest neighbors, axis-aligned range and radius queries.
//!
//! The tree is built once by recursive median partitioning and is immutable afterwards, so
//! queries may run concurrently from many threads. Query results are indices into the tree's
//! item store; building **reorders** the items, so resolve results with
//! [`KdTreeIndex::point`][kdtree::KdTreeIndex::point] or
//! [`KdTreeIndex::item`][kdtree::KdTreeIndex::item] rather than by insertion position.
//!
//! ```
//! use kd_index::kdtree::{KdTree, KdTreeIndex};
//!
//! let tree = KdTree::<f64, 2>::from_points([[0., 0.], [1., 1.], [2., 2.], [0., 2.]]);
//!
//! let mut found: Vec<[f64; 2]> = tree
//!     .radius_search(&[0., 0.], 1.5)
//!     .into_iter()
//!     .map(|i| *tree.point(i))
//!     .collect();
//! found.sort_by(|a, b| a.partial_cmp(b).unwrap());
//! assert_eq!(found, vec![[0., 0.], [1., 1.]]);
//! ```
//!
//! Coordinates may be any of `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `f32` or `f64`. Squared
//! distances are accumulated in a wider type ([`IndexableNum::Acc`]).
//!
//! ## Features
//!
//! - `rayon`: batch queries (`par_nearest`, `par_knn`, `par_radius_search`) on the rayon pool.

mod error;
pub mod kdtree;
mod r#type;

pub use error::{KdIndexError, Result};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
