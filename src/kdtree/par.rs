//! Parallel batch queries over one built tree.

use rayon::prelude::*;

use crate::kdtree::{KdTree, KdTreeIndex, Neighbor};
use crate::r#type::IndexableNum;

impl<N: IndexableNum, const K: usize, P: Sync> KdTree<N, K, P> {
    /// [`KdTreeIndex::nearest`] for every query point, computed on the rayon thread pool.
    ///
    /// Results are in query order.
    pub fn par_nearest(&self, queries: &[[N; K]]) -> Vec<Option<Neighbor<N::Acc>>> {
        queries.par_iter().map(|q| self.nearest(q)).collect()
    }

    /// [`KdTreeIndex::knn`] for every query point, computed on the rayon thread pool.
    pub fn par_knn(&self, queries: &[[N; K]], k: usize) -> Vec<Vec<Neighbor<N::Acc>>> {
        queries.par_iter().map(|q| self.knn(q, k)).collect()
    }

    /// [`KdTreeIndex::radius_search`] for every query point, computed on the rayon thread pool.
    pub fn par_radius_search(&self, queries: &[[N; K]], r: N) -> Vec<Vec<usize>> {
        queries
            .par_iter()
            .map(|q| self.radius_search(q, r))
            .collect()
    }
}
