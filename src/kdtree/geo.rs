//! 2D queries taking [`geo_traits`] inputs.

use geo_traits::{CoordTrait, RectTrait};

use crate::kdtree::{KdTree, KdTreeIndex, Neighbor};
use crate::r#type::IndexableNum;

impl<N: IndexableNum, P> KdTree<N, 2, P> {
    /// Find the item closest to the given coordinate.
    pub fn nearest_coord(&self, coord: &impl CoordTrait<T = N>) -> Option<Neighbor<N::Acc>> {
        self.nearest(&[coord.x(), coord.y()])
    }

    /// Find the `k` items closest to the given coordinate.
    pub fn knn_coord(&self, coord: &impl CoordTrait<T = N>, k: usize) -> Vec<Neighbor<N::Acc>> {
        self.knn(&[coord.x(), coord.y()], k)
    }

    /// Search the index for items within the given rectangle.
    ///
    /// Returns indices of found items
    pub fn range_search_rect(&self, rect: &impl RectTrait<T = N>) -> Vec<usize> {
        self.range_search(
            &[rect.min().x(), rect.min().y()],
            &[rect.max().x(), rect.max().y()],
        )
    }

    /// Search the index for items within a given radius of the coordinate.
    ///
    /// Returns indices of found items
    pub fn radius_search_coord(&self, coord: &impl CoordTrait<T = N>, r: N) -> Vec<usize> {
        self.radius_search(&[coord.x(), coord.y()], r)
    }
}
