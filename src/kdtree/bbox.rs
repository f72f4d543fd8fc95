//! Axis-aligned bounding boxes and the containment tests used to prune traversals.

use crate::r#type::IndexableNum;

/// A K-dimensional axis-aligned bounding box, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox<N: IndexableNum, const K: usize> {
    /// Per-axis minimum.
    pub lo: [N; K],
    /// Per-axis maximum.
    pub hi: [N; K],
}

impl<N: IndexableNum, const K: usize> BBox<N, K> {
    /// Create a box from its min and max corners.
    pub fn new(lo: [N; K], hi: [N; K]) -> Self {
        Self { lo, hi }
    }

    /// The degenerate box holding exactly one point.
    pub fn from_point(point: &[N; K]) -> Self {
        Self {
            lo: *point,
            hi: *point,
        }
    }

    /// Grow this box to cover `other`.
    #[inline]
    pub fn expand(&mut self, other: &Self) {
        for axis in 0..K {
            if other.lo[axis] < self.lo[axis] {
                self.lo[axis] = other.lo[axis];
            }
            if other.hi[axis] > self.hi[axis] {
                self.hi[axis] = other.hi[axis];
            }
        }
    }

    /// Grow this box to cover `point`.
    #[inline]
    pub fn expand_point(&mut self, point: &[N; K]) {
        for axis in 0..K {
            if point[axis] < self.lo[axis] {
                self.lo[axis] = point[axis];
            }
            if point[axis] > self.hi[axis] {
                self.hi[axis] = point[axis];
            }
        }
    }

    /// Returns `true` if the boxes overlap on every axis. Touching faces count as overlap.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        for axis in 0..K {
            if self.hi[axis] < other.lo[axis] || other.hi[axis] < self.lo[axis] {
                return false;
            }
        }
        true
    }

    /// Returns `true` if `point` lies inside this box on every axis.
    #[inline]
    pub fn contains_point(&self, point: &[N; K]) -> bool {
        for axis in 0..K {
            if point[axis] < self.lo[axis] || point[axis] > self.hi[axis] {
                return false;
            }
        }
        true
    }
}
