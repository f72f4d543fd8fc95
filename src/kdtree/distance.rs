//! Squared Euclidean distances in the widened accumulator type.

use num_traits::Zero;

use crate::kdtree::bbox::BBox;
use crate::r#type::IndexableNum;

/// Squared Euclidean distance between two points.
#[inline]
pub fn sq_dist<N: IndexableNum, const K: usize>(a: &[N; K], b: &[N; K]) -> N::Acc {
    let mut sum = N::Acc::zero();
    for axis in 0..K {
        let d = a[axis].widen() - b[axis].widen();
        sum = sum + d * d;
    }
    sum
}

/// Squared distance from `q` to the nearest point of `bbox`; zero when `q` is inside.
///
/// This is a lower bound on [`sq_dist`] from `q` to any point inside the box.
#[inline]
pub fn box_sq_dist<N: IndexableNum, const K: usize>(q: &[N; K], bbox: &BBox<N, K>) -> N::Acc {
    let mut sum = N::Acc::zero();
    for axis in 0..K {
        let d = axis_dist(q[axis], bbox.lo[axis], bbox.hi[axis]);
        sum = sum + d * d;
    }
    sum
}

/// 1D distance from a value to a range.
#[inline]
fn axis_dist<N: IndexableNum>(k: N, min: N, max: N) -> N::Acc {
    if k < min {
        min.widen() - k.widen()
    } else if k <= max {
        N::Acc::zero()
    } else {
        k.widen() - max.widen()
    }
}

/// `true` if `dist` is strictly below `bound`, where `None` stands for an unbounded distance.
#[inline]
pub(crate) fn below<A: PartialOrd>(dist: A, bound: Option<A>) -> bool {
    bound.map_or(true, |bound| dist < bound)
}
