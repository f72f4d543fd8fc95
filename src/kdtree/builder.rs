use std::cmp::{self, Ordering};

use tinyvec::TinyVec;

use crate::error::{KdIndexError, Result};
use crate::kdtree::index::{KdTree, TreeNode};
use crate::kdtree::store::ItemStore;
use crate::r#type::IndexableNum;

/// How the median of each partition is selected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Floyd-Rivest selection performed directly on the item store.
    ///
    /// Fast on typical inputs, but without a worst-case bound on the work per partition.
    #[default]
    FloydRivest,
    /// The standard library's `select_nth_unstable_by` on a permutation of the partition, which is
    /// then applied to the item store in place.
    ///
    /// Costs one scratch allocation per partition in exchange for a selection time that does not
    /// depend on the coordinate distribution.
    Introselect,
}

/// Options controlling how a [`KdTree`] is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KdTreeOptions {
    /// Median selection algorithm.
    pub selection: SelectionStrategy,
}

impl KdTreeOptions {
    /// Options with the given selection strategy.
    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }
}

/// A builder to create a [`KdTree`] by appending items one at a time.
///
/// ```
/// use kd_index::kdtree::{KdTreeBuilder, KdTreeIndex};
///
/// let mut builder = KdTreeBuilder::<f64, 2>::new(3);
/// builder.add([0., 0.]);
/// builder.add([1., 1.]);
/// builder.add([2., 2.]);
/// let tree = builder.finish();
///
/// let nearest = tree.nearest(&[1.9, 1.8]).unwrap();
/// assert_eq!(tree.point(nearest.index), &[2., 2.]);
/// ```
#[derive(Debug, Clone)]
pub struct KdTreeBuilder<N: IndexableNum, const K: usize, P = ()> {
    store: ItemStore<N, K, P>,
    options: KdTreeOptions,
}

impl<N: IndexableNum, const K: usize, P> KdTreeBuilder<N, K, P> {
    /// Create a new builder with room for `capacity` items and the default options.
    pub fn new(capacity: usize) -> Self {
        Self::new_with_options(capacity, KdTreeOptions::default())
    }

    /// Create a new builder with room for `capacity` items and the provided options.
    pub fn new_with_options(capacity: usize, options: KdTreeOptions) -> Self {
        Self {
            store: ItemStore::with_capacity(capacity),
            options,
        }
    }

    /// Add a point with an explicit payload.
    ///
    /// Returns the position of the item before building. Building reorders items, so this is
    /// **not** the index that queries will report.
    pub fn add_with_payload(&mut self, point: [N; K], payload: P) -> usize {
        debug_assert!(point.iter().all(|c| c.is_comparable()));
        self.store.push(point, payload)
    }

    /// The number of items added so far.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if no items have been added.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Consume this builder, performing the k-d partition and generating a tree ready for queries.
    pub fn finish(self) -> KdTree<N, K, P> {
        KdTree::from_store(self.store, self.options)
    }
}

impl<N: IndexableNum, const K: usize, P: Default> KdTreeBuilder<N, K, P> {
    /// Add a point with a default payload.
    pub fn add(&mut self, point: [N; K]) -> usize {
        self.add_with_payload(point, P::default())
    }

    /// Add a point after checking that every coordinate is comparable.
    pub fn try_add(&mut self, point: [N; K]) -> Result<usize> {
        let index = self.store.len();
        check_point(index, &point)?;
        Ok(self.add(point))
    }

    /// Add points from one interleaved coordinate buffer: `[x0, y0, .., x1, y1, ..]`.
    ///
    /// Nothing is added if the buffer length is not a multiple of `K` or holds a NaN coordinate.
    pub fn add_interleaved(&mut self, coords: &[N]) -> Result<()> {
        if coords.len() % K != 0 {
            return Err(KdIndexError::InvalidCoordinateLength {
                len: coords.len(),
                dims: K,
            });
        }
        let start = self.store.len();
        let mut points = Vec::with_capacity(coords.len() / K);
        for (i, chunk) in coords.chunks_exact(K).enumerate() {
            let mut point = [N::zero(); K];
            point.copy_from_slice(chunk);
            check_point(start + i, &point)?;
            points.push(point);
        }
        for point in points {
            self.add(point);
        }
        Ok(())
    }
}

fn check_point<N: IndexableNum, const K: usize>(index: usize, point: &[N; K]) -> Result<()> {
    match point.iter().position(|c| !c.is_comparable()) {
        Some(axis) => Err(KdIndexError::NanCoordinate { index, axis }),
        None => Ok(()),
    }
}

/// A pending partition `[left, right)` and the arena slot waiting for its root.
#[derive(Debug, Clone, Copy, Default)]
struct BuildTask {
    left: usize,
    right: usize,
    depth: usize,
    parent: usize,
    is_right: bool,
}

/// The arena produced by [`build_nodes`].
pub(crate) struct BuiltNodes<N: IndexableNum, const K: usize> {
    pub(crate) nodes: Vec<TreeNode<N, K>>,
    pub(crate) root: Option<usize>,
    pub(crate) depth: usize,
}

/// kd-sort the store and generate the node arena.
///
/// Nodes are appended in pre-order, so every child sits at a larger arena index than its parent
/// and a single reverse pass unions the bounding boxes bottom-up.
pub(crate) fn build_nodes<N: IndexableNum, const K: usize, P>(
    store: &mut ItemStore<N, K, P>,
    options: &KdTreeOptions,
) -> BuiltNodes<N, K> {
    let num_items = store.len();
    let mut nodes: Vec<TreeNode<N, K>> = Vec::with_capacity(num_items);
    let mut max_depth = 0;

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[BuildTask; 32]> = TinyVec::new();
    if num_items > 0 {
        stack.push(BuildTask {
            left: 0,
            right: num_items,
            depth: 0,
            parent: TreeNode::<N, K>::NONE,
            is_right: false,
        });
    }

    while let Some(task) = stack.pop() {
        if task.left >= task.right {
            continue;
        }

        let axis = task.depth % K;
        let m = task.left + (task.right - task.left) / 2;

        // move the median item on this axis to `m`, smaller items before it and larger after
        match options.selection {
            SelectionStrategy::FloydRivest => {
                select(store, m, task.left, task.right - 1, axis);
            }
            SelectionStrategy::Introselect => introselect(store, m, task.left, task.right, axis),
        }

        let node_index = nodes.len();
        nodes.push(TreeNode::new(m, axis, store.point(m)));
        max_depth = cmp::max(max_depth, task.depth + 1);

        if task.parent != TreeNode::<N, K>::NONE {
            let parent = &mut nodes[task.parent];
            if task.is_right {
                parent.right = node_index;
            } else {
                parent.left = node_index;
            }
        }

        stack.push(BuildTask {
            left: m + 1,
            right: task.right,
            depth: task.depth + 1,
            parent: node_index,
            is_right: true,
        });
        stack.push(BuildTask {
            left: task.left,
            right: m,
            depth: task.depth + 1,
            parent: node_index,
            is_right: false,
        });
    }

    // children always follow their parent, so walking backwards sees every subtree finished
    for i in (0..nodes.len()).rev() {
        let (head, tail) = nodes.split_at_mut(i + 1);
        let node = &mut head[i];
        for child in [node.left, node.right] {
            if child != TreeNode::<N, K>::NONE {
                let child_bbox = tail[child - i - 1].bbox;
                node.bbox.expand(&child_bbox);
            }
        }
    }

    BuiltNodes {
        root: if nodes.is_empty() { None } else { Some(0) },
        nodes,
        depth: max_depth,
    }
}

#[inline]
fn coord_cmp<N: IndexableNum>(a: N, b: N) -> Ordering {
    // We don't allow NaN, so incomparable values are only possible through `add` in release
    // builds; treat them as equal rather than panicking.
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Select `k` within `[left, right)` through a permutation, then apply it to the store.
fn introselect<N: IndexableNum, const K: usize, P>(
    store: &mut ItemStore<N, K, P>,
    k: usize,
    left: usize,
    right: usize,
    axis: usize,
) {
    let points = store.points();
    let mut order: Vec<usize> = (left..right).collect();
    order.select_nth_unstable_by(k - left, |&a, &b| coord_cmp(points[a][axis], points[b][axis]));
    store.permute_range(left, &order);
}

/// Custom Floyd-Rivest selection algorithm: sort items so that [left..k-1] items are not larger
/// than the k-th item on `axis` and [k+1..right] items are not smaller. `right` is inclusive.
#[inline]
fn select<N: IndexableNum, const K: usize, P>(
    store: &mut ItemStore<N, K, P>,
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(store, k, new_left, new_right, axis);
        }

        let t = store.point(k)[axis];
        let mut i = left;
        let mut j = right;

        store.swap(left, k);
        if store.point(right)[axis] > t {
            store.swap(left, right);
        }

        while i < j {
            store.swap(i, j);
            i += 1;
            j -= 1;
            while store.point(i)[axis] < t {
                i += 1;
            }
            while store.point(j)[axis] > t {
                j -= 1;
            }
        }

        if store.point(left)[axis] == t {
            store.swap(left, j);
        } else {
            j += 1;
            store.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            if j == 0 {
                break;
            }
            right = j - 1;
        }
    }
}
