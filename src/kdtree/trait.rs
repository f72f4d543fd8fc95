use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tinyvec::TinyVec;

use crate::kdtree::bbox::BBox;
use crate::kdtree::distance::{below, box_sq_dist, sq_dist};
use crate::kdtree::index::{KdTree, TreeNode};
use crate::kdtree::store::ItemStore;
use crate::kdtree::traversal::Node;
use crate::r#type::IndexableNum;

/// A query result: the index of an item and its squared distance to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<A> {
    /// Index of the item in the tree's item store.
    pub index: usize,
    /// Squared Euclidean distance to the query point.
    pub dist2: A,
}

/// A trait for searching and accessing data out of a KdTree.
///
/// Every query is read-only and never fails: an empty tree yields `None` or an empty result.
pub trait KdTreeIndex<N: IndexableNum, const K: usize, P>: Sized {
    /// The items of this tree, in partitioned order.
    fn store(&self) -> &ItemStore<N, K, P>;

    /// The node arena of this tree.
    fn nodes(&self) -> &[TreeNode<N, K>];

    /// Arena index of the root node, or `None` for an empty tree.
    fn root_index(&self) -> Option<usize>;

    /// The number of items in this tree.
    fn size(&self) -> usize {
        self.store().len()
    }

    /// Returns `true` if this tree holds no items.
    fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// The point at `index`. Panics if `index >= self.size()`.
    fn point<'a>(&'a self, index: usize) -> &'a [N; K]
    where
        P: 'a,
    {
        self.store().point(index)
    }

    /// The point and payload at `index`. Panics if `index >= self.size()`.
    fn item<'a>(&'a self, index: usize) -> (&'a [N; K], &'a P)
    where
        P: 'a,
    {
        self.store().item(index)
    }

    /// Find the item closest to `q`.
    ///
    /// When several items are equally close, the first one reached by the traversal wins.
    /// Returns `None` for an empty tree.
    fn nearest(&self, q: &[N; K]) -> Option<Neighbor<N::Acc>> {
        let nodes = self.nodes();
        let store = self.store();
        let root = self.root_index()?;

        let mut best: Option<Neighbor<N::Acc>> = None;

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[(usize, N::Acc); 32]> = TinyVec::new();
        stack.push((root, box_sq_dist(q, &nodes[root].bbox)));

        while let Some((node_index, bound)) = stack.pop() {
            // the best distance may have shrunk since this subtree was queued
            if !below(bound, best.map(|b| b.dist2)) {
                continue;
            }

            let node = &nodes[node_index];
            let dist2 = sq_dist(store.point(node.item), q);
            if below(dist2, best.map(|b| b.dist2)) {
                best = Some(Neighbor {
                    index: node.item,
                    dist2,
                });
            }

            push_children_nearest_first(&mut stack, nodes, node, q, best.map(|b| b.dist2));
        }

        best
    }

    /// Find the `k` items closest to `q`, sorted by ascending distance.
    ///
    /// `k` is clamped to the tree size. Within the result, equal distances are ordered by item
    /// index. A candidate only replaces the current `k`-th neighbor when strictly closer, so when
    /// several items tie at the `k`-th distance, which of them is returned depends on traversal
    /// order, not on their indices.
    ///
    /// ```
    /// use kd_index::kdtree::{KdTree, KdTreeIndex};
    ///
    /// let tree = KdTree::<i32, 2>::from_points([[0, 0], [1, 1], [2, 2], [0, 2]]);
    /// let neighbors = tree.knn(&[0, 0], 2);
    /// let dists: Vec<i128> = neighbors.iter().map(|n| n.dist2).collect();
    /// assert_eq!(dists, vec![0, 2]);
    /// assert_eq!(tree.point(neighbors[0].index), &[0, 0]);
    /// ```
    fn knn(&self, q: &[N; K], k: usize) -> Vec<Neighbor<N::Acc>> {
        let nodes = self.nodes();
        let store = self.store();
        let k = k.min(self.size());
        let root = match self.root_index() {
            Some(root) if k > 0 => root,
            _ => return vec![],
        };

        // max-heap: the worst admitted candidate is on top
        let mut heap: BinaryHeap<Candidate<N::Acc>> = BinaryHeap::with_capacity(k);
        let worst = |heap: &BinaryHeap<Candidate<N::Acc>>| {
            if heap.len() < k {
                None
            } else {
                heap.peek().map(|c| c.dist2)
            }
        };

        let mut stack: TinyVec<[(usize, N::Acc); 32]> = TinyVec::new();
        stack.push((root, box_sq_dist(q, &nodes[root].bbox)));

        while let Some((node_index, bound)) = stack.pop() {
            if !below(bound, worst(&heap)) {
                continue;
            }

            let node = &nodes[node_index];
            let candidate = Candidate {
                dist2: sq_dist(store.point(node.item), q),
                index: node.item,
            };
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|top| candidate.dist2 < top.dist2) {
                heap.pop();
                heap.push(candidate);
            }

            push_children_nearest_first(&mut stack, nodes, node, q, worst(&heap));
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                index: c.index,
                dist2: c.dist2,
            })
            .collect()
    }

    /// Search the index for items within the axis-aligned box `[lo, hi]`, bounds inclusive.
    ///
    /// Returns indices of found items, in traversal order.
    fn range_search(&self, lo: &[N; K], hi: &[N; K]) -> Vec<usize> {
        let nodes = self.nodes();
        let store = self.store();
        let query = BBox::new(*lo, *hi);

        let mut result: Vec<usize> = vec![];
        let Some(root) = self.root_index() else {
            return result;
        };

        let mut stack: TinyVec<[usize; 32]> = TinyVec::new();
        stack.push(root);

        while let Some(node_index) = stack.pop() {
            let node = &nodes[node_index];
            if !node.bbox.intersects(&query) {
                continue;
            }

            // include this node's item if it's in range
            if query.contains_point(store.point(node.item)) {
                result.push(node.item);
            }

            // Note: these are pushed in backwards order to what gets popped
            if let Some(right) = node.right() {
                stack.push(right);
            }
            if let Some(left) = node.left() {
                stack.push(left);
            }
        }

        result
    }

    /// Search the index for items within distance `r` of `q`, boundary inclusive.
    ///
    /// Returns indices of found items, in traversal order.
    fn radius_search(&self, q: &[N; K], r: N) -> Vec<usize> {
        let r = r.widen();
        self.radius_search_squared(q, r * r)
    }

    /// Search the index for items whose squared distance to `q` is at most `r2`.
    ///
    /// Useful for integer coordinates, where the radius itself may not be representable.
    fn radius_search_squared(&self, q: &[N; K], r2: N::Acc) -> Vec<usize> {
        let nodes = self.nodes();
        let store = self.store();

        let mut result: Vec<usize> = vec![];
        let Some(root) = self.root_index() else {
            return result;
        };

        let mut stack: TinyVec<[usize; 32]> = TinyVec::new();
        stack.push(root);

        while let Some(node_index) = stack.pop() {
            let node = &nodes[node_index];
            if box_sq_dist(q, &node.bbox) > r2 {
                continue;
            }

            if sq_dist(store.point(node.item), q) <= r2 {
                result.push(node.item);
            }

            if let Some(right) = node.right() {
                stack.push(right);
            }
            if let Some(left) = node.left() {
                stack.push(left);
            }
        }

        result
    }

    /// Access the root node of the KdTree for manual traversal.
    fn root(&self) -> Option<Node<'_, N, K, P>> {
        let root = self.root_index()?;
        Some(Node::new(self.nodes(), self.store(), root))
    }
}

impl<N: IndexableNum, const K: usize, P> KdTreeIndex<N, K, P> for KdTree<N, K, P> {
    fn store(&self) -> &ItemStore<N, K, P> {
        &self.store
    }

    fn nodes(&self) -> &[TreeNode<N, K>] {
        &self.nodes
    }

    fn root_index(&self) -> Option<usize> {
        self.root
    }
}

/// Queue the children of `node` whose box bound is below `bound`, arranged so the child with the
/// smaller bound is popped first. Equal bounds visit the right child first.
#[inline]
fn push_children_nearest_first<N: IndexableNum, const K: usize>(
    stack: &mut TinyVec<[(usize, N::Acc); 32]>,
    nodes: &[TreeNode<N, K>],
    node: &TreeNode<N, K>,
    q: &[N; K],
    bound: Option<N::Acc>,
) {
    let left = node.left().map(|i| (i, box_sq_dist(q, &nodes[i].bbox)));
    let right = node.right().map(|i| (i, box_sq_dist(q, &nodes[i].bbox)));

    let (first, second) = match (left, right) {
        (Some(l), Some(r)) if r.1 <= l.1 => (Some(r), Some(l)),
        (Some(l), r) => (Some(l), r),
        (None, r) => (r, None),
    };

    for (child, child_bound) in [second, first].into_iter().flatten() {
        if below(child_bound, bound) {
            stack.push((child, child_bound));
        }
    }
}

/// A wrapper around an item and its distance for use in the k-nearest priority queue.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate<A> {
    dist2: A,
    index: usize,
}

impl<A: PartialOrd> Eq for Candidate<A> {}

impl<A: PartialOrd> Ord for Candidate<A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // We don't allow NaN, so distances are always comparable
        self.dist2
            .partial_cmp(&other.dist2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl<A: PartialOrd> PartialOrd for Candidate<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
