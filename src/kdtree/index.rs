use log::{debug, trace};

use crate::error::Result;
use crate::kdtree::bbox::BBox;
use crate::kdtree::builder::{build_nodes, KdTreeBuilder, KdTreeOptions};
use crate::kdtree::store::ItemStore;
use crate::r#type::IndexableNum;

/// One node of the tree arena.
///
/// Each node owns exactly one item. Children are referenced by arena index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeNode<N: IndexableNum, const K: usize> {
    pub(crate) item: usize,
    pub(crate) axis: usize,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) bbox: BBox<N, K>,
}

impl<N: IndexableNum, const K: usize> TreeNode<N, K> {
    /// Sentinel for a missing child.
    pub(crate) const NONE: usize = usize::MAX;

    pub(crate) fn new(item: usize, axis: usize, point: &[N; K]) -> Self {
        Self {
            item,
            axis,
            left: Self::NONE,
            right: Self::NONE,
            bbox: BBox::from_point(point),
        }
    }

    /// Index of this node's item in the item store.
    #[inline]
    pub fn item_index(&self) -> usize {
        self.item
    }

    /// The axis this node splits on: its depth modulo `K`.
    #[inline]
    pub fn axis(&self) -> usize {
        self.axis
    }

    /// Arena index of the left child, whose items are not larger on [`Self::axis`].
    #[inline]
    pub fn left(&self) -> Option<usize> {
        (self.left != Self::NONE).then_some(self.left)
    }

    /// Arena index of the right child, whose items are not smaller on [`Self::axis`].
    #[inline]
    pub fn right(&self) -> Option<usize> {
        (self.right != Self::NONE).then_some(self.right)
    }

    /// The tight bounding box of every point in this node's subtree.
    #[inline]
    pub fn bbox(&self) -> &BBox<N, K> {
        &self.bbox
    }
}

/// An owned, immutable K-dimensional tree.
///
/// Usually this will be created from a collection with one of the `from_*` constructors, or
/// incrementally via [`KdTreeBuilder`]. Queries live on the
/// [`KdTreeIndex`][crate::kdtree::KdTreeIndex] trait.
///
/// `K` must be greater than zero; `KdTree<_, 0>` fails to compile once it is constructed.
///
/// ```compile_fail
/// let tree = kd_index::kdtree::KdTree::<f64, 0>::from_points(Vec::<[f64; 0]>::new());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KdTree<N: IndexableNum, const K: usize, P = ()> {
    pub(crate) store: ItemStore<N, K, P>,
    pub(crate) nodes: Vec<TreeNode<N, K>>,
    pub(crate) root: Option<usize>,
    pub(crate) depth: usize,
    pub(crate) options: KdTreeOptions,
}

impl<N: IndexableNum, const K: usize, P> KdTree<N, K, P> {
    const NONZERO_DIMS: () = assert!(K > 0, "a kd-tree needs at least one dimension");

    pub(crate) fn from_store(store: ItemStore<N, K, P>, options: KdTreeOptions) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_DIMS;

        let mut tree = Self {
            store,
            nodes: Vec::new(),
            root: None,
            depth: 0,
            options,
        };
        tree.build();
        tree
    }

    /// Build a tree from `(point, payload)` pairs.
    pub fn from_items(items: impl IntoIterator<Item = ([N; K], P)>) -> Self {
        Self::from_items_with_options(items, KdTreeOptions::default())
    }

    /// Build a tree from `(point, payload)` pairs with the provided options.
    pub fn from_items_with_options(
        items: impl IntoIterator<Item = ([N; K], P)>,
        options: KdTreeOptions,
    ) -> Self {
        let items = items.into_iter();
        let mut builder = KdTreeBuilder::new_with_options(items.size_hint().0, options);
        for (point, payload) in items {
            builder.add_with_payload(point, payload);
        }
        builder.finish()
    }

    /// Build a tree from arbitrary input, projecting each element to a point and payload.
    ///
    /// ```
    /// use kd_index::kdtree::{KdTree, KdTreeIndex};
    ///
    /// let cities = [("Oslo", 59.91, 10.75), ("Rome", 41.90, 12.50), ("Lima", -12.05, -77.04)];
    /// let tree = KdTree::<f64, 2, &str>::from_iter_with_payload(cities, |(name, lat, lon)| {
    ///     ([lat, lon], name)
    /// });
    ///
    /// let nearest = tree.nearest(&[45.0, 9.0]).unwrap();
    /// assert_eq!(tree.payload(nearest.index), &"Rome");
    /// ```
    pub fn from_iter_with_payload<T>(
        input: impl IntoIterator<Item = T>,
        project: impl FnMut(T) -> ([N; K], P),
    ) -> Self {
        Self::from_items(input.into_iter().map(project))
    }

    /// Re-partition the current items and regenerate the node arena.
    ///
    /// Items keep their payloads but may move, so indices returned before this call no longer
    /// refer to the same items. The previous arena is discarded.
    pub fn build(&mut self) {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_DIMS;

        if !self.nodes.is_empty() {
            trace!("discarding {} nodes before rebuild", self.nodes.len());
        }

        let built = build_nodes(&mut self.store, &self.options);
        self.nodes = built.nodes;
        self.root = built.root;
        self.depth = built.depth;

        debug!(
            "built {}-d tree: {} items, {} nodes, depth {}, {:?}",
            K,
            self.store.len(),
            self.nodes.len(),
            self.depth,
            self.options.selection
        );
    }

    /// Replace the build options and rebuild.
    pub fn rebuild_with_options(&mut self, options: KdTreeOptions) {
        self.options = options;
        self.build();
    }

    /// The options this tree was built with.
    pub fn options(&self) -> &KdTreeOptions {
        &self.options
    }

    /// Number of levels of the tree; zero when empty.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The payload at `index`. Panics if `index` is out of range.
    pub fn payload(&self, index: usize) -> &P {
        self.store.payload(index)
    }

    /// The point and payload at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<(&[N; K], &P)> {
        self.store.get(index)
    }

    /// Consume the tree, returning its points and payloads in partitioned order.
    pub fn into_items(self) -> impl Iterator<Item = ([N; K], P)> {
        let (points, payloads) = self.store.into_parts();
        points.into_iter().zip(payloads)
    }
}

impl<N: IndexableNum, const K: usize, P: Default> KdTree<N, K, P> {
    /// Build a tree from points, each with a default payload.
    ///
    /// ```
    /// use kd_index::kdtree::{KdTree, KdTreeIndex};
    ///
    /// let tree = KdTree::<f64, 2>::from_points([[0., 0.], [1., 1.], [2., 2.], [0., 2.]]);
    /// let nearest = tree.nearest(&[5., 5.]).unwrap();
    /// assert_eq!(tree.point(nearest.index), &[2., 2.]);
    /// assert_eq!(nearest.dist2, 18.);
    /// ```
    pub fn from_points(points: impl IntoIterator<Item = [N; K]>) -> Self {
        Self::from_points_with_options(points, KdTreeOptions::default())
    }

    /// Build a tree from points with the provided options.
    pub fn from_points_with_options(
        points: impl IntoIterator<Item = [N; K]>,
        options: KdTreeOptions,
    ) -> Self {
        Self::from_items_with_options(points.into_iter().map(|p| (p, P::default())), options)
    }

    /// Build a tree from arbitrary input, projecting each element to a point.
    pub fn from_iter_with<T>(
        input: impl IntoIterator<Item = T>,
        project: impl FnMut(T) -> [N; K],
    ) -> Self {
        Self::from_points(input.into_iter().map(project))
    }

    /// Build a tree from one interleaved coordinate buffer: `[x0, y0, .., x1, y1, ..]`.
    pub fn from_interleaved(coords: &[N]) -> Result<Self> {
        let mut builder = KdTreeBuilder::new(coords.len() / K);
        builder.add_interleaved(coords)?;
        Ok(builder.finish())
    }
}

impl<N: IndexableNum, const K: usize, P> Default for KdTree<N, K, P> {
    fn default() -> Self {
        Self::from_store(ItemStore::default(), KdTreeOptions::default())
    }
}
