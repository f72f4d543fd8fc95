//! Utilities to traverse the KdTree structure.

use std::fmt;

use crate::kdtree::bbox::BBox;
use crate::kdtree::index::TreeNode;
use crate::kdtree::store::ItemStore;
use crate::r#type::IndexableNum;

/// A borrowed handle onto one node of a KdTree.
///
/// Obtained from [`KdTreeIndex::root`][crate::kdtree::KdTreeIndex::root] and walked down with
/// [`Node::left_child`] and [`Node::right_child`].
pub struct Node<'a, N: IndexableNum, const K: usize, P> {
    nodes: &'a [TreeNode<N, K>],
    store: &'a ItemStore<N, K, P>,

    /// Arena index of this node.
    index: usize,
}

impl<'a, N: IndexableNum, const K: usize, P> Node<'a, N, K, P> {
    pub(crate) fn new(
        nodes: &'a [TreeNode<N, K>],
        store: &'a ItemStore<N, K, P>,
        index: usize,
    ) -> Self {
        Self {
            nodes,
            store,
            index,
        }
    }

    #[inline]
    fn node(&self) -> &'a TreeNode<N, K> {
        &self.nodes[self.index]
    }

    /// Arena index of this node.
    pub fn node_index(&self) -> usize {
        self.index
    }

    /// Index into the item store of the item this node holds.
    ///
    /// Note: this is the partitioned index, not the insertion index.
    pub fn item_index(&self) -> usize {
        self.node().item
    }

    /// The point this node holds.
    pub fn point(&self) -> &'a [N; K] {
        self.store.point(self.node().item)
    }

    /// The payload of the item this node holds.
    pub fn payload(&self) -> &'a P {
        self.store.payload(self.node().item)
    }

    /// The axis this node splits its children over.
    pub fn axis(&self) -> usize {
        self.node().axis
    }

    /// The tight bounding box of this node's subtree, including its own point.
    pub fn bbox(&self) -> &'a BBox<N, K> {
        &self.node().bbox
    }

    /// The child holding items that are not larger on [`Self::axis`], if any.
    pub fn left_child(&self) -> Option<Node<'a, N, K, P>> {
        self.node()
            .left()
            .map(|index| Node::new(self.nodes, self.store, index))
    }

    /// The child holding items that are not smaller on [`Self::axis`], if any.
    pub fn right_child(&self) -> Option<Node<'a, N, K, P>> {
        self.node()
            .right()
            .map(|index| Node::new(self.nodes, self.store, index))
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let node = self.node();
        node.left().is_none() && node.right().is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }
}

impl<N: IndexableNum, const K: usize, P> Clone for Node<'_, N, K, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, const K: usize, P> Copy for Node<'_, N, K, P> {}

impl<N: IndexableNum, const K: usize, P> fmt::Debug for Node<'_, N, K, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("index", &self.index)
            .field("item", &self.item_index())
            .field("axis", &self.axis())
            .field("bbox", self.bbox())
            .finish()
    }
}
