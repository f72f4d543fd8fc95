//! Owned storage for the points and payloads of a tree.

use bytemuck::cast_slice;

use crate::r#type::IndexableNum;

/// The canonical (point, payload) pairs of a tree.
///
/// Points and payloads live in two parallel vectors so that the point slice stays a plain
/// `[[N; K]]` regardless of the payload type. Building a tree permutes both vectors in lockstep;
/// indices returned by queries address the **current** order, not insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStore<N: IndexableNum, const K: usize, P = ()> {
    points: Vec<[N; K]>,
    payloads: Vec<P>,
}

impl<N: IndexableNum, const K: usize, P> Default for ItemStore<N, K, P> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            payloads: Vec::new(),
        }
    }
}

impl<N: IndexableNum, const K: usize, P> ItemStore<N, K, P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            payloads: Vec::with_capacity(capacity),
        }
    }

    /// Append an item, returning its current index.
    pub(crate) fn push(&mut self, point: [N; K], payload: P) -> usize {
        let index = self.points.len();
        self.points.push(point);
        self.payloads.push(payload);
        index
    }

    pub(crate) fn into_parts(self) -> (Vec<[N; K]>, Vec<P>) {
        (self.points, self.payloads)
    }

    /// Swap two items, keeping each point attached to its payload.
    #[inline]
    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        self.points.swap(i, j);
        self.payloads.swap(i, j);
    }

    /// The number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the store holds no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The point at `index`. Panics if `index >= self.len()`.
    #[inline]
    pub fn point(&self, index: usize) -> &[N; K] {
        &self.points[index]
    }

    /// The payload at `index`. Panics if `index >= self.len()`.
    #[inline]
    pub fn payload(&self, index: usize) -> &P {
        &self.payloads[index]
    }

    /// The point and payload at `index`. Panics if `index >= self.len()`.
    #[inline]
    pub fn item(&self, index: usize) -> (&[N; K], &P) {
        (&self.points[index], &self.payloads[index])
    }

    /// The point and payload at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<(&[N; K], &P)> {
        Some((self.points.get(index)?, self.payloads.get(index)?))
    }

    /// All points in their current order.
    pub fn points(&self) -> &[[N; K]] {
        &self.points
    }

    /// All payloads in their current order.
    pub fn payloads(&self) -> &[P] {
        &self.payloads
    }

    /// The points as one interleaved coordinate slice: `[x0, y0, .., x1, y1, ..]`.
    pub fn coords(&self) -> &[N] {
        cast_slice(&self.points)
    }

    /// Iterate over `(index, point, payload)` in current order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[N; K], &P)> + '_ {
        self.points
            .iter()
            .zip(self.payloads.iter())
            .enumerate()
            .map(|(i, (p, payload))| (i, p, payload))
    }

    /// Reorder the items in `[offset, offset + order.len())` so that position `offset + i` receives
    /// the item that was at `order[i]`.
    ///
    /// `order` must be a permutation of `offset..offset + order.len()`.
    pub(crate) fn permute_range(&mut self, offset: usize, order: &[usize]) {
        let mut placed = vec![false; order.len()];
        for start in 0..order.len() {
            if placed[start] {
                continue;
            }
            // Walk one cycle; the item displaced from `start` always sits at `cur`.
            let mut cur = start;
            loop {
                placed[cur] = true;
                let src = order[cur] - offset;
                if src == start {
                    break;
                }
                self.swap(offset + cur, offset + src);
                cur = src;
            }
        }
    }
}
