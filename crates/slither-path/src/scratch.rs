//! Pre-allocated search storage.
//!
//! One [`SearchScratch`] per worker thread. Per-cell arrays are stamped with
//! a generation counter instead of being cleared, so starting a new search
//! is O(1) regardless of grid size.

use slither_core::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// Sentinel parent for the search root.
pub(crate) const NO_PARENT: u32 = u32::MAX;

/// Open-set entry. Ordered by `(f, h, seq)` so that ties resolve toward
/// the goal first and then in insertion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct OpenNode {
    pub f: u32,
    pub h: u32,
    pub seq: u32,
    pub index: u32,
}

/// Reusable open/closed storage sized to the grid.
#[derive(Debug)]
pub struct SearchScratch {
    g: Vec<u32>,
    parent: Vec<u32>,
    seen: Vec<u32>,
    closed: Vec<u32>,
    generation: u32,
    pub(crate) heap: BinaryHeap<Reverse<OpenNode>>,
    pub(crate) queue: VecDeque<(u32, Direction)>,
    pub(crate) trail: Vec<u32>,
}

impl SearchScratch {
    /// Allocate storage for a grid of `cell_count` cells.
    pub fn new(cell_count: usize) -> Self {
        Self {
            g: vec![0; cell_count],
            parent: vec![NO_PARENT; cell_count],
            seen: vec![0; cell_count],
            closed: vec![0; cell_count],
            generation: 0,
            heap: BinaryHeap::with_capacity(cell_count.min(4096)),
            queue: VecDeque::with_capacity(256),
            trail: Vec::with_capacity(256),
        }
    }

    /// Number of cells this scratch can address.
    pub fn capacity(&self) -> usize {
        self.g.len()
    }

    /// Start a new search over `cell_count` cells.
    pub(crate) fn begin(&mut self, cell_count: usize) {
        if self.g.len() < cell_count {
            *self = Self::new(cell_count);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.seen.fill(0);
            self.closed.fill(0);
            self.generation = 1;
        }
        self.heap.clear();
        self.queue.clear();
        self.trail.clear();
    }

    /// True if `index` was reached during the current search.
    pub(crate) fn is_seen(&self, index: usize) -> bool {
        self.seen[index] == self.generation
    }

    /// True if `index` was expanded during the current search.
    pub(crate) fn is_closed(&self, index: usize) -> bool {
        self.closed[index] == self.generation
    }

    pub(crate) fn reach(&mut self, index: usize, g: u32, parent: u32) {
        self.seen[index] = self.generation;
        self.g[index] = g;
        self.parent[index] = parent;
    }

    pub(crate) fn close(&mut self, index: usize) {
        self.closed[index] = self.generation;
    }

    /// Cost-so-far of a seen cell.
    pub(crate) fn g(&self, index: usize) -> u32 {
        self.g[index]
    }

    pub(crate) fn parent(&self, index: usize) -> u32 {
        self.parent[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_invalidates_previous_marks() {
        let mut s = SearchScratch::new(8);
        s.begin(8);
        s.reach(3, 2, NO_PARENT);
        s.close(3);
        assert!(s.is_seen(3));
        assert!(s.is_closed(3));
        s.begin(8);
        assert!(!s.is_seen(3));
        assert!(!s.is_closed(3));
    }

    #[test]
    fn generation_wrap_resets_stamps() {
        let mut s = SearchScratch::new(4);
        s.generation = u32::MAX - 1;
        s.begin(4);
        s.reach(1, 0, NO_PARENT);
        s.begin(4);
        assert_eq!(s.generation, 1);
        assert!(!s.is_seen(1));
    }

    #[test]
    fn begin_grows_for_larger_grid() {
        let mut s = SearchScratch::new(4);
        s.begin(100);
        assert_eq!(s.capacity(), 100);
        s.reach(99, 7, 0);
        assert_eq!(s.g(99), 7);
        assert_eq!(s.parent(99), 0);
    }
}
