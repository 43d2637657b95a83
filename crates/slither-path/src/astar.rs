//! Node-capped A* over the occupancy grid.

use crate::scratch::{OpenNode, SearchScratch, NO_PARENT};
use slither_core::{Cell, Direction};
use slither_space::OccupancyGrid;
use std::cmp::Reverse;

/// Result of a single A* run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchResult {
    /// Path found. Its cell indices, start excluded and goal included,
    /// are left in `scratch.trail`.
    Found { expanded: usize },
    /// The open set emptied without reaching the goal.
    Unreachable { expanded: usize },
    /// The expansion cap was hit first.
    Exhausted { expanded: usize },
}

/// Search parameters for one query.
pub(crate) struct Search {
    pub start: Cell,
    pub goal: Cell,
    pub facing: Direction,
    /// A segment cell that may be entered as the first step only.
    pub vacating_tail: Option<Cell>,
    pub max_expansions: usize,
}

/// Shortest 4-connected path from `start` to `goal` through walkable
/// cells, with neighbours explored in the agent's preference order.
pub(crate) fn astar(
    grid: &OccupancyGrid,
    search: &Search,
    scratch: &mut SearchScratch,
) -> SearchResult {
    scratch.begin(grid.cell_count());
    let (Ok(start), Ok(goal)) = (grid.index_of(search.start), grid.index_of(search.goal)) else {
        return SearchResult::Unreachable { expanded: 0 };
    };
    if start == goal {
        return SearchResult::Found { expanded: 0 };
    }

    let cells = grid.cells();
    let order = search.facing.preference_order();
    let h0 = search.start.manhattan(search.goal);
    scratch.reach(start, 0, NO_PARENT);
    scratch.heap.push(Reverse(OpenNode {
        f: h0,
        h: h0,
        seq: 0,
        index: start as u32,
    }));
    let mut seq = 1u32;
    let mut expanded = 0usize;

    while let Some(Reverse(node)) = scratch.heap.pop() {
        let index = node.index as usize;
        if scratch.is_closed(index) || node.f - node.h != scratch.g(index) {
            continue;
        }
        if index == goal {
            reconstruct(scratch, start, goal);
            return SearchResult::Found { expanded };
        }
        if expanded >= search.max_expansions {
            return SearchResult::Exhausted { expanded };
        }
        expanded += 1;
        scratch.close(index);

        let here = grid.cell_of(index);
        let g_next = scratch.g(index) + 1;
        for dir in order {
            let next = here.step(dir);
            let Ok(ni) = grid.index_of(next) else {
                continue;
            };
            let enterable = cells[ni].is_walkable()
                || (index == start && search.vacating_tail == Some(next));
            if !enterable || scratch.is_closed(ni) {
                continue;
            }
            if scratch.is_seen(ni) && scratch.g(ni) <= g_next {
                continue;
            }
            scratch.reach(ni, g_next, index as u32);
            let h = next.manhattan(search.goal);
            scratch.heap.push(Reverse(OpenNode {
                f: g_next + h,
                h,
                seq,
                index: ni as u32,
            }));
            seq = seq.wrapping_add(1);
        }
    }
    SearchResult::Unreachable { expanded }
}

fn reconstruct(scratch: &mut SearchScratch, start: usize, goal: usize) {
    let mut at = goal as u32;
    while at as usize != start && at != NO_PARENT {
        scratch.trail.push(at);
        at = scratch.parent(at as usize);
    }
    scratch.trail.reverse();
}
