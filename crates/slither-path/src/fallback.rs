//! Bounded breadth-first safe-move search.
//!
//! Used when A* is inconclusive. Explores at most `budget` cells from the
//! head and picks the reachable walkable cell with the fewest adjacent
//! `BODY` or `HEAD` cells; the answer is the first step toward it. Empty cells beat
//! food cells at equal score, then shallower cells, then BFS order.

use crate::scratch::{SearchScratch, NO_PARENT};
use slither_core::{Cell, CellFlags, Direction};
use slither_space::OccupancyGrid;

/// First step toward the locally safest cell, or `None` if the head has
/// no enterable neighbour.
pub(crate) fn safest_direction(
    grid: &OccupancyGrid,
    head: Cell,
    facing: Direction,
    vacating_tail: Option<Cell>,
    budget: usize,
    scratch: &mut SearchScratch,
) -> Option<Direction> {
    scratch.begin(grid.cell_count());
    let start = grid.index_of(head).ok()?;
    scratch.reach(start, 0, NO_PARENT);
    let cells = grid.cells();
    let order = facing.preference_order();

    for dir in order {
        let next = head.step(dir);
        let Ok(ni) = grid.index_of(next) else {
            continue;
        };
        if cells[ni].is_walkable() || vacating_tail == Some(next) {
            scratch.reach(ni, 1, start as u32);
            scratch.queue.push_back((ni as u32, dir));
        }
    }

    // (occupied neighbours, holds food, depth)
    let mut best: Option<((u32, bool, u32), Direction)> = None;
    let mut visited = 0usize;
    while let Some((index, first)) = scratch.queue.pop_front() {
        let index = index as usize;
        let here = grid.cell_of(index);
        let depth = scratch.g(index);
        let score = (
            occupied_neighbours(grid, here),
            cells[index].has_food(),
            depth,
        );
        if best.is_none_or(|(b, _)| score < b) {
            best = Some((score, first));
        }
        visited += 1;
        if visited >= budget {
            break;
        }
        for dir in order {
            let next = here.step(dir);
            let Ok(ni) = grid.index_of(next) else {
                continue;
            };
            if cells[ni].is_walkable() && !scratch.is_seen(ni) {
                scratch.reach(ni, depth + 1, index as u32);
                scratch.queue.push_back((ni as u32, first));
            }
        }
    }
    best.map(|(_, dir)| dir)
}

fn occupied_neighbours(grid: &OccupancyGrid, cell: Cell) -> u32 {
    Direction::ALL
        .into_iter()
        .filter(|d| grid.try_get(cell.step(*d)).is_some_and(CellFlags::is_segment))
        .count() as u32
}
