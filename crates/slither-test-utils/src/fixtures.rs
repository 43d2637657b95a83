//! Canonical hand-laid scenarios.

use std::time::Duration;

use slither_core::Direction;

use crate::TestWorldBuilder;

/// 4×4 grid; a two-cell agent at (1,1)/(1,0) facing east, food at (1,3).
/// Two ticks later the head sits on the food cell.
pub fn food_run() -> TestWorldBuilder {
    TestWorldBuilder::new(4, 4)
        .agent(&[(1, 1), (1, 0)], Direction::East)
        .food((1, 3))
}

/// 5×5 grid; two agents heading for the same food cell (2,2) from
/// opposite sides. With `swap` false the west agent gets the lower id.
pub fn contested_cell(swap: bool) -> TestWorldBuilder {
    let west: &[(i32, i32)] = &[(2, 1), (2, 0)];
    let east: &[(i32, i32)] = &[(2, 3), (2, 4)];
    let builder = TestWorldBuilder::new(5, 5);
    let builder = if swap {
        builder
            .agent(east, Direction::West)
            .agent(west, Direction::East)
    } else {
        builder
            .agent(west, Direction::East)
            .agent(east, Direction::West)
    };
    builder.food((2, 2))
}

/// 5×5 grid; two agents one cell either side of the empty cell (2,2),
/// both facing it. A zero intent budget makes both hold their heading, so
/// both commit a move into (2,2). With `swap` false the west agent gets
/// the lower id.
pub fn contested_empty_cell(swap: bool) -> TestWorldBuilder {
    let west: &[(i32, i32)] = &[(2, 1), (2, 0)];
    let east: &[(i32, i32)] = &[(2, 3), (2, 4)];
    let builder = TestWorldBuilder::new(5, 5).intent_budget(Some(Duration::ZERO));
    if swap {
        builder
            .agent(east, Direction::West)
            .agent(west, Direction::East)
    } else {
        builder
            .agent(west, Direction::East)
            .agent(east, Direction::West)
    }
}

/// 3×3 grid filled by one agent whose head is at the centre.
pub fn enclosed() -> TestWorldBuilder {
    TestWorldBuilder::new(3, 3).agent(
        &[
            (1, 1),
            (0, 1),
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
            (1, 2),
            (0, 2),
        ],
        Direction::South,
    )
}
