//! Benchmark profiles for the Slither simulation engine.
//!
//! - [`reference_profile`]: 256x256 grid with 2,000 agents
//! - [`stress_profile`]: 512x512 grid with 5,000 agents
//! - [`corridor_grid`]: an obstacle-free grid with one long body wall, for
//!   pathfinder micro-benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::time::Duration;

use slither_core::Cell;
use slither_engine::{AgentPlacement, FoodConfig, FoodPlacement, WorldConfig};
use slither_space::OccupancyGrid;

/// Reference profile: 256x256 grid (65K cells), 2,000 agents of length 4.
///
/// Food is kept at roughly one unit per agent. The intent budget is off so
/// every agent plans every tick and timings measure the full workload.
pub fn reference_profile(seed: u64) -> WorldConfig {
    profile(256, 2_000, seed)
}

/// Stress profile: 512x512 grid (262K cells), 5,000 agents of length 4.
pub fn stress_profile(seed: u64) -> WorldConfig {
    profile(512, 5_000, seed)
}

fn profile(size: u32, agents: usize, seed: u64) -> WorldConfig {
    WorldConfig {
        width: size,
        height: size,
        sector_size: 16,
        agents: AgentPlacement::Random { count: agents, length: 4 },
        food: FoodConfig {
            initial: FoodPlacement::Random(agents),
            max_food: agents,
            max_per_tick: agents / 20,
            spawn_attempts: 64,
            spawn_rate: 1.0,
        },
        target_tick: Duration::from_millis(16),
        intent_budget: None,
        seed,
        ..WorldConfig::default()
    }
}

/// A `size`x`size` grid with a body wall down the middle column, open at
/// the bottom row. Returns the grid plus a start and goal on either side.
pub fn corridor_grid(size: u32) -> (OccupancyGrid, Cell, Cell) {
    let mut grid = match OccupancyGrid::new(size, size) {
        Ok(grid) => grid,
        Err(e) => panic!("corridor grid {size}x{size}: {e}"),
    };
    let mid = (size / 2) as i32;
    let wall: Vec<Cell> = (0..size as i32 - 1).map(|row| Cell::new(row, mid)).collect();
    if let Err(e) = grid.place_body(&wall) {
        panic!("corridor wall: {e}");
    }
    (grid, Cell::new(0, 0), Cell::new(0, size as i32 - 1))
}
