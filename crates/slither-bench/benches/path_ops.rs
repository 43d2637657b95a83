//! Criterion micro-benchmarks for path search and cache validation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use slither_bench::corridor_grid;
use slither_core::{AgentId, Direction};
use slither_path::{CacheAction, PathConfig, PathQuery, Pathfinder, SearchScratch};
use slither_space::SectorTable;

fn bench_astar_corridor(c: &mut Criterion) {
    let (grid, start, goal) = corridor_grid(64);
    let sectors = SectorTable::new(64, 64, 16).unwrap();
    let config = PathConfig {
        max_expansions: Some(4096),
        ..PathConfig::default()
    };
    let pathfinder = Pathfinder::new(&config, grid.cell_count());
    let mut scratch = SearchScratch::new(grid.cell_count());
    let query = PathQuery {
        agent: AgentId(0),
        head: start,
        tail: None,
        facing: Direction::East,
        cache: None,
    };

    c.bench_function("astar_corridor_64", |b| {
        b.iter(|| {
            let decision = pathfinder
                .next_direction(&query, &grid, &sectors, &Some(goal), &mut scratch)
                .unwrap();
            black_box(decision);
        });
    });
}

fn bench_cache_check(c: &mut Criterion) {
    let (grid, start, goal) = corridor_grid(64);
    let sectors = SectorTable::new(64, 64, 16).unwrap();
    let config = PathConfig {
        max_expansions: Some(4096),
        ..PathConfig::default()
    };
    let pathfinder = Pathfinder::new(&config, grid.cell_count());
    let mut scratch = SearchScratch::new(grid.cell_count());
    let query = PathQuery {
        agent: AgentId(0),
        head: start,
        tail: None,
        facing: Direction::East,
        cache: None,
    };
    let decision = pathfinder
        .next_direction(&query, &grid, &sectors, &Some(goal), &mut scratch)
        .unwrap();
    let CacheAction::Replace(path) = decision.cache else {
        panic!("expected a fresh path");
    };

    c.bench_function("cache_check_corridor_64", |b| {
        b.iter(|| {
            let check = path.check(path.expected_head(), &sectors);
            black_box(check);
        });
    });
}

criterion_group!(benches, bench_astar_corridor, bench_cache_check);
criterion_main!(benches);
