//! Replaying a seed reproduces every tick, regardless of worker count.

use slither_engine::hash::{grid_hash, occurrences_hash};
use slither_engine::{ConfigError, Engine, WorldConfig};
use slither_test_utils::{random_world, step_checked};

/// Per-tick (occurrence hash, grid hash) pairs.
fn trace(config: WorldConfig, ticks: usize) -> Vec<(u64, u64)> {
    let mut engine = Engine::new(config).expect("valid config");
    (0..ticks)
        .map(|_| {
            let report = step_checked(&mut engine);
            (
                occurrences_hash(&report.occurrences),
                grid_hash(engine.grid().cells()),
            )
        })
        .collect()
}

#[test]
fn same_seed_same_trace() {
    let a = trace(random_world(32, 24, 7, 1), 60);
    let b = trace(random_world(32, 24, 7, 1), 60);
    assert_eq!(a, b);
}

#[test]
fn worker_count_does_not_change_outcome() {
    let serial = trace(random_world(48, 64, 11, 1), 40);
    let parallel = trace(random_world(48, 64, 11, 4), 40);
    assert_eq!(serial, parallel);
}

#[test]
fn different_seeds_diverge() {
    let a = trace(random_world(32, 24, 1, 1), 20);
    let b = trace(random_world(32, 24, 2, 1), 20);
    assert_ne!(a, b);
}

#[test]
fn snapshots_match_between_replays() {
    let mut a = Engine::new(random_world(24, 12, 3, 2)).expect("valid config");
    let mut b = Engine::new(random_world(24, 12, 3, 3)).expect("valid config");
    a.run(25);
    b.run(25);
    assert_eq!(a.snapshot(), b.snapshot());
}

// ── Construction failures ──────────────────────────────────────

#[test]
fn zero_dimension_is_rejected() {
    let mut config = random_world(8, 1, 0, 1);
    config.height = 0;
    assert!(matches!(
        Engine::new(config),
        Err(ConfigError::EmptyGrid {
            width: 8,
            height: 0
        })
    ));
}

#[test]
fn zero_agents_is_rejected() {
    let config = random_world(8, 0, 0, 1);
    assert!(matches!(Engine::new(config), Err(ConfigError::NoAgents)));
}

#[test]
fn overcrowded_grid_fails_placement() {
    let config = random_world(4, 16, 0, 1);
    assert!(matches!(
        Engine::new(config),
        Err(ConfigError::PlacementFailed { requested: 16, .. })
    ));
}
