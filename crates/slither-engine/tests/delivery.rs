//! Snapshots and occurrence subscribers.

use slither_core::{Cell, CellFlags, OccurrenceKind, TickId, CELL_ENCODING_VERSION};
use slither_engine::hash::occurrences_hash;
use slither_test_utils::fixtures::{contested_cell, food_run};
use slither_test_utils::{random_world, step_checked};

// ── Snapshot tests ─────────────────────────────────────────────

#[test]
fn snapshot_is_idempotent_between_steps() {
    let mut engine = food_run().build();
    step_checked(&mut engine);
    let first = engine.snapshot();
    let second = engine.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.tick, TickId(1));
    assert_eq!(first.encoding_version, CELL_ENCODING_VERSION);
}

#[test]
fn snapshot_reflects_grid() {
    let engine = food_run().build();
    let snap = engine.snapshot();
    assert_eq!(snap.cells.len(), 16);
    assert_eq!(snap.cell(Cell::new(1, 1)), Some(CellFlags::HEAD));
    assert_eq!(snap.cell(Cell::new(1, 0)), Some(CellFlags::BODY));
    assert_eq!(snap.cell(Cell::new(1, 3)), Some(CellFlags::FOOD));
    assert_eq!(snap.cell(Cell::new(4, 0)), None);
    assert_eq!(snap.food, vec![Cell::new(1, 3)]);
    let agent = &snap.agents[0];
    assert_eq!(agent.body, vec![Cell::new(1, 1), Cell::new(1, 0)]);
    assert_eq!(snap.cell_bytes()[5], CellFlags::HEAD.bits());
}

#[test]
fn snapshot_outlives_later_steps() {
    let mut engine = food_run().build();
    let before = engine.snapshot();
    step_checked(&mut engine);
    step_checked(&mut engine);
    assert_eq!(before.cell(Cell::new(1, 3)), Some(CellFlags::FOOD));
    assert_ne!(before, engine.snapshot());
}

// ── Subscriber tests ───────────────────────────────────────────

#[test]
fn subscriber_sees_report_occurrences_in_order() {
    let mut engine = contested_cell(false).build();
    let rx = engine.subscribe();
    let report = step_checked(&mut engine);
    let received: Vec<_> = rx.try_iter().collect();
    assert_eq!(received, report.occurrences);
    assert!(matches!(
        received.first().map(|o| &o.kind),
        Some(OccurrenceKind::FoodEaten { .. })
    ));
}

#[test]
fn full_queue_drops_without_blocking() {
    let mut engine = slither_engine::Engine::new(random_world(32, 24, 5, 1)).expect("valid config");
    let rx = engine.subscribe_with_capacity(1);
    let report = step_checked(&mut engine);
    assert!(report.occurrences.len() > 1);
    assert_eq!(
        report.metrics.occurrences_dropped,
        report.occurrences.len() as u64 - 1
    );
    assert_eq!(engine.occurrences_dropped(), report.metrics.occurrences_dropped);
    assert_eq!(rx.try_iter().count(), 1);
}

#[test]
fn disconnected_subscriber_is_forgotten() {
    let mut engine = slither_engine::Engine::new(random_world(16, 8, 5, 1)).expect("valid config");
    let keep = engine.subscribe();
    drop(engine.subscribe());
    assert_eq!(engine.subscriber_count(), 2);
    let report = step_checked(&mut engine);
    assert_eq!(engine.subscriber_count(), 1);
    assert_eq!(
        occurrences_hash(&keep.try_iter().collect::<Vec<_>>()),
        occurrences_hash(&report.occurrences)
    );
}
