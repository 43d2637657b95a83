//! Criterion benchmarks for full engine ticks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use slither_bench::{reference_profile, stress_profile};
use slither_engine::Engine;

fn bench_tick_reference(c: &mut Criterion) {
    let mut engine = Engine::new(reference_profile(42)).unwrap();

    // Warm up: first tick computes every path from scratch.
    engine.step();

    c.bench_function("tick_256x256_2k_agents", |b| {
        b.iter(|| {
            let report = engine.step();
            black_box(&report);
        });
    });
}

fn bench_tick_stress(c: &mut Criterion) {
    let mut engine = Engine::new(stress_profile(42)).unwrap();
    engine.step();

    c.bench_function("tick_512x512_5k_agents", |b| {
        b.iter(|| {
            let report = engine.step();
            black_box(&report);
        });
    });
}

fn bench_100_ticks_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("episode");
    group.sample_size(10);
    group.bench_function("100_ticks_256x256", |b| {
        b.iter(|| {
            let mut engine = Engine::new(reference_profile(42)).unwrap();
            for _ in 0..100 {
                black_box(engine.step());
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_tick_reference,
    bench_tick_stress,
    bench_100_ticks_reference
);
criterion_main!(benches);
