//! Headless run of the reference profile.
//!
//! Usage: `cargo run --release --example headless -- [ticks] [seed]`
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=slither_engine=debug`.

use slither_bench::reference_profile;
use slither_engine::Engine;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let ticks: usize = args.next().and_then(|a| a.parse().ok()).unwrap_or(600);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);

    let mut engine = match Engine::new(reference_profile(seed)) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(%e, "invalid configuration");
            std::process::exit(1);
        }
    };
    let feed = engine.subscribe();

    let mut total_us = 0u64;
    let mut worst_us = 0u64;
    let mut over_budget = 0usize;
    let mut deaths = 0u64;
    for _ in 0..ticks {
        let report = engine.step();
        let m = &report.metrics;
        total_us += m.total_us;
        worst_us = worst_us.max(m.total_us);
        over_budget += usize::from(m.over_budget);
        deaths += u64::from(m.deaths);

        if report.tick.0 % 100 == 0 {
            tracing::info!(
                tick = %report.tick,
                live = m.live_agents,
                food = engine.food().len(),
                hit_rate = format!("{:.2}", m.cache_hit_rate()),
                total_us = m.total_us,
                "progress"
            );
        }
        // Drain so the bounded queue never fills.
        feed.try_iter().for_each(drop);
    }

    let ticks = ticks.max(1) as u64;
    println!("ticks:        {ticks}");
    println!("survivors:    {}", engine.agents().len());
    println!("deaths:       {deaths}");
    println!("food spawned: {}", engine.food_stats().spawned);
    println!("mean tick:    {}us", total_us / ticks);
    println!("worst tick:   {worst_us}us");
    println!("over budget:  {over_budget}");
    println!("dropped:      {}", engine.occurrences_dropped());
}
