//! Test utilities for Slither development.
//!
//! [`TestWorldBuilder`] assembles small deterministic worlds: explicit
//! agents and food, spawning off, one worker, no intent deadline.
//! [`fixtures`] holds the canonical scenarios used across test suites.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::time::Duration;

use slither_core::{Cell, Direction, Occurrence, OccurrenceKind};
use slither_engine::{
    AgentPlacement, AgentSeed, Engine, FoodConfig, FoodPlacement, TickReport, WorldConfig,
};
use slither_path::PathConfig;

/// Builder for small hand-laid worlds.
#[derive(Clone, Debug)]
pub struct TestWorldBuilder {
    width: u32,
    height: u32,
    sector_size: u32,
    agents: Vec<AgentSeed>,
    food: Vec<Cell>,
    max_food: usize,
    path: PathConfig,
    workers: usize,
    intent_budget: Option<Duration>,
    seed: u64,
}

impl TestWorldBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sector_size: 4,
            agents: Vec::new(),
            food: Vec::new(),
            max_food: 0,
            path: PathConfig::default(),
            workers: 1,
            intent_budget: None,
            seed: 0,
        }
    }

    /// Agent with an explicit body, head first.
    pub fn agent(mut self, body: &[(i32, i32)], facing: Direction) -> Self {
        let body = body.iter().map(|&rc| Cell::from(rc)).collect();
        self.agents.push(AgentSeed::new(body, facing));
        self
    }

    /// Straight agent trailing behind `head`.
    pub fn straight_agent(mut self, head: (i32, i32), facing: Direction, length: usize) -> Self {
        self.agents
            .push(AgentSeed::straight(Cell::from(head), facing, length));
        self
    }

    pub fn food(mut self, cell: (i32, i32)) -> Self {
        self.food.push(Cell::from(cell));
        self
    }

    /// Enable spawning up to `max_food` outstanding units.
    pub fn max_food(mut self, max_food: usize) -> Self {
        self.max_food = max_food;
        self
    }

    pub fn sector_size(mut self, size: u32) -> Self {
        self.sector_size = size;
        self
    }

    pub fn path(mut self, path: PathConfig) -> Self {
        self.path = path;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn intent_budget(mut self, budget: Option<Duration>) -> Self {
        self.intent_budget = budget;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> WorldConfig {
        WorldConfig {
            width: self.width,
            height: self.height,
            sector_size: self.sector_size,
            agents: AgentPlacement::Explicit(self.agents.clone()),
            food: FoodConfig {
                initial: FoodPlacement::Explicit(self.food.clone()),
                max_food: self.max_food,
                spawn_rate: if self.max_food == 0 { 0.0 } else { 1.0 },
                ..FoodConfig::default()
            },
            path: self.path.clone(),
            intent_budget: self.intent_budget,
            worker_threads: Some(self.workers),
            seed: self.seed,
            ..WorldConfig::default()
        }
    }

    /// Build the engine, panicking on invalid configuration.
    pub fn build(&self) -> Engine {
        match Engine::new(self.config()) {
            Ok(engine) => engine,
            Err(e) => panic!("test world rejected: {e}"),
        }
    }
}

/// Random world with unbounded intent budget, for determinism tests.
pub fn random_world(size: u32, agents: usize, seed: u64, workers: usize) -> WorldConfig {
    WorldConfig {
        width: size,
        height: size,
        sector_size: 8,
        agents: AgentPlacement::Random {
            count: agents,
            length: 3,
        },
        food: FoodConfig {
            initial: FoodPlacement::Random(agents),
            max_food: agents * 2,
            max_per_tick: 4,
            spawn_attempts: 16,
            spawn_rate: 0.5,
        },
        intent_budget: None,
        worker_threads: Some(workers),
        seed,
        ..WorldConfig::default()
    }
}

/// Step once, verify consistency, and return the report.
pub fn step_checked(engine: &mut Engine) -> TickReport {
    let report = engine.step();
    if let Err(e) = engine.verify_consistency() {
        panic!("inconsistent after tick {}: {e}", report.tick);
    }
    report
}

/// Occurrences of one kind, in order.
pub fn deaths(occurrences: &[Occurrence]) -> Vec<&OccurrenceKind> {
    occurrences
        .iter()
        .map(|o| &o.kind)
        .filter(|k| matches!(k, OccurrenceKind::Died { .. }))
        .collect()
}
