//! The tick engine: owns the world and advances it one frame per `step()`.

use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::{ThreadPool, ThreadPoolBuilder};

use slither_core::{
    AgentId, Cell, CellFlags, Direction, GridError, Occurrence, OccurrenceKind, TickId,
};
use slither_path::{Pathfinder, SearchScratch};
use slither_space::{OccupancyGrid, SectorTable};

use crate::agent::{Agent, LifeState};
use crate::commit::{Board, MoveOutcome};
use crate::config::{AgentPlacement, AgentSeed, ConfigError, FoodPlacement, WorldConfig};
use crate::consistency::{self, ConsistencyError};
use crate::egress::OccurrenceFeed;
use crate::food::{FoodIndex, FoodManager, FoodStats};
use crate::intent::{self, IntentView};
use crate::metrics::StepMetrics;
use crate::snapshot::WorldSnapshot;

/// Random placement tries per agent before giving up.
const PLACEMENT_ATTEMPTS: usize = 256;

/// Everything one `step()` produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// The tick just completed.
    pub tick: TickId,
    /// Occurrences in commit order.
    pub occurrences: Vec<Occurrence>,
    /// Timing and outcome counters.
    pub metrics: StepMetrics,
}

/// The simulation engine.
///
/// Each [`step()`](Self::step) runs, in order:
///
/// 1. **Intention** (parallel, read-only): every live agent asks the
///    pathfinder for a direction against the start-of-tick state.
/// 2. **Write-back**: each agent stores its own cache update.
/// 3. **Commit** (sequential, ascending id): moves are applied one by one
///    against the grid as already mutated; collisions mark agents dying.
///    Dying agents are then cleared from the grid in id order.
/// 4. **Cleanup**: dead agents are dropped, dirty flags reset, food spawned.
/// 5. **Emit**: occurrences are forwarded to subscribers.
///
/// `step()` is total: it never fails for a validly constructed engine.
pub struct Engine {
    board: Board,
    agents: Vec<Agent>,
    pathfinder: Pathfinder,
    scratch: Vec<SearchScratch>,
    pool: ThreadPool,
    rng: ChaCha8Rng,
    feed: OccurrenceFeed,
    tick: TickId,
    target_tick: Duration,
    intent_budget: Option<Duration>,
    occurrence_capacity: usize,
    seed: u64,
    last_metrics: StepMetrics,
}

impl Engine {
    /// Validate `config`, place agents and food, and build the worker pool.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut grid = OccupancyGrid::new(config.width, config.height)?;
        let sectors = SectorTable::new(config.width, config.height, config.sector_size)?;
        let mut food = FoodManager::new(
            &config.food,
            config.width,
            config.height,
            config.sector_size,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let agents = place_agents(&mut grid, &mut rng, &config.agents)?;
        match &config.food.initial {
            FoodPlacement::Random(n) => {
                let placed = food.scatter(&mut grid, &mut rng, *n);
                if placed.len() < *n {
                    tracing::warn!(
                        requested = *n,
                        placed = placed.len(),
                        "initial food truncated"
                    );
                }
            }
            FoodPlacement::Explicit(cells) => {
                for &cell in cells {
                    food.place(&mut grid, cell)?;
                }
            }
        }

        let workers = config.resolved_worker_count();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("slither-intent-{i}"))
            .build()
            .map_err(|e| ConfigError::ThreadPoolFailed {
                reason: e.to_string(),
            })?;
        let scratch = (0..workers)
            .map(|_| SearchScratch::new(grid.cell_count()))
            .collect();
        let pathfinder = Pathfinder::new(&config.path, grid.cell_count());

        tracing::info!(
            width = config.width,
            height = config.height,
            agents = agents.len(),
            food = food.count(),
            workers,
            max_expansions = pathfinder.max_expansions(),
            "engine initialised"
        );

        Ok(Self {
            board: Board {
                grid,
                sectors,
                food,
            },
            agents,
            pathfinder,
            scratch,
            pool,
            rng,
            feed: OccurrenceFeed::default(),
            tick: TickId(0),
            target_tick: config.target_tick,
            intent_budget: config.intent_budget,
            occurrence_capacity: config.occurrence_capacity,
            seed: config.seed,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Advance the world by one tick.
    pub fn step(&mut self) -> TickReport {
        let started = Instant::now();
        let tick = self.tick.next();
        let mut metrics = StepMetrics::default();
        let mut occurrences = Vec::new();

        // ── Intention ──────────────────────────────────────────
        let deadline = self.intent_budget.map(|b| started + b);
        let view = IntentView {
            grid: &self.board.grid,
            sectors: &self.board.sectors,
            food: self.board.food.index(),
            pathfinder: &self.pathfinder,
        };
        let proposals = intent::plan(&self.pool, &self.agents, &mut self.scratch, &view, deadline);
        let intent_done = Instant::now();

        // ── Write-back ─────────────────────────────────────────
        for (agent, proposal) in self.agents.iter_mut().zip(&proposals) {
            metrics.record(proposal);
            agent.absorb(proposal);
        }

        // ── Commit ─────────────────────────────────────────────
        for (agent, proposal) in self.agents.iter_mut().zip(&proposals) {
            let dir = proposal.direction(agent.facing());
            match self.board.commit_move(agent, dir, tick, &mut occurrences) {
                MoveOutcome::Moved { grew: true } => metrics.food_eaten += 1,
                MoveOutcome::Moved { grew: false } => {}
                MoveOutcome::Collided(_) => metrics.deaths += 1,
            }
        }
        for agent in self
            .agents
            .iter_mut()
            .filter(|a| a.state() == LifeState::Dying)
        {
            self.board.bury(agent, tick, &mut occurrences);
        }
        let commit_done = Instant::now();

        // ── Cleanup ────────────────────────────────────────────
        self.agents.retain(Agent::is_alive);
        metrics.live_agents = self.agents.len();
        metrics.dirty_sectors = self.board.sectors.reset_dirty_flags();
        let spawn = self.board.food.spawn_tick(&mut self.board.grid, &mut self.rng);
        for &cell in &spawn.cells {
            if let Err(err) = self.board.sectors.mark_dirty(cell) {
                tracing::error!(%err, "spawned food outside the grid");
            }
            occurrences.push(Occurrence {
                tick,
                kind: OccurrenceKind::FoodSpawned { cell },
            });
        }
        metrics.food_spawned = spawn.cells.len() as u32;
        metrics.grid_full_skips = u32::from(spawn.skipped.is_some());

        // ── Emit ───────────────────────────────────────────────
        metrics.occurrences_dropped = self.feed.publish(&occurrences);
        if metrics.occurrences_dropped > 0 {
            tracing::warn!(
                tick = %tick,
                dropped = metrics.occurrences_dropped,
                "subscriber queue full, occurrences dropped"
            );
        }
        self.tick = tick;

        let finished = Instant::now();
        metrics.intent_us = micros(intent_done - started);
        metrics.commit_us = micros(commit_done - intent_done);
        metrics.cleanup_us = micros(finished - commit_done);
        metrics.total_us = micros(finished - started);
        metrics.over_budget = finished - started > self.target_tick;
        if metrics.over_budget {
            tracing::warn!(
                tick = %tick,
                total_us = metrics.total_us,
                intents_skipped = metrics.intents_skipped,
                "tick exceeded target duration"
            );
        }
        tracing::debug!(
            tick = %tick,
            live = metrics.live_agents,
            deaths = metrics.deaths,
            eaten = metrics.food_eaten,
            cache_hits = metrics.cache_hits,
            computed = metrics.paths_computed,
            fallbacks = metrics.fallbacks,
            total_us = metrics.total_us,
            "tick complete"
        );

        self.last_metrics = metrics.clone();
        TickReport {
            tick,
            occurrences,
            metrics,
        }
    }

    /// Run `ticks` steps, returning every report.
    pub fn run(&mut self, ticks: usize) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step()).collect()
    }

    // ── Accessors ──────────────────────────────────────────────

    /// Last completed tick; `TickId(0)` before the first step.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Grid columns.
    pub fn width(&self) -> u32 {
        self.board.grid.width()
    }

    /// Grid rows.
    pub fn height(&self) -> u32 {
        self.board.grid.height()
    }

    /// Flags at `(row, col)`.
    pub fn cell(&self, row: i32, col: i32) -> Result<CellFlags, GridError> {
        self.board.grid.get(Cell::new(row, col))
    }

    /// The occupancy grid.
    pub fn grid(&self) -> &OccupancyGrid {
        &self.board.grid
    }

    /// The sector table.
    pub fn sectors(&self) -> &SectorTable {
        &self.board.sectors
    }

    /// Live agents in ascending id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The live agent with `id`.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents
            .binary_search_by_key(&id, Agent::id)
            .ok()
            .map(|i| &self.agents[i])
    }

    /// Outstanding food.
    pub fn food(&self) -> &FoodIndex {
        self.board.food.index()
    }

    /// Lifetime food counters.
    pub fn food_stats(&self) -> FoodStats {
        self.board.food.stats()
    }

    /// The pathfinder shared by all agents.
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    /// Metrics of the most recent tick.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Seed the engine was built with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Intent worker threads.
    pub fn worker_count(&self) -> usize {
        self.scratch.len()
    }

    /// Owned copy of the observable state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::new(
            self.tick,
            self.width(),
            self.height(),
            self.board.grid.cells(),
            &self.agents,
            self.board.food.index().iter(),
        )
    }

    /// Subscribe to occurrences with the configured queue capacity.
    pub fn subscribe(&mut self) -> Receiver<Occurrence> {
        self.feed.subscribe(self.occurrence_capacity)
    }

    /// Subscribe with an explicit queue capacity.
    pub fn subscribe_with_capacity(&mut self, capacity: usize) -> Receiver<Occurrence> {
        self.feed.subscribe(capacity)
    }

    /// Connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    /// Occurrences dropped on full subscriber queues since construction.
    pub fn occurrences_dropped(&self) -> u64 {
        self.feed.dropped_total()
    }

    /// Cross-check agents, grid and food index.
    pub fn verify_consistency(&self) -> Result<(), ConsistencyError> {
        consistency::check(&self.board.grid, &self.agents, self.board.food.index())
    }
}

fn place_agents<R: Rng + ?Sized>(
    grid: &mut OccupancyGrid,
    rng: &mut R,
    placement: &AgentPlacement,
) -> Result<Vec<Agent>, ConfigError> {
    let mut agents = Vec::with_capacity(placement.count());
    match placement {
        AgentPlacement::Explicit(seeds) => {
            for (i, seed) in seeds.iter().enumerate() {
                place_seed(grid, seed)?;
                agents.push(Agent::new(
                    AgentId(i as u32),
                    seed.body.iter().copied(),
                    seed.facing,
                ));
            }
        }
        AgentPlacement::Random { count, length } => {
            for i in 0..*count {
                let seed = (0..PLACEMENT_ATTEMPTS)
                    .find_map(|_| {
                        let head = Cell::new(
                            rng.random_range(0..grid.height()) as i32,
                            rng.random_range(0..grid.width()) as i32,
                        );
                        let facing = Direction::ALL[rng.random_range(0..4usize)];
                        let seed = AgentSeed::straight(head, facing, *length);
                        seed.body
                            .iter()
                            .all(|c| grid.try_get(*c) == Some(CellFlags::EMPTY))
                            .then_some(seed)
                    })
                    .ok_or(ConfigError::PlacementFailed {
                        placed: i,
                        requested: *count,
                    })?;
                place_seed(grid, &seed)?;
                agents.push(Agent::new(AgentId(i as u32), seed.body, seed.facing));
            }
        }
    }
    Ok(agents)
}

fn place_seed(grid: &mut OccupancyGrid, seed: &AgentSeed) -> Result<(), GridError> {
    let (head, rest) = seed.body.split_at(1.min(seed.body.len()));
    grid.place_head(head)?;
    grid.place_body(rest)
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}
