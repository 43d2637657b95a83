//! World configuration, validation, and error types.
//!
//! [`WorldConfig`] is the input for constructing an [`Engine`](crate::Engine).
//! [`validate()`](WorldConfig::validate) checks structural invariants before
//! anything is allocated; placement failures surface from the constructor.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use slither_core::{Cell, Direction, GridError};
use slither_path::PathConfig;
use slither_space::{OccupancyGrid, SpaceError, DEFAULT_SECTOR_SIZE};

// ── Agent placement ────────────────────────────────────────────────

/// Initial body and heading of one agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentSeed {
    /// Body cells, head first.
    pub body: Vec<Cell>,
    /// Initial heading.
    pub facing: Direction,
}

impl AgentSeed {
    /// Agent with an explicit body.
    pub fn new(body: Vec<Cell>, facing: Direction) -> Self {
        Self { body, facing }
    }

    /// Straight agent of `length` cells whose body trails behind `head`,
    /// opposite to `facing`.
    pub fn straight(head: Cell, facing: Direction, length: usize) -> Self {
        let back = facing.opposite();
        let mut body = Vec::with_capacity(length);
        let mut at = head;
        for _ in 0..length {
            body.push(at);
            at = at.step(back);
        }
        Self { body, facing }
    }

    fn check(&self) -> Result<(), String> {
        let Some(&head) = self.body.first() else {
            return Err("empty body".to_string());
        };
        let mut seen = HashSet::with_capacity(self.body.len());
        for pair in self.body.windows(2) {
            if pair[0].direction_to(pair[1]).is_none() {
                return Err(format!("{} and {} are not adjacent", pair[0], pair[1]));
            }
        }
        for cell in &self.body {
            if !seen.insert(*cell) {
                return Err(format!("duplicate cell {cell}"));
            }
        }
        if self.body.get(1) == Some(&head.step(self.facing)) {
            return Err(format!("facing {} points into the neck", self.facing));
        }
        Ok(())
    }
}

/// How agents are created at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentPlacement {
    /// `count` straight agents of `length` cells at seeded random free
    /// positions and headings.
    Random {
        /// Number of agents.
        count: usize,
        /// Initial body length.
        length: usize,
    },
    /// Agents with exact bodies, assigned ids in list order.
    Explicit(Vec<AgentSeed>),
}

impl AgentPlacement {
    /// Number of agents requested.
    pub fn count(&self) -> usize {
        match self {
            Self::Random { count, .. } => *count,
            Self::Explicit(seeds) => seeds.len(),
        }
    }
}

// ── Food ───────────────────────────────────────────────────────────

/// How food is placed at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoodPlacement {
    /// Up to `n` units at seeded random empty cells.
    Random(usize),
    /// Food at exactly these cells.
    Explicit(Vec<Cell>),
}

/// Food manager settings.
#[derive(Clone, Debug, PartialEq)]
pub struct FoodConfig {
    /// Food placed before the first tick.
    pub initial: FoodPlacement,
    /// Maximum outstanding food. Zero disables spawning.
    pub max_food: usize,
    /// Maximum units spawned in one tick.
    pub max_per_tick: usize,
    /// Maximum random cells sampled in one tick.
    pub spawn_attempts: usize,
    /// Base probability of a spawn round each tick, in `[0, 1]`. Boosted
    /// by scarcity: `rate × (2 − outstanding / max_food)`, capped at 1.
    pub spawn_rate: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            initial: FoodPlacement::Random(32),
            max_food: 64,
            max_per_tick: 8,
            spawn_attempts: 32,
            spawn_rate: 0.5,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`WorldConfig::validate()`] or during engine
/// construction.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    EmptyGrid {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Grid or sector table construction failed.
    Space(SpaceError),
    /// No agents requested.
    NoAgents,
    /// Random placement with a zero body length.
    ZeroLength,
    /// An explicit agent body is malformed.
    InvalidAgentBody {
        /// Position in the explicit list.
        index: usize,
        /// What is wrong.
        reason: String,
    },
    /// Two start positions (agents or explicit food) share a cell, or one
    /// lies off the grid.
    InvalidStart(GridError),
    /// Random placement could not fit every agent.
    PlacementFailed {
        /// Agents placed before giving up.
        placed: usize,
        /// Agents requested.
        requested: usize,
    },
    /// `spawn_rate` is NaN or outside `[0, 1]`.
    InvalidSpawnRate {
        /// The invalid value.
        value: f64,
    },
    /// `target_tick` is zero.
    ZeroTickDuration,
    /// Pathfinder settings are unusable.
    InvalidPath {
        /// What is wrong.
        reason: String,
    },
    /// `occurrence_capacity` is zero.
    ZeroOccurrenceCapacity,
    /// The intent worker pool could not be built.
    ThreadPoolFailed {
        /// Error reported by the pool builder.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { width, height } => {
                write!(f, "grid must be non-empty, got {width}x{height}")
            }
            Self::Space(e) => write!(f, "space: {e}"),
            Self::NoAgents => write!(f, "at least one agent is required"),
            Self::ZeroLength => write!(f, "initial agent length must be at least 1"),
            Self::InvalidAgentBody { index, reason } => {
                write!(f, "agent {index} has an invalid body: {reason}")
            }
            Self::InvalidStart(e) => write!(f, "invalid start position: {e}"),
            Self::PlacementFailed { placed, requested } => {
                write!(f, "placed only {placed} of {requested} agents")
            }
            Self::InvalidSpawnRate { value } => {
                write!(f, "spawn_rate must be in [0, 1], got {value}")
            }
            Self::ZeroTickDuration => write!(f, "target_tick must be positive"),
            Self::InvalidPath { reason } => write!(f, "invalid path config: {reason}"),
            Self::ZeroOccurrenceCapacity => {
                write!(f, "occurrence_capacity must be at least 1")
            }
            Self::ThreadPoolFailed { reason } => {
                write!(f, "intent thread pool failed: {reason}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::InvalidStart(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        Self::InvalidStart(e)
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Complete configuration for constructing an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Sector edge length. Default: 16.
    pub sector_size: u32,
    /// Initial agents.
    pub agents: AgentPlacement,
    /// Food settings.
    pub food: FoodConfig,
    /// Pathfinder settings.
    pub path: PathConfig,
    /// Frame budget the tick is expected to fit in. Default: 16ms.
    pub target_tick: Duration,
    /// Deadline for the intention phase, measured from tick start. Agents
    /// not planned in time hold their heading. `None` = unbounded.
    /// Default: `Some(target_tick)`.
    pub intent_budget: Option<Duration>,
    /// Intent worker threads. `None` = auto-detect.
    pub worker_threads: Option<usize>,
    /// RNG seed for placement and food spawning.
    pub seed: u64,
    /// Default queue capacity for occurrence subscribers. Default: 4096.
    pub occurrence_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        let target_tick = Duration::from_millis(16);
        Self {
            width: 64,
            height: 64,
            sector_size: DEFAULT_SECTOR_SIZE,
            agents: AgentPlacement::Random {
                count: 32,
                length: 3,
            },
            food: FoodConfig::default(),
            path: PathConfig::default(),
            target_tick,
            intent_budget: Some(target_tick),
            worker_threads: None,
            seed: 0,
            occurrence_capacity: 4096,
        }
    }
}

impl WorldConfig {
    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Non-empty grid within the supported size.
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value > OccupancyGrid::MAX_DIM {
                return Err(SpaceError::DimensionTooLarge {
                    name,
                    value,
                    max: OccupancyGrid::MAX_DIM,
                }
                .into());
            }
        }
        // 2. Sector size >= 1.
        if self.sector_size == 0 {
            return Err(SpaceError::InvalidSectorSize { value: 0 }.into());
        }
        // 3. At least one agent, each well formed.
        match &self.agents {
            AgentPlacement::Random { count, length } => {
                if *count == 0 {
                    return Err(ConfigError::NoAgents);
                }
                if *length == 0 {
                    return Err(ConfigError::ZeroLength);
                }
            }
            AgentPlacement::Explicit(seeds) => {
                if seeds.is_empty() {
                    return Err(ConfigError::NoAgents);
                }
                for (index, seed) in seeds.iter().enumerate() {
                    seed.check()
                        .map_err(|reason| ConfigError::InvalidAgentBody { index, reason })?;
                }
            }
        }
        // 4. Spawn rate is a probability.
        let rate = self.food.spawn_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidSpawnRate { value: rate });
        }
        // 5. Positive frame budget.
        if self.target_tick.is_zero() {
            return Err(ConfigError::ZeroTickDuration);
        }
        // 6. Pathfinder bounds.
        if self.path.max_expansions == Some(0) {
            return Err(ConfigError::InvalidPath {
                reason: "max_expansions must be at least 1".to_string(),
            });
        }
        if self.path.fallback_nodes == 0 {
            return Err(ConfigError::InvalidPath {
                reason: "fallback_nodes must be at least 1".to_string(),
            });
        }
        // 7. Subscriber queues hold at least one occurrence.
        if self.occurrence_capacity == 0 {
            return Err(ConfigError::ZeroOccurrenceCapacity);
        }
        Ok(())
    }

    /// Resolve the intent worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`; auto-detection uses the
    /// available parallelism clamped to `[1, 16]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_threads {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(seeds: Vec<AgentSeed>) -> WorldConfig {
        WorldConfig {
            width: 8,
            height: 8,
            agents: AgentPlacement::Explicit(seeds),
            ..WorldConfig::default()
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let cfg = WorldConfig {
            width: 0,
            ..WorldConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EmptyGrid {
                width: 0,
                height: 64
            })
        );
    }

    #[test]
    fn zero_agents_rejected() {
        let cfg = WorldConfig {
            agents: AgentPlacement::Random {
                count: 0,
                length: 3,
            },
            ..WorldConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoAgents));
        assert_eq!(explicit(vec![]).validate(), Err(ConfigError::NoAgents));
    }

    #[test]
    fn zero_sector_size_rejected() {
        let cfg = WorldConfig {
            sector_size: 0,
            ..WorldConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::Space(SpaceError::InvalidSectorSize { value: 0 }))
        );
    }

    #[test]
    fn bad_spawn_rate_rejected() {
        for value in [f64::NAN, -0.1, 1.5] {
            let mut cfg = WorldConfig::default();
            cfg.food.spawn_rate = value;
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidSpawnRate { .. })
            ));
        }
    }

    #[test]
    fn malformed_bodies_rejected() {
        let gap = AgentSeed::new(vec![Cell::new(0, 0), Cell::new(0, 2)], Direction::West);
        assert!(matches!(
            explicit(vec![gap]).validate(),
            Err(ConfigError::InvalidAgentBody { index: 0, .. })
        ));
        let into_neck = AgentSeed::new(vec![Cell::new(0, 1), Cell::new(0, 0)], Direction::West);
        assert!(matches!(
            explicit(vec![into_neck]).validate(),
            Err(ConfigError::InvalidAgentBody { .. })
        ));
        let ok = AgentSeed::straight(Cell::new(3, 3), Direction::East, 3);
        assert_eq!(explicit(vec![ok]).validate(), Ok(()));
    }

    #[test]
    fn straight_seed_trails_behind_head() {
        let seed = AgentSeed::straight(Cell::new(2, 5), Direction::East, 3);
        assert_eq!(
            seed.body,
            vec![Cell::new(2, 5), Cell::new(2, 4), Cell::new(2, 3)]
        );
    }

    #[test]
    fn worker_count_resolution() {
        let mut cfg = WorldConfig {
            worker_threads: Some(0),
            ..WorldConfig::default()
        };
        assert_eq!(cfg.resolved_worker_count(), 1);
        cfg.worker_threads = Some(500);
        assert_eq!(cfg.resolved_worker_count(), 64);
        cfg.worker_threads = None;
        let n = cfg.resolved_worker_count();
        assert!((1..=16).contains(&n));
    }
}
