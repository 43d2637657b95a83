//! Slither: a deterministic multi-agent snake simulation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Slither sub-crates. Most users only need this one dependency.
//!
//! # Quick start
//!
//! ```rust
//! use slither::prelude::*;
//!
//! // One three-cell agent heading east toward a single food unit.
//! let config = WorldConfig {
//!     width: 8,
//!     height: 8,
//!     agents: AgentPlacement::Explicit(vec![AgentSeed::straight(
//!         Cell::new(4, 4),
//!         Direction::East,
//!         3,
//!     )]),
//!     food: FoodConfig {
//!         initial: FoodPlacement::Explicit(vec![Cell::new(4, 7)]),
//!         max_food: 0,
//!         spawn_rate: 0.0,
//!         ..FoodConfig::default()
//!     },
//!     intent_budget: None,
//!     worker_threads: Some(1),
//!     ..WorldConfig::default()
//! };
//! let mut engine = Engine::new(config).unwrap();
//! engine.run(3);
//! assert_eq!(engine.tick(), TickId(3));
//! assert_eq!(engine.agents()[0].head(), Cell::new(4, 7));
//! assert_eq!(engine.agents()[0].len(), 4);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `slither-core` | Cells, directions, flags, ids, occurrences, errors |
//! | [`space`] | `slither-space` | Occupancy grid and sector version table |
//! | [`path`] | `slither-path` | A* search, fallback search, path cache |
//! | [`engine`] | `slither-engine` | Tick engine, configuration, food, snapshots |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`slither-core`).
pub use slither_core as types;

/// Occupancy grid and sectors (`slither-space`).
///
/// [`space::OccupancyGrid`] stores one [`types::CellFlags`] byte per cell;
/// [`space::SectorTable`] versions fixed-size square regions of it.
pub use slither_space as space;

/// Pathfinding (`slither-path`).
///
/// [`path::Pathfinder::next_direction`] answers one agent's query per tick,
/// reusing a [`path::CachedPath`] while the sectors it crosses are unchanged.
pub use slither_path as path;

/// The tick engine (`slither-engine`).
pub use slither_engine as engine;

/// Common imports for typical Slither usage.
///
/// ```rust
/// use slither::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use slither_core::{
        AgentId, Cell, CellFlags, DeathCause, Direction, Occurrence, OccurrenceKind, TickId,
    };

    // Errors
    pub use slither_core::{GridError, NoSafeMove};

    // Engine
    pub use slither_engine::{
        AgentPlacement, AgentSeed, ConfigError, Engine, FoodConfig, FoodPlacement, StepMetrics,
        TickReport, WorldConfig, WorldSnapshot,
    };

    // Pathfinding
    pub use slither_path::PathConfig;
}
