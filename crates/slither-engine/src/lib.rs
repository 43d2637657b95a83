//! Tick engine for the Slither snake simulation.
//!
//! [`Engine`] owns the occupancy grid, sector table, agents and food, and
//! advances them with a two-phase protocol: a parallel, read-only intention
//! phase on a rayon pool, then a sequential commit in ascending agent id.
//! Commit order is the sole arbiter of contested cells, so runs with the
//! same seed and configuration are bit-for-bit reproducible.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
mod commit;
pub mod config;
mod consistency;
mod egress;
pub mod food;
pub mod hash;
mod intent;
pub mod metrics;
pub mod snapshot;
pub mod tick;

pub use agent::{Agent, AgentStats, LifeState};
pub use config::{AgentPlacement, AgentSeed, ConfigError, FoodConfig, FoodPlacement, WorldConfig};
pub use consistency::ConsistencyError;
pub use food::{FoodIndex, FoodManager, FoodStats, SpawnError, SpawnReport};
pub use metrics::StepMetrics;
pub use snapshot::{AgentView, WorldSnapshot};
pub use tick::{Engine, TickReport};
