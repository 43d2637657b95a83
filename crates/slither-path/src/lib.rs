//! Pathfinding for Slither agents.
//!
//! [`Pathfinder::next_direction`] answers "which way should this agent move
//! this tick". It first tries the agent's [`CachedPath`], validated against
//! sector versions from the [`SectorTable`](slither_space::SectorTable). On a
//! miss it runs a node-capped A* toward the nearest target, and if that is
//! inconclusive it falls back to a bounded breadth-first safe-move search.
//!
//! All search storage lives in a caller-owned [`SearchScratch`] sized to the
//! grid, so a query never allocates beyond the cached path it returns.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod astar;
pub mod cache;
pub mod config;
mod fallback;
pub mod pathfinder;
pub mod scratch;

pub use cache::{CacheCheck, CachedPath, CaptureError, SectorRun, StaleReason};
pub use config::PathConfig;
pub use pathfinder::{
    CacheAction, FallbackReason, PathDecision, PathOutcome, PathQuery, Pathfinder, TargetSource,
};
pub use scratch::SearchScratch;
