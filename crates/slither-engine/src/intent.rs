//! Parallel intention phase.
//!
//! Agents are split into one contiguous chunk per worker. Each worker owns
//! one [`SearchScratch`], reads the shared start-of-tick state through an
//! [`IntentView`], and writes only its own slice of proposal slots. Nothing
//! shared is mutated until the phase returns.

use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;

use slither_core::{Direction, NoSafeMove};
use slither_path::{PathDecision, Pathfinder, SearchScratch};
use slither_space::{OccupancyGrid, SectorTable};

use crate::agent::Agent;
use crate::food::FoodIndex;

/// Read-only state shared by every worker during the intention phase.
pub(crate) struct IntentView<'a> {
    pub grid: &'a OccupancyGrid,
    pub sectors: &'a SectorTable,
    pub food: &'a FoodIndex,
    pub pathfinder: &'a Pathfinder,
}

/// One agent's intended move.
#[derive(Clone, Debug)]
pub(crate) enum Proposal {
    /// The pathfinder chose a direction.
    Planned(PathDecision),
    /// Every neighbour was blocked.
    Boxed(NoSafeMove),
    /// Not computed before the intent deadline.
    Skipped,
}

impl Proposal {
    /// Direction to commit. Boxed and skipped agents continue straight.
    pub(crate) fn direction(&self, facing: Direction) -> Direction {
        match self {
            Self::Planned(decision) => decision.direction,
            Self::Boxed(_) | Self::Skipped => facing,
        }
    }
}

/// Compute a proposal for every agent, in agent order.
pub(crate) fn plan(
    pool: &ThreadPool,
    agents: &[Agent],
    scratch: &mut [SearchScratch],
    view: &IntentView<'_>,
    deadline: Option<Instant>,
) -> Vec<Proposal> {
    let mut proposals: Vec<Proposal> = agents.iter().map(|_| Proposal::Skipped).collect();
    if agents.is_empty() || scratch.is_empty() {
        return proposals;
    }
    let chunk = agents.len().div_ceil(scratch.len());
    pool.install(|| {
        proposals
            .par_chunks_mut(chunk)
            .zip(agents.par_chunks(chunk))
            .zip(scratch.par_iter_mut())
            .for_each(|((slots, group), scratch)| {
                for (slot, agent) in slots.iter_mut().zip(group) {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        break;
                    }
                    *slot = agent.propose(view, scratch);
                }
            });
    });
    proposals
}
