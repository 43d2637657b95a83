//! Cross-checks between agents, the grid, and the food index.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use slither_core::{AgentId, Cell, CellFlags};
use slither_space::OccupancyGrid;

use crate::agent::Agent;
use crate::food::FoodIndex;

/// A violated world invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A body cell lacks the expected `HEAD`/`BODY` flag.
    MissingSegment {
        /// Owner.
        agent: AgentId,
        /// The cell.
        cell: Cell,
        /// Flags found.
        found: CellFlags,
    },
    /// Two body cells (of one or two agents) coincide.
    SharedCell {
        /// The cell.
        cell: Cell,
    },
    /// Segment cells on the grid that no live agent owns.
    OrphanSegments {
        /// Segment cells on the grid.
        grid: usize,
        /// Body cells over all live agents.
        owned: usize,
    },
    /// Food on the grid disagrees with the food index.
    FoodMismatch {
        /// Food cells on the grid.
        grid: usize,
        /// Food cells in the index.
        indexed: usize,
    },
    /// A cell holds food together with a segment.
    ExclusiveFlags {
        /// The cell.
        cell: Cell,
    },
    /// A non-alive agent is still in the live set.
    NotAlive {
        /// The agent.
        agent: AgentId,
    },
}

impl fmt::Display for ConsistencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSegment { agent, cell, found } => {
                write!(f, "agent {agent} owns {cell} but the grid holds {found}")
            }
            Self::SharedCell { cell } => write!(f, "cell {cell} is owned twice"),
            Self::OrphanSegments { grid, owned } => {
                write!(f, "{grid} segment cells on the grid but {owned} owned by agents")
            }
            Self::FoodMismatch { grid, indexed } => {
                write!(f, "{grid} food cells on the grid but {indexed} indexed")
            }
            Self::ExclusiveFlags { cell } => write!(f, "cell {cell} holds food and a segment"),
            Self::NotAlive { agent } => write!(f, "agent {agent} is in the live set but not alive"),
        }
    }
}

impl Error for ConsistencyError {}

pub(crate) fn check(
    grid: &OccupancyGrid,
    agents: &[Agent],
    food: &FoodIndex,
) -> Result<(), ConsistencyError> {
    if let Some(i) = grid.cells().iter().position(|c| !c.is_consistent()) {
        return Err(ConsistencyError::ExclusiveFlags {
            cell: grid.cell_of(i),
        });
    }

    let mut owned = HashSet::new();
    for agent in agents {
        if !agent.is_alive() {
            return Err(ConsistencyError::NotAlive { agent: agent.id() });
        }
        for (i, cell) in agent.body().enumerate() {
            let expected = if i == 0 { CellFlags::HEAD } else { CellFlags::BODY };
            let found = grid.try_get(cell).unwrap_or_default();
            if !found.contains(expected) {
                return Err(ConsistencyError::MissingSegment {
                    agent: agent.id(),
                    cell,
                    found,
                });
            }
            if !owned.insert(cell) {
                return Err(ConsistencyError::SharedCell { cell });
            }
        }
    }
    if owned.len() != grid.segment_count() {
        return Err(ConsistencyError::OrphanSegments {
            grid: grid.segment_count(),
            owned: owned.len(),
        });
    }

    let indexed_on_grid = food
        .iter()
        .filter(|c| grid.try_get(*c).is_some_and(CellFlags::has_food))
        .count();
    if food.len() != grid.food_count() || indexed_on_grid != food.len() {
        return Err(ConsistencyError::FoodMismatch {
            grid: grid.food_count(),
            indexed: food.len(),
        });
    }
    Ok(())
}
