//! Occurrences: the per-tick record of what happened in the world.
//!
//! Occurrences are emitted in commit order. Two runs with the same seed
//! and configuration produce the same sequence.

use crate::{AgentId, Cell, Direction, TickId};
use std::fmt;

/// Why an agent died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The head stepped off the grid.
    OutOfBounds,
    /// The head entered a segment of the agent's own body.
    SelfCollision,
    /// The head entered another agent's segment.
    AgentCollision,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::OutOfBounds => "out of bounds",
            Self::SelfCollision => "self collision",
            Self::AgentCollision => "agent collision",
        };
        f.write_str(s)
    }
}

/// What happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OccurrenceKind {
    /// An agent advanced its head by one cell.
    Moved {
        /// The agent.
        agent: AgentId,
        /// Head before the move.
        from: Cell,
        /// Head after the move.
        to: Cell,
        /// Heading of the move.
        direction: Direction,
        /// True if the agent ate and kept its tail.
        grew: bool,
    },
    /// An agent ate the food at `cell`.
    FoodEaten {
        /// The agent.
        agent: AgentId,
        /// Cell the food was in.
        cell: Cell,
    },
    /// An agent died; its cells were cleared at the end of commit.
    Died {
        /// The agent.
        agent: AgentId,
        /// Head cell at the time of death.
        head: Cell,
        /// Cause of death.
        cause: DeathCause,
        /// Body length at death.
        length: usize,
    },
    /// The food manager placed food at `cell`.
    FoodSpawned {
        /// The cell.
        cell: Cell,
    },
}

/// A single occurrence stamped with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    /// Tick that produced the occurrence.
    pub tick: TickId,
    /// What happened.
    pub kind: OccurrenceKind,
}

impl Occurrence {
    /// The agent involved, if any.
    pub fn agent(&self) -> Option<AgentId> {
        match self.kind {
            OccurrenceKind::Moved { agent, .. }
            | OccurrenceKind::FoodEaten { agent, .. }
            | OccurrenceKind::Died { agent, .. } => Some(agent),
            OccurrenceKind::FoodSpawned { .. } => None,
        }
    }
}
