//! Error types shared across the Slither crates.

use crate::{AgentId, Cell, CellFlags};
use std::error::Error;
use std::fmt;

/// Errors from grid accessors and mutators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// The cell lies outside the grid.
    OutOfBounds {
        /// The offending cell.
        cell: Cell,
        /// Grid width in columns.
        width: u32,
        /// Grid height in rows.
        height: u32,
    },
    /// A placement targeted a cell already holding a segment or food.
    Occupied {
        /// The offending cell.
        cell: Cell,
        /// Flags found at the cell.
        found: CellFlags,
    },
    /// A write would make food coexist with a segment.
    ExclusiveFlags {
        /// The offending cell.
        cell: Cell,
        /// The rejected flag combination.
        flags: CellFlags,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                cell,
                width,
                height,
            } => write!(f, "cell {cell} out of bounds for {width}x{height} grid"),
            Self::Occupied { cell, found } => {
                write!(f, "cell {cell} already occupied ({found})")
            }
            Self::ExclusiveFlags { cell, flags } => {
                write!(f, "flags {flags} at {cell} violate food/segment exclusivity")
            }
        }
    }
}

impl Error for GridError {}

/// Returned by the pathfinder when every neighbour of the head is blocked.
///
/// The engine recovers by continuing straight, which kills the agent
/// during commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoSafeMove {
    /// The boxed-in agent.
    pub agent: AgentId,
    /// Its head cell.
    pub head: Cell,
}

impl fmt::Display for NoSafeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent {} has no safe move from {}", self.agent, self.head)
    }
}

impl Error for NoSafeMove {}
