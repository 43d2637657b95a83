//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent (snake) within a world.
///
/// Assigned sequentially at spawn time and never reused. Ascending
/// `AgentId` order is the commit order of the tick engine, so a lower id
/// wins every contested cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step. The first
/// completed step reports `TickId(1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick that follows this one.
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a sector of the spatial partition.
///
/// Sectors are numbered row-major: `SectorId(sr * sectors_wide + sc)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectorId(pub u32);

impl SectorId {
    /// The sector id as a slice index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SectorId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
