//! Owned, between-tick views of the world for renderers and tests.

use slither_core::{AgentId, Cell, CellFlags, Direction, TickId, CELL_ENCODING_VERSION};

use crate::agent::{Agent, AgentStats, LifeState};

/// One agent as seen in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentView {
    /// Identifier.
    pub id: AgentId,
    /// Body cells, head first.
    pub body: Vec<Cell>,
    /// Heading.
    pub facing: Direction,
    /// Life state (always `Alive` between ticks).
    pub state: LifeState,
    /// Current target.
    pub target: Option<Cell>,
    /// Lifetime counters.
    pub stats: AgentStats,
}

impl From<&Agent> for AgentView {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id(),
            body: agent.body().collect(),
            facing: agent.facing(),
            state: agent.state(),
            target: agent.target(),
            stats: agent.stats(),
        }
    }
}

/// Complete copy of the observable world state after a tick.
///
/// Taking two snapshots without an intervening `step()` yields equal values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSnapshot {
    /// Last completed tick; `TickId(0)` before the first step.
    pub tick: TickId,
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Layout version of `cells`.
    pub encoding_version: u8,
    /// Row-major cell flags.
    pub cells: Vec<CellFlags>,
    /// Live agents in id order.
    pub agents: Vec<AgentView>,
    /// Outstanding food, sorted row-major.
    pub food: Vec<Cell>,
}

impl WorldSnapshot {
    pub(crate) fn new(
        tick: TickId,
        width: u32,
        height: u32,
        cells: &[CellFlags],
        agents: &[Agent],
        food: impl Iterator<Item = Cell>,
    ) -> Self {
        let mut food: Vec<Cell> = food.collect();
        food.sort_unstable();
        Self {
            tick,
            width,
            height,
            encoding_version: CELL_ENCODING_VERSION,
            cells: cells.to_vec(),
            agents: agents.iter().map(AgentView::from).collect(),
            food,
        }
    }

    /// Flags at `cell`, or `None` off the grid.
    pub fn cell(&self, cell: Cell) -> Option<CellFlags> {
        if cell.row < 0
            || cell.col < 0
            || cell.row as u32 >= self.height
            || cell.col as u32 >= self.width
        {
            return None;
        }
        self.cells
            .get(cell.row as usize * self.width as usize + cell.col as usize)
            .copied()
    }

    /// The agent with `id`, if alive.
    pub fn agent(&self, id: AgentId) -> Option<&AgentView> {
        self.agents
            .binary_search_by_key(&id, |a| a.id)
            .ok()
            .map(|i| &self.agents[i])
    }

    /// Raw cell bytes, one per cell, row-major.
    pub fn cell_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.bits()).collect()
    }
}
