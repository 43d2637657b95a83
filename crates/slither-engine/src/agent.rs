//! Agents (snakes) and their life-state machine.

use std::collections::VecDeque;
use std::fmt;

use slither_core::{AgentId, Cell, DeathCause, Direction};
use slither_path::{CacheAction, CachedPath, PathQuery, SearchScratch};

use crate::intent::{IntentView, Proposal};

/// Life state of an agent.
///
/// `Alive → Dying` when a fatal collision is detected during commit;
/// `Dying → Dead` at the end of the same commit phase, when the body is
/// cleared from the grid. Dead agents are dropped before the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifeState {
    /// Moving normally.
    Alive,
    /// Collided this tick; cells still on the grid.
    Dying,
    /// Removed from the grid.
    Dead,
}

impl fmt::Display for LifeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Alive => "alive",
            Self::Dying => "dying",
            Self::Dead => "dead",
        };
        f.write_str(s)
    }
}

/// Lifetime counters of one agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AgentStats {
    /// Committed moves.
    pub moves: u64,
    /// Food units eaten.
    pub food_eaten: u64,
}

/// One snake.
///
/// The body is stored head first. While the agent is alive every body cell
/// carries `HEAD` (index 0) or `BODY` on the grid, and no cell repeats.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    body: VecDeque<Cell>,
    facing: Direction,
    state: LifeState,
    target: Option<Cell>,
    path: Option<CachedPath>,
    death: Option<DeathCause>,
    stats: AgentStats,
}

impl Agent {
    /// Create a live agent. `body` must be non-empty, head first.
    pub(crate) fn new(
        id: AgentId,
        body: impl IntoIterator<Item = Cell>,
        facing: Direction,
    ) -> Self {
        Self {
            id,
            body: body.into_iter().collect(),
            facing,
            state: LifeState::Alive,
            target: None,
            path: None,
            death: None,
            stats: AgentStats::default(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Head cell.
    pub fn head(&self) -> Cell {
        self.body[0]
    }

    /// Tail cell. Equals the head for single-cell agents.
    pub fn tail(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    /// Body length in cells.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; agents have at least one cell.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Body cells, head first.
    pub fn body(&self) -> impl ExactSizeIterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    /// True if `cell` is part of this agent's body.
    pub fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Current heading.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Life state.
    pub fn state(&self) -> LifeState {
        self.state
    }

    /// True while alive.
    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    /// Current target, `None` if none was reachable last tick.
    pub fn target(&self) -> Option<Cell> {
        self.target
    }

    /// The cached path, if any.
    pub fn cached_path(&self) -> Option<&CachedPath> {
        self.path.as_ref()
    }

    /// Cause of death once dying or dead.
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death
    }

    /// Lifetime counters.
    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    /// Pathfinder view of this agent.
    pub fn query(&self) -> PathQuery<'_> {
        PathQuery {
            agent: self.id,
            head: self.head(),
            tail: (self.body.len() > 2).then(|| self.tail()),
            facing: self.facing,
            cache: self.path.as_ref(),
        }
    }

    /// Compute this tick's intended move. Reads shared state only.
    pub(crate) fn propose(&self, view: &IntentView<'_>, scratch: &mut SearchScratch) -> Proposal {
        let query = self.query();
        match view
            .pathfinder
            .next_direction(&query, view.grid, view.sectors, view.food, scratch)
        {
            Ok(decision) => Proposal::Planned(decision),
            Err(boxed) => Proposal::Boxed(boxed),
        }
    }

    /// Apply the cache write-back for this tick's proposal.
    pub(crate) fn absorb(&mut self, proposal: &Proposal) {
        match proposal {
            Proposal::Planned(decision) => {
                self.target = decision.target;
                match &decision.cache {
                    CacheAction::Advance => {
                        if let Some(path) = self.path.as_mut() {
                            path.advance();
                        }
                    }
                    CacheAction::Replace(path) => self.path = Some(path.clone()),
                    CacheAction::Clear => self.path = None,
                }
            }
            Proposal::Boxed(_) => {
                self.target = None;
                self.path = None;
            }
            Proposal::Skipped => {}
        }
    }

    /// Move the head one cell in `dir`. Keeps the tail when `grew`.
    ///
    /// Returns the vacated tail cell, if any.
    pub(crate) fn advance(&mut self, dir: Direction, grew: bool) -> Option<Cell> {
        let next = self.head().step(dir);
        self.body.push_front(next);
        self.facing = dir;
        self.stats.moves += 1;
        if grew {
            self.stats.food_eaten += 1;
            None
        } else {
            self.body.pop_back()
        }
    }

    pub(crate) fn begin_dying(&mut self, cause: DeathCause) {
        if self.state == LifeState::Alive {
            self.state = LifeState::Dying;
            self.death = Some(cause);
        }
    }

    /// Transition `Dying → Dead`. Returns false if the agent was not dying.
    pub(crate) fn finish_dying(&mut self) -> bool {
        if self.state == LifeState::Dying {
            self.state = LifeState::Dead;
            self.path = None;
            self.target = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake() -> Agent {
        Agent::new(
            AgentId(1),
            [Cell::new(2, 2), Cell::new(2, 1), Cell::new(2, 0)],
            Direction::East,
        )
    }

    #[test]
    fn advance_moves_head_and_drops_tail() {
        let mut a = snake();
        assert_eq!(a.advance(Direction::South, false), Some(Cell::new(2, 0)));
        assert_eq!(a.head(), Cell::new(3, 2));
        assert_eq!(a.tail(), Cell::new(2, 1));
        assert_eq!(a.facing(), Direction::South);
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn growth_keeps_tail() {
        let mut a = snake();
        assert_eq!(a.advance(Direction::East, true), None);
        assert_eq!(a.len(), 4);
        assert_eq!(a.tail(), Cell::new(2, 0));
        assert_eq!(a.stats().food_eaten, 1);
        assert_eq!(a.stats().moves, 1);
    }

    #[test]
    fn life_state_transitions_in_order() {
        let mut a = snake();
        assert!(!a.finish_dying());
        a.begin_dying(DeathCause::OutOfBounds);
        assert_eq!(a.state(), LifeState::Dying);
        a.begin_dying(DeathCause::SelfCollision);
        assert_eq!(a.death_cause(), Some(DeathCause::OutOfBounds));
        assert!(a.finish_dying());
        assert_eq!(a.state(), LifeState::Dead);
        assert!(!a.is_alive());
    }

    #[test]
    fn query_exposes_vacating_tail() {
        let a = snake();
        assert_eq!(a.query().tail, Some(Cell::new(2, 0)));
        let single = Agent::new(AgentId(0), [Cell::new(0, 0)], Direction::North);
        assert_eq!(single.query().tail, None);
    }
}
