//! Sequential commit phase.
//!
//! Agents are committed one at a time in ascending id order. Each commit
//! sees the grid as already mutated by earlier commits in the same tick,
//! so a lower id always wins a contested cell. Every grid write is
//! reported to the sector table, which bumps the covering sector's version.

use slither_core::{
    Cell, CellFlags, DeathCause, Direction, GridError, Occurrence, OccurrenceKind, TickId,
};
use slither_space::{OccupancyGrid, SectorTable};

use crate::agent::Agent;
use crate::food::FoodManager;

/// Mutable world state touched by the commit and cleanup phases.
#[derive(Debug)]
pub(crate) struct Board {
    pub grid: OccupancyGrid,
    pub sectors: SectorTable,
    pub food: FoodManager,
}

/// Effect of one agent's commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoveOutcome {
    /// The head advanced.
    Moved {
        /// True if the agent ate.
        grew: bool,
    },
    /// A fatal collision; the agent is now dying.
    Collided(DeathCause),
}

impl Board {
    /// Commit `agent`'s move in `dir`.
    pub(crate) fn commit_move(
        &mut self,
        agent: &mut Agent,
        dir: Direction,
        tick: TickId,
        out: &mut Vec<Occurrence>,
    ) -> MoveOutcome {
        let id = agent.id();
        let from = agent.head();
        let to = from.step(dir);

        let Some(flags) = self.grid.try_get(to) else {
            agent.begin_dying(DeathCause::OutOfBounds);
            return MoveOutcome::Collided(DeathCause::OutOfBounds);
        };
        let grew = flags.has_food();
        // The tail vacates this tick, unless the neck is the tail.
        let into_tail = to == agent.tail() && agent.len() > 2;
        if flags.is_segment() && !into_tail {
            let cause = if agent.occupies(to) {
                DeathCause::SelfCollision
            } else {
                DeathCause::AgentCollision
            };
            agent.begin_dying(cause);
            return MoveOutcome::Collided(cause);
        }

        if grew {
            match self.food.consume(&mut self.grid, to) {
                Ok(_) => self.touch(to),
                Err(err) => reject(err),
            }
            out.push(Occurrence {
                tick,
                kind: OccurrenceKind::FoodEaten { agent: id, cell: to },
            });
        }

        if let Some(vacated) = agent.advance(dir, grew) {
            if vacated != to {
                self.write(vacated, CellFlags::EMPTY);
            }
        }
        if agent.len() > 1 {
            self.write(from, CellFlags::BODY);
        }
        self.write(to, CellFlags::HEAD);

        out.push(Occurrence {
            tick,
            kind: OccurrenceKind::Moved {
                agent: id,
                from,
                to,
                direction: dir,
                grew,
            },
        });
        MoveOutcome::Moved { grew }
    }

    /// Finish a dying agent: clear every cell it owns and mark it dead.
    pub(crate) fn bury(&mut self, agent: &mut Agent, tick: TickId, out: &mut Vec<Occurrence>) {
        let Some(cause) = agent.death_cause() else {
            return;
        };
        if !agent.finish_dying() {
            return;
        }
        let id = agent.id();
        for cell in agent.body() {
            self.write(cell, CellFlags::EMPTY);
        }
        tracing::trace!(agent = %id, %cause, length = agent.len(), "agent died");
        out.push(Occurrence {
            tick,
            kind: OccurrenceKind::Died {
                agent: id,
                head: agent.head(),
                cause,
                length: agent.len(),
            },
        });
    }

    fn write(&mut self, cell: Cell, flags: CellFlags) {
        match self.grid.set(cell, flags) {
            Ok(_) => self.touch(cell),
            Err(err) => reject(err),
        }
    }

    fn touch(&mut self, cell: Cell) {
        if let Err(err) = self.sectors.mark_dirty(cell) {
            reject(err);
        }
    }
}

fn reject(err: GridError) {
    tracing::error!(%err, "grid write rejected during commit");
    if cfg!(debug_assertions) {
        panic!("grid write rejected during commit: {err}");
    }
}
