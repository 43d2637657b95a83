//! Per-agent direction queries.

use crate::astar::{astar, Search, SearchResult};
use crate::cache::{CacheCheck, CachedPath};
use crate::config::PathConfig;
use crate::fallback::safest_direction;
use crate::scratch::SearchScratch;
use slither_core::{AgentId, Cell, Direction, NoSafeMove};
use slither_space::{OccupancyGrid, SectorTable};

/// Supplies the goal cell for a search.
pub trait TargetSource {
    /// The preferred target for an agent whose head is at `from`.
    fn nearest_target(&self, from: Cell) -> Option<Cell>;
}

impl TargetSource for Option<Cell> {
    fn nearest_target(&self, _from: Cell) -> Option<Cell> {
        *self
    }
}

/// Agent state the pathfinder reads.
#[derive(Clone, Copy, Debug)]
pub struct PathQuery<'a> {
    /// The querying agent.
    pub agent: AgentId,
    /// Current head cell.
    pub head: Cell,
    /// Tail cell that vacates on this move. `None` when the tail is the
    /// neck or the head.
    pub tail: Option<Cell>,
    /// Current heading.
    pub facing: Direction,
    /// The agent's cached path, if any.
    pub cache: Option<&'a CachedPath>,
}

/// Why the fallback search was used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// No target was available.
    NoTarget,
    /// A* proved the target unreachable.
    Unreachable,
    /// A* hit its expansion cap.
    Exhausted,
}

/// How a direction was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// Followed the cached path.
    CacheHit,
    /// Ran A* to completion.
    Computed {
        /// Nodes expanded.
        expanded: usize,
        /// Path length in steps.
        length: usize,
    },
    /// Used the bounded safe-move search.
    Fallback {
        /// Why.
        reason: FallbackReason,
        /// Nodes expanded by A* before falling back.
        expanded: usize,
    },
}

/// What the agent should do with its cache slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheAction {
    /// Take one step of the current path.
    Advance,
    /// Replace the cache with a freshly computed path.
    Replace(CachedPath),
    /// Drop the cache.
    Clear,
}

/// Answer to a direction query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathDecision {
    /// Direction to move this tick.
    pub direction: Direction,
    /// How it was obtained.
    pub outcome: PathOutcome,
    /// Cache update to apply in the write-back phase.
    pub cache: CacheAction,
    /// The agent's target after this query; `None` when unreachable.
    pub target: Option<Cell>,
}

/// Bounded A* with a sector-validated path cache and a BFS fallback.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    max_expansions: usize,
    fallback_nodes: usize,
}

impl Pathfinder {
    /// Create a pathfinder for a grid of `cell_count` cells.
    pub fn new(config: &PathConfig, cell_count: usize) -> Self {
        Self {
            max_expansions: config.resolved_max_expansions(cell_count),
            fallback_nodes: config.fallback_nodes.max(1),
        }
    }

    /// Resolved A* expansion cap.
    pub fn max_expansions(&self) -> usize {
        self.max_expansions
    }

    /// Decide the next direction for `query`.
    ///
    /// Reads only shared state; the returned [`CacheAction`] is applied by
    /// the caller afterwards. Returns [`NoSafeMove`] when every neighbour of
    /// the head is blocked.
    pub fn next_direction<T>(
        &self,
        query: &PathQuery<'_>,
        grid: &OccupancyGrid,
        sectors: &SectorTable,
        targets: &T,
        scratch: &mut SearchScratch,
    ) -> Result<PathDecision, NoSafeMove>
    where
        T: TargetSource + ?Sized,
    {
        if let Some(path) = query.cache {
            if path.check(query.head, sectors) == CacheCheck::Valid {
                if let Some(direction) = path.next_step() {
                    return Ok(PathDecision {
                        direction,
                        outcome: PathOutcome::CacheHit,
                        cache: CacheAction::Advance,
                        target: Some(path.target()),
                    });
                }
            }
        }

        let (reason, expanded) = match targets.nearest_target(query.head) {
            None => (FallbackReason::NoTarget, 0),
            Some(target) => {
                let search = Search {
                    start: query.head,
                    goal: target,
                    facing: query.facing,
                    vacating_tail: query.tail,
                    max_expansions: self.max_expansions,
                };
                match astar(grid, &search, scratch) {
                    SearchResult::Found { expanded } => {
                        let adopted =
                            self.adopt(query, target, expanded, grid, sectors, scratch);
                        if let Some(decision) = adopted {
                            return Ok(decision);
                        }
                        (FallbackReason::Unreachable, expanded)
                    }
                    SearchResult::Unreachable { expanded } => {
                        (FallbackReason::Unreachable, expanded)
                    }
                    SearchResult::Exhausted { expanded } => (FallbackReason::Exhausted, expanded),
                }
            }
        };

        let direction = safest_direction(
            grid,
            query.head,
            query.facing,
            query.tail,
            self.fallback_nodes,
            scratch,
        )
        .ok_or(NoSafeMove {
            agent: query.agent,
            head: query.head,
        })?;
        Ok(PathDecision {
            direction,
            outcome: PathOutcome::Fallback { reason, expanded },
            cache: CacheAction::Clear,
            target: None,
        })
    }

    /// Turn the search trail into a cached path with its first step taken.
    fn adopt(
        &self,
        query: &PathQuery<'_>,
        target: Cell,
        expanded: usize,
        grid: &OccupancyGrid,
        sectors: &SectorTable,
        scratch: &SearchScratch,
    ) -> Option<PathDecision> {
        let cells: Vec<Cell> = scratch
            .trail
            .iter()
            .map(|&i| grid.cell_of(i as usize))
            .collect();
        let mut path = CachedPath::capture(query.head, target, cells, sectors).ok()?;
        let direction = path.next_step()?;
        let length = path.steps().len();
        path.advance();
        let cache = if path.is_exhausted() {
            CacheAction::Clear
        } else {
            CacheAction::Replace(path)
        };
        Some(PathDecision {
            direction,
            outcome: PathOutcome::Computed { expanded, length },
            cache,
            target: Some(target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slither_core::SectorId;

    fn query(head: Cell, facing: Direction, cache: Option<&CachedPath>) -> PathQuery<'_> {
        PathQuery {
            agent: AgentId(0),
            head,
            tail: None,
            facing,
            cache,
        }
    }

    fn world(w: u32, h: u32) -> (OccupancyGrid, SectorTable, SearchScratch) {
        let grid = OccupancyGrid::new(w, h).unwrap();
        let sectors = SectorTable::new(w, h, 4).unwrap();
        let scratch = SearchScratch::new(grid.cell_count());
        (grid, sectors, scratch)
    }

    fn replaced(decision: &PathDecision) -> CachedPath {
        match &decision.cache {
            CacheAction::Replace(p) => p.clone(),
            other => panic!("expected Replace, got {other:?}"),
        }
    }

    // ── Search tests ────────────────────────────────────────────

    #[test]
    fn computes_and_caches_toward_target() {
        let (grid, sectors, mut scratch) = world(8, 8);
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let target = Some(Cell::new(0, 5));
        let q = query(Cell::new(0, 0), Direction::East, None);
        let d = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        assert_eq!(d.direction, Direction::East);
        assert_eq!(d.outcome, PathOutcome::Computed { expanded: 5, length: 5 });
        let path = replaced(&d);
        assert_eq!(path.remaining(), 4);
        assert_eq!(path.target(), Cell::new(0, 5));
    }

    #[test]
    fn cached_path_is_followed() {
        let (grid, sectors, mut scratch) = world(8, 8);
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let target = Some(Cell::new(0, 5));
        let q = query(Cell::new(0, 0), Direction::East, None);
        let first = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        let path = replaced(&first);
        let q = query(Cell::new(0, 1), Direction::East, Some(&path));
        let second = pf
            .next_direction(&q, &grid, &sectors, &None::<Cell>, &mut scratch)
            .unwrap();
        assert_eq!(second.outcome, PathOutcome::CacheHit);
        assert_eq!(second.cache, CacheAction::Advance);
        assert_eq!(second.direction, Direction::East);
        assert_eq!(second.target, Some(Cell::new(0, 5)));
    }

    #[test]
    fn mutation_mid_path_forces_recompute() {
        let (mut grid, mut sectors, mut scratch) = world(8, 8);
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let target = Some(Cell::new(0, 6));
        let q = query(Cell::new(0, 0), Direction::East, None);
        let first = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        let path = replaced(&first);

        let block = Cell::new(0, 4);
        grid.place_body(&[block]).unwrap();
        sectors.mark_dirty(block).unwrap();

        let q = query(Cell::new(0, 1), Direction::East, Some(&path));
        let second = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        assert!(matches!(second.outcome, PathOutcome::Computed { .. }));
        let detour = replaced(&second);
        assert!(!detour.cells().contains(&block));
    }

    #[test]
    fn any_version_bump_discards_cache() {
        // One sector covers the whole grid. A write at the cell the agent
        // just entered bumps its version even though nothing blocks the path.
        let grid = OccupancyGrid::new(8, 8).unwrap();
        let mut sectors = SectorTable::new(8, 8, 8).unwrap();
        let mut scratch = SearchScratch::new(grid.cell_count());
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let target = Some(Cell::new(0, 6));
        let q = query(Cell::new(0, 0), Direction::East, None);
        let first = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        let path = replaced(&first);
        assert_eq!(path.runs()[0].version, 0);

        sectors.mark_dirty(Cell::new(0, 1)).unwrap();
        assert_eq!(sectors.version_of(SectorId(0)), 1);

        let q = query(Cell::new(0, 1), Direction::East, Some(&path));
        let second = pf
            .next_direction(&q, &grid, &sectors, &target, &mut scratch)
            .unwrap();
        assert_ne!(second.outcome, PathOutcome::CacheHit);
        assert!(matches!(second.outcome, PathOutcome::Computed { .. }));
        assert_eq!(replaced(&second).runs()[0].version, 1);
    }

    // ── Fallback tests ──────────────────────────────────────────

    #[test]
    fn no_target_uses_fallback_and_clears_cache() {
        let (grid, sectors, mut scratch) = world(5, 5);
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let q = query(Cell::new(2, 2), Direction::North, None);
        let d = pf
            .next_direction(&q, &grid, &sectors, &None::<Cell>, &mut scratch)
            .unwrap();
        assert_eq!(
            d.outcome,
            PathOutcome::Fallback {
                reason: FallbackReason::NoTarget,
                expanded: 0
            }
        );
        assert_eq!(d.cache, CacheAction::Clear);
        assert_eq!(d.target, None);
    }

    #[test]
    fn exhausted_search_falls_back() {
        let (grid, sectors, mut scratch) = world(16, 16);
        let config = PathConfig {
            max_expansions: Some(2),
            ..PathConfig::default()
        };
        let pf = Pathfinder::new(&config, grid.cell_count());
        let q = query(Cell::new(0, 0), Direction::East, None);
        let far = Some(Cell::new(15, 15));
        let d = pf
            .next_direction(&q, &grid, &sectors, &far, &mut scratch)
            .unwrap();
        assert!(matches!(
            d.outcome,
            PathOutcome::Fallback {
                reason: FallbackReason::Exhausted,
                ..
            }
        ));
    }

    #[test]
    fn enclosed_agent_has_no_safe_move() {
        let (mut grid, sectors, mut scratch) = world(3, 3);
        grid.place_head(&[Cell::new(1, 1)]).unwrap();
        grid.place_body(&[
            Cell::new(0, 0),
            Cell::new(0, 1),
            Cell::new(0, 2),
            Cell::new(1, 0),
            Cell::new(1, 2),
            Cell::new(2, 0),
            Cell::new(2, 1),
            Cell::new(2, 2),
        ])
        .unwrap();
        let pf = Pathfinder::new(&PathConfig::default(), grid.cell_count());
        let q = query(Cell::new(1, 1), Direction::South, None);
        let err = pf
            .next_direction(&q, &grid, &sectors, &None::<Cell>, &mut scratch)
            .unwrap_err();
        assert_eq!(
            err,
            NoSafeMove {
                agent: AgentId(0),
                head: Cell::new(1, 1)
            }
        );
    }
}
