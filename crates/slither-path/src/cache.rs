//! Per-agent cached paths validated by sector versions.
//!
//! A [`CachedPath`] records the directions of a computed path together with
//! the version of every sector the path enters, captured at computation
//! time. The path stays usable only while every sector on its remaining
//! prefix still has its captured version. Any mutation in such a sector,
//! including the owner's own moves, discards it.

use slither_core::{Cell, Direction, GridError, SectorId};
use slither_space::SectorTable;
use smallvec::SmallVec;
use std::fmt;

/// Errors from [`CachedPath::capture`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureError {
    /// Two consecutive path cells are not orthogonally adjacent.
    NotAdjacent {
        /// The earlier cell.
        from: Cell,
        /// The later cell.
        to: Cell,
    },
    /// A path cell lies off the grid.
    Grid(GridError),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAdjacent { from, to } => {
                write!(f, "path cells {from} and {to} are not adjacent")
            }
            Self::Grid(e) => write!(f, "path leaves the grid: {e}"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::NotAdjacent { .. } => None,
        }
    }
}

impl From<GridError> for CaptureError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

/// A maximal run of consecutive path steps inside one sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorRun {
    /// The sector.
    pub sector: SectorId,
    /// Sector version the run depends on.
    pub version: u64,
    /// Index of the last step of the run.
    pub last_step: usize,
}

/// Why a cached path was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaleReason {
    /// Every step has been consumed.
    Exhausted,
    /// The agent is not where the path expects it.
    HeadMoved,
    /// A sector on the remaining prefix changed version.
    SectorChanged(SectorId),
}

/// Outcome of [`CachedPath::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheCheck {
    /// Usable as is.
    Valid,
    /// Not usable.
    Stale(StaleReason),
}

/// A computed path and the sector versions it was computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedPath {
    target: Cell,
    origin: Cell,
    steps: Vec<Direction>,
    cells: Vec<Cell>,
    runs: SmallVec<[SectorRun; 8]>,
    cursor: usize,
}

impl CachedPath {
    /// Build a path starting at `origin` through `cells`, capturing the
    /// current version of every sector it enters.
    ///
    /// `cells` must be a 4-connected walk from `origin`; `target` is
    /// normally its last cell.
    pub fn capture(
        origin: Cell,
        target: Cell,
        cells: Vec<Cell>,
        sectors: &SectorTable,
    ) -> Result<Self, CaptureError> {
        let mut steps = Vec::with_capacity(cells.len());
        let mut runs: SmallVec<[SectorRun; 8]> = SmallVec::new();
        let mut prev = origin;
        for (i, &cell) in cells.iter().enumerate() {
            let dir = prev
                .direction_to(cell)
                .ok_or(CaptureError::NotAdjacent { from: prev, to: cell })?;
            steps.push(dir);
            let sector = sectors.sector_of(cell)?;
            match runs.last_mut() {
                Some(run) if run.sector == sector => run.last_step = i,
                _ => runs.push(SectorRun {
                    sector,
                    version: sectors.version_of(sector),
                    last_step: i,
                }),
            }
            prev = cell;
        }
        Ok(Self {
            target,
            origin,
            steps,
            cells,
            runs,
            cursor: 0,
        })
    }

    /// The cell the path leads to.
    pub fn target(&self) -> Cell {
        self.target
    }

    /// All step directions, including consumed ones.
    pub fn steps(&self) -> &[Direction] {
        &self.steps
    }

    /// All path cells, including consumed ones.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Sector runs with their captured versions.
    pub fn runs(&self) -> &[SectorRun] {
        &self.runs
    }

    /// Number of steps already taken.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Steps not yet taken.
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    /// True when every step has been taken.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// The direction to take next.
    pub fn next_step(&self) -> Option<Direction> {
        self.steps.get(self.cursor).copied()
    }

    /// Where the head must be for the next step to apply.
    pub fn expected_head(&self) -> Cell {
        match self.cursor {
            0 => self.origin,
            n => self.cells[n - 1],
        }
    }

    /// Decide whether the path may still be followed from `head`.
    pub fn check(&self, head: Cell, sectors: &SectorTable) -> CacheCheck {
        if self.is_exhausted() {
            return CacheCheck::Stale(StaleReason::Exhausted);
        }
        if head != self.expected_head() {
            return CacheCheck::Stale(StaleReason::HeadMoved);
        }
        let changed = self
            .runs
            .iter()
            .filter(|run| run.last_step >= self.cursor)
            .find(|run| sectors.version_of(run.sector) != run.version);
        match changed {
            Some(run) => CacheCheck::Stale(StaleReason::SectorChanged(run.sector)),
            None => CacheCheck::Valid,
        }
    }

    /// Consume one step.
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1).min(self.steps.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(from: Cell, n: i32) -> Vec<Cell> {
        (1..=n).map(|k| Cell::new(from.row, from.col + k)).collect()
    }

    #[test]
    fn capture_groups_steps_by_sector() {
        let sectors = SectorTable::new(16, 4, 4).unwrap();
        let origin = Cell::new(1, 1);
        let path = CachedPath::capture(origin, Cell::new(1, 9), line(origin, 8), &sectors).unwrap();
        assert_eq!(path.steps(), &[Direction::East; 8]);
        let ids: Vec<u32> = path.runs().iter().map(|r| r.sector.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(path.runs()[0].last_step, 1);
        assert_eq!(path.runs()[1].last_step, 5);
        assert_eq!(path.runs()[2].last_step, 7);
    }

    #[test]
    fn capture_rejects_broken_walk() {
        let sectors = SectorTable::new(8, 8, 4).unwrap();
        let cells = vec![Cell::new(0, 1), Cell::new(0, 3)];
        assert_eq!(
            CachedPath::capture(Cell::new(0, 0), Cell::new(0, 3), cells, &sectors),
            Err(CaptureError::NotAdjacent {
                from: Cell::new(0, 1),
                to: Cell::new(0, 3)
            })
        );
    }

    #[test]
    fn unchanged_sectors_are_valid() {
        let sectors = SectorTable::new(16, 4, 4).unwrap();
        let origin = Cell::new(0, 0);
        let path = CachedPath::capture(origin, Cell::new(0, 5), line(origin, 5), &sectors).unwrap();
        assert_eq!(path.check(origin, &sectors), CacheCheck::Valid);
    }

    #[test]
    fn change_on_prefix_invalidates() {
        let mut sectors = SectorTable::new(16, 4, 4).unwrap();
        let origin = Cell::new(0, 0);
        let path = CachedPath::capture(origin, Cell::new(0, 5), line(origin, 5), &sectors).unwrap();
        sectors.mark_dirty(Cell::new(3, 6)).unwrap();
        assert_eq!(
            path.check(origin, &sectors),
            CacheCheck::Stale(StaleReason::SectorChanged(SectorId(1)))
        );
    }

    #[test]
    fn change_under_the_head_invalidates() {
        // The owner's own move out of the origin cell still bumps the version.
        let mut sectors = SectorTable::new(16, 4, 4).unwrap();
        let origin = Cell::new(0, 0);
        let mut path =
            CachedPath::capture(origin, Cell::new(0, 5), line(origin, 5), &sectors).unwrap();
        path.advance();
        sectors.mark_dirty(Cell::new(0, 0)).unwrap();
        sectors.mark_dirty(Cell::new(0, 1)).unwrap();
        assert_eq!(
            path.check(Cell::new(0, 1), &sectors),
            CacheCheck::Stale(StaleReason::SectorChanged(SectorId(0)))
        );
    }

    #[test]
    fn consumed_runs_are_ignored() {
        let mut sectors = SectorTable::new(16, 4, 4).unwrap();
        let origin = Cell::new(0, 2);
        let mut path =
            CachedPath::capture(origin, Cell::new(0, 6), line(origin, 4), &sectors).unwrap();
        path.advance();
        path.advance();
        sectors.mark_dirty(Cell::new(2, 2)).unwrap();
        assert_eq!(path.check(Cell::new(0, 4), &sectors), CacheCheck::Valid);
    }

    #[test]
    fn head_mismatch_and_exhaustion() {
        let sectors = SectorTable::new(8, 8, 4).unwrap();
        let origin = Cell::new(0, 0);
        let mut path =
            CachedPath::capture(origin, Cell::new(0, 1), line(origin, 1), &sectors).unwrap();
        assert_eq!(
            path.check(Cell::new(5, 5), &sectors),
            CacheCheck::Stale(StaleReason::HeadMoved)
        );
        path.advance();
        assert!(path.is_exhausted());
        assert_eq!(path.next_step(), None);
        assert_eq!(
            path.check(Cell::new(0, 1), &sectors),
            CacheCheck::Stale(StaleReason::Exhausted)
        );
    }
}
