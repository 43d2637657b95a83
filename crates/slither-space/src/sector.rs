//! Sector partition of the grid with change versions and dirty tracking.
//!
//! The grid is split into `sector_size × sector_size` squares (edge sectors
//! may be smaller). Every grid mutation is reported to the table, which
//! bumps the containing sector's version and raises its dirty flag for the
//! current tick.
//!
//! Versions only ever increase. Anything that captured a version can tell
//! the sector has changed by comparing it with the current one. Dirty flags
//! are cleared once per tick by
//! [`SectorTable::reset_dirty_flags`].

use crate::error::SpaceError;
use slither_core::{Cell, GridError, SectorId};

/// Default edge length of a sector in cells.
pub const DEFAULT_SECTOR_SIZE: u32 = 16;

/// Aggregate partition counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectorStats {
    /// Number of sectors.
    pub sectors: usize,
    /// Sectors currently dirty.
    pub dirty: usize,
    /// Sum of all sector versions.
    pub total_changes: u64,
}

/// A single sector.
#[derive(Clone, Debug)]
pub struct Sector {
    id: SectorId,
    min: Cell,
    max: Cell,
    version: u64,
    dirty: bool,
}

impl Sector {
    fn new(id: SectorId, min: Cell, max: Cell) -> Self {
        Self {
            id,
            min,
            max,
            version: 0,
            dirty: false,
        }
    }

    /// This sector's id.
    pub fn id(&self) -> SectorId {
        self.id
    }

    /// Inclusive `(top_left, bottom_right)` bounds.
    pub fn bounds(&self) -> (Cell, Cell) {
        (self.min, self.max)
    }

    /// True if `cell` lies inside this sector.
    pub fn contains(&self, cell: Cell) -> bool {
        (self.min.row..=self.max.row).contains(&cell.row)
            && (self.min.col..=self.max.col).contains(&cell.col)
    }

    /// Number of mutations recorded since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True if mutated during the current tick.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn record(&mut self) -> u64 {
        self.version += 1;
        self.dirty = true;
        self.version
    }
}

/// Partition of a grid into square sectors.
#[derive(Clone, Debug)]
pub struct SectorTable {
    width: u32,
    height: u32,
    sector_size: u32,
    sectors_wide: u32,
    sectors_high: u32,
    sectors: Vec<Sector>,
    dirty: Vec<SectorId>,
}

impl SectorTable {
    /// Partition a `width × height` grid into sectors of `sector_size`.
    pub fn new(width: u32, height: u32, sector_size: u32) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if sector_size == 0 {
            return Err(SpaceError::InvalidSectorSize { value: sector_size });
        }
        let sectors_wide = width.div_ceil(sector_size);
        let sectors_high = height.div_ceil(sector_size);
        let mut sectors = Vec::with_capacity((sectors_wide * sectors_high) as usize);
        for sr in 0..sectors_high {
            for sc in 0..sectors_wide {
                let id = SectorId(sr * sectors_wide + sc);
                let min = Cell::new((sr * sector_size) as i32, (sc * sector_size) as i32);
                let max = Cell::new(
                    (((sr + 1) * sector_size).min(height) - 1) as i32,
                    (((sc + 1) * sector_size).min(width) - 1) as i32,
                );
                sectors.push(Sector::new(id, min, max));
            }
        }
        Ok(Self {
            width,
            height,
            sector_size,
            sectors_wide,
            sectors_high,
            sectors,
            dirty: Vec::new(),
        })
    }

    /// Edge length of a full sector.
    pub fn sector_size(&self) -> u32 {
        self.sector_size
    }

    /// Number of sector columns.
    pub fn sectors_wide(&self) -> u32 {
        self.sectors_wide
    }

    /// Number of sector rows.
    pub fn sectors_high(&self) -> u32 {
        self.sectors_high
    }

    /// Total number of sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// All sectors, indexed by [`SectorId`].
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// The sector with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this table.
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.index()]
    }

    /// The sector containing `cell`.
    pub fn sector_of(&self, cell: Cell) -> Result<SectorId, GridError> {
        if cell.row < 0
            || cell.col < 0
            || cell.row as u32 >= self.height
            || cell.col as u32 >= self.width
        {
            return Err(GridError::OutOfBounds {
                cell,
                width: self.width,
                height: self.height,
            });
        }
        let sr = cell.row as u32 / self.sector_size;
        let sc = cell.col as u32 / self.sector_size;
        Ok(SectorId(sr * self.sectors_wide + sc))
    }

    /// Inclusive bounds of sector `id`.
    pub fn sector_bounds(&self, id: SectorId) -> (Cell, Cell) {
        self.sector(id).bounds()
    }

    /// Summary counters for diagnostics.
    pub fn stats(&self) -> SectorStats {
        SectorStats {
            sectors: self.sectors.len(),
            dirty: self.dirty.len(),
            total_changes: self.sectors.iter().map(|s| s.version).sum(),
        }
    }

    /// Current version of the sector containing `cell`.
    pub fn sector_version(&self, cell: Cell) -> Result<u64, GridError> {
        Ok(self.sector(self.sector_of(cell)?).version)
    }

    /// Current version of sector `id`.
    pub fn version_of(&self, id: SectorId) -> u64 {
        self.sector(id).version
    }

    /// Record a mutation of `cell`. Returns the sector's new version.
    pub fn mark_dirty(&mut self, cell: Cell) -> Result<u64, GridError> {
        let id = self.sector_of(cell)?;
        let sector = &mut self.sectors[id.index()];
        if !sector.dirty {
            self.dirty.push(id);
        }
        Ok(sector.record())
    }

    /// Sectors mutated since the last reset, in first-touch order.
    pub fn dirty_sectors(&self) -> &[SectorId] {
        &self.dirty
    }

    /// Clear all dirty flags. Versions are untouched.
    ///
    /// Returns the number of sectors that were dirty.
    pub fn reset_dirty_flags(&mut self) -> usize {
        let n = self.dirty.len();
        for id in self.dirty.drain(..) {
            self.sectors[id.index()].dirty = false;
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── Layout tests ────────────────────────────────────────────

    #[test]
    fn partial_edge_sectors_use_ceiling_division() {
        let t = SectorTable::new(40, 20, 16).unwrap();
        assert_eq!(t.sectors_wide(), 3);
        assert_eq!(t.sectors_high(), 2);
        assert_eq!(t.sector_count(), 6);
        let last = t.sector(SectorId(5));
        assert_eq!(last.bounds(), (Cell::new(16, 32), Cell::new(19, 39)));
    }

    #[test]
    fn zero_sector_size_rejected() {
        assert_eq!(
            SectorTable::new(8, 8, 0).unwrap_err(),
            SpaceError::InvalidSectorSize { value: 0 }
        );
    }

    #[test]
    fn sector_of_is_row_major() {
        let t = SectorTable::new(32, 32, 16).unwrap();
        assert_eq!(t.sector_of(Cell::new(0, 0)), Ok(SectorId(0)));
        assert_eq!(t.sector_of(Cell::new(0, 16)), Ok(SectorId(1)));
        assert_eq!(t.sector_of(Cell::new(16, 0)), Ok(SectorId(2)));
        assert_eq!(t.sector_of(Cell::new(31, 31)), Ok(SectorId(3)));
        assert!(t.sector_of(Cell::new(32, 0)).is_err());
    }

    // ── Versioning tests ────────────────────────────────────────

    #[test]
    fn versions_increase_and_survive_reset() {
        let mut t = SectorTable::new(16, 16, 8).unwrap();
        let c = Cell::new(1, 1);
        assert_eq!(t.sector_version(c), Ok(0));
        assert_eq!(t.mark_dirty(c), Ok(1));
        assert_eq!(t.mark_dirty(c), Ok(2));
        assert_eq!(t.dirty_sectors(), &[SectorId(0)]);
        assert_eq!(t.reset_dirty_flags(), 1);
        assert!(t.dirty_sectors().is_empty());
        assert!(!t.sector(SectorId(0)).is_dirty());
        assert_eq!(t.sector_version(c), Ok(2));
        assert_eq!(t.stats().total_changes, 2);
        assert_eq!(t.stats().dirty, 0);
    }

    #[test]
    fn every_mutation_bumps_only_its_own_sector() {
        let mut t = SectorTable::new(8, 8, 4).unwrap();
        t.mark_dirty(Cell::new(0, 0)).unwrap();
        t.mark_dirty(Cell::new(0, 1)).unwrap();
        t.mark_dirty(Cell::new(5, 5)).unwrap();
        assert_eq!(t.version_of(SectorId(0)), 2);
        assert_eq!(t.version_of(SectorId(1)), 0);
        assert_eq!(t.version_of(SectorId(3)), 1);
        assert_eq!(t.dirty_sectors(), &[SectorId(0), SectorId(3)]);
        assert!(t.mark_dirty(Cell::new(8, 0)).is_err());
        assert_eq!(t.stats().total_changes, 3);
    }

    proptest! {
        #[test]
        fn every_cell_maps_inside_its_sector(w in 1u32..50, h in 1u32..50, size in 1u32..20) {
            let t = SectorTable::new(w, h, size).unwrap();
            for r in 0..h as i32 {
                for c in 0..w as i32 {
                    let cell = Cell::new(r, c);
                    let id = t.sector_of(cell).unwrap();
                    prop_assert!(t.sector(id).contains(cell));
                }
            }
        }
    }
}
