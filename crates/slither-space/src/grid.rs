//! The occupancy grid: one [`CellFlags`] byte per cell, row-major.

use crate::error::SpaceError;
use slither_core::{Cell, CellFlags, GridError};

/// Dense row-major grid of cell flags.
///
/// Maintains running counts of food and segment cells so that the food
/// manager can detect a full grid in O(1). Every write enforces the
/// food/segment exclusivity invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<CellFlags>,
    food: usize,
    segments: usize,
}

impl OccupancyGrid {
    /// Maximum size of either axis.
    pub const MAX_DIM: u32 = 1 << 15;

    /// Create an all-empty grid of `height` rows by `width` columns.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds [`Self::MAX_DIM`].
    pub fn new(width: u32, height: u32) -> Result<Self, SpaceError> {
        if width == 0 || height == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if width > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Self::MAX_DIM,
            });
        }
        if height > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![CellFlags::EMPTY; width as usize * height as usize],
            food: 0,
            segments: 0,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True if `cell` lies on the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as u32) < self.height
            && (cell.col as u32) < self.width
    }

    /// Row-major index of `cell`.
    pub fn index_of(&self, cell: Cell) -> Result<usize, GridError> {
        if self.contains(cell) {
            Ok(cell.row as usize * self.width as usize + cell.col as usize)
        } else {
            Err(self.out_of_bounds(cell))
        }
    }

    /// Cell at a row-major index. The index must be below [`Self::cell_count`].
    pub fn cell_of(&self, index: usize) -> Cell {
        let w = self.width as usize;
        Cell::new((index / w) as i32, (index % w) as i32)
    }

    /// Flags at `cell`.
    pub fn get(&self, cell: Cell) -> Result<CellFlags, GridError> {
        let i = self.index_of(cell)?;
        Ok(self.cells[i])
    }

    /// Flags at `cell`, or `None` off the grid.
    pub fn try_get(&self, cell: Cell) -> Option<CellFlags> {
        self.index_of(cell).ok().map(|i| self.cells[i])
    }

    /// True if `cell` is on the grid and holds no segment.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.try_get(cell).is_some_and(CellFlags::is_walkable)
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[CellFlags] {
        &self.cells
    }

    /// Overwrite the flags at `cell`, returning the previous flags.
    ///
    /// Rejects combinations that put food and a segment in one cell.
    pub fn set(&mut self, cell: Cell, flags: CellFlags) -> Result<CellFlags, GridError> {
        if !flags.is_consistent() {
            return Err(GridError::ExclusiveFlags { cell, flags });
        }
        let i = self.index_of(cell)?;
        let prev = self.cells[i];
        self.account(prev, flags);
        self.cells[i] = flags;
        Ok(prev)
    }

    /// Reset `cell` to empty, returning the previous flags.
    pub fn clear(&mut self, cell: Cell) -> Result<CellFlags, GridError> {
        self.set(cell, CellFlags::EMPTY)
    }

    /// Remove food from `cell`. Returns whether food was present.
    pub fn remove_food(&mut self, cell: Cell) -> Result<bool, GridError> {
        let prev = self.get(cell)?;
        if prev.has_food() {
            self.set(cell, prev.difference(CellFlags::FOOD))?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Place food on every cell in `cells`. Each must be empty.
    ///
    /// All-or-nothing: on error the grid is left as it was.
    pub fn place_food(&mut self, cells: &[Cell]) -> Result<(), GridError> {
        self.place_all(cells, CellFlags::FOOD)
    }

    /// Place body segments on every cell in `cells`. Each must be empty.
    pub fn place_body(&mut self, cells: &[Cell]) -> Result<(), GridError> {
        self.place_all(cells, CellFlags::BODY)
    }

    /// Place heads on every cell in `cells`. Each must be empty.
    pub fn place_head(&mut self, cells: &[Cell]) -> Result<(), GridError> {
        self.place_all(cells, CellFlags::HEAD)
    }

    /// Number of cells holding food.
    pub fn food_count(&self) -> usize {
        self.food
    }

    /// Number of cells holding a body segment or a head.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Number of cells with no flag set.
    pub fn empty_count(&self) -> usize {
        self.cells.len() - self.food - self.segments
    }

    fn place_all(&mut self, cells: &[Cell], flags: CellFlags) -> Result<(), GridError> {
        for (n, &cell) in cells.iter().enumerate() {
            let result = self.get(cell).and_then(|found| {
                if found.is_empty() {
                    self.set(cell, flags).map(|_| ())
                } else {
                    Err(GridError::Occupied { cell, found })
                }
            });
            if let Err(err) = result {
                // Cells placed so far were empty before this call.
                for &placed in &cells[..n] {
                    self.set(placed, CellFlags::EMPTY)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn account(&mut self, prev: CellFlags, next: CellFlags) {
        if prev.has_food() {
            self.food -= 1;
        }
        if prev.is_segment() {
            self.segments -= 1;
        }
        if next.has_food() {
            self.food += 1;
        }
        if next.is_segment() {
            self.segments += 1;
        }
    }

    fn out_of_bounds(&self, cell: Cell) -> GridError {
        GridError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        }
    }
}
