//! Spatial data structures for Slither simulations.
//!
//! - [`OccupancyGrid`]: one flag byte per cell with running occupancy counts
//! - [`SectorTable`]: fixed square partition with per-sector change versions
//!   and per-tick dirty flags, used to validate cached paths

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod sector;

pub use error::SpaceError;
pub use grid::OccupancyGrid;
pub use sector::{Sector, SectorStats, SectorTable, DEFAULT_SECTOR_SIZE};
