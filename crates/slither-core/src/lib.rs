//! Core types for the Slither snake simulation.
//!
//! This is the leaf crate with zero internal Slither dependencies. It defines
//! the identifiers, grid cells and headings, the per-cell flag encoding,
//! error types, and the occurrence records the engine emits each tick.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod flags;
pub mod id;
pub mod occurrence;

pub use cell::{Cell, Direction};
pub use error::{GridError, NoSafeMove};
pub use flags::{CellFlags, CELL_ENCODING_VERSION};
pub use id::{AgentId, SectorId, TickId};
pub use occurrence::{DeathCause, Occurrence, OccurrenceKind};
