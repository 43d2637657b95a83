//! Error types for grid and partition construction.

use std::fmt;

/// Errors arising from grid or sector table construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Attempted to construct a grid with zero cells.
    EmptySpace,
    /// A dimension exceeds the supported maximum.
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The requested value.
        value: u32,
        /// The maximum allowed value.
        max: u32,
    },
    /// Sector size must be at least one cell.
    InvalidSectorSize {
        /// The requested value.
        value: u32,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} {value} exceeds maximum {max}")
            }
            Self::InvalidSectorSize { value } => {
                write!(f, "sector size must be at least 1, got {value}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
