//! Per-cell occupancy flags.
//!
//! Each grid cell is one byte. The low three bits carry the flags below;
//! the upper bits are reserved and must be zero. The encoding is shared
//! with renderers through snapshots, so it is versioned.

use std::fmt;
use std::ops::BitOr;

/// Version of the cell byte layout exposed in snapshots.
pub const CELL_ENCODING_VERSION: u8 = 1;

/// Occupancy flags of a single cell.
///
/// `FOOD` is mutually exclusive with `BODY` and `HEAD`; an agent that
/// enters a food cell consumes the food before its head is written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellFlags(u8);

impl CellFlags {
    /// No flags set.
    pub const EMPTY: Self = Self(0);
    /// The cell holds one unit of food.
    pub const FOOD: Self = Self(1);
    /// The cell holds a non-head body segment.
    pub const BODY: Self = Self(2);
    /// The cell holds an agent head.
    pub const HEAD: Self = Self(4);
    /// Any agent segment.
    pub const SEGMENT: Self = Self(Self::BODY.0 | Self::HEAD.0);

    const KNOWN: u8 = 0b111;

    /// Raw byte value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Decode a raw byte. Returns `None` if any reserved bit is set.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::KNOWN == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    /// True if no flag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every flag in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if `self` and `other` share a flag.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// True if the cell holds food.
    pub const fn has_food(self) -> bool {
        self.intersects(Self::FOOD)
    }

    /// True if the cell holds a body segment or a head.
    pub const fn is_segment(self) -> bool {
        self.intersects(Self::SEGMENT)
    }

    /// True if an agent may move into this cell without dying.
    pub const fn is_walkable(self) -> bool {
        !self.is_segment()
    }

    /// Union of two flag sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// `self` with the flags of `other` cleared.
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// False when food coexists with a segment.
    pub const fn is_consistent(self) -> bool {
        !(self.has_food() && self.is_segment())
    }
}

impl BitOr for CellFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("EMPTY");
        }
        let mut first = true;
        for (flag, name) in [
            (Self::FOOD, "FOOD"),
            (Self::BODY, "BODY"),
            (Self::HEAD, "HEAD"),
        ] {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CellFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
