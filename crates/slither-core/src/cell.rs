//! Grid cells and the four cardinal headings.

use std::fmt;

/// A cell position on the grid as `(row, col)`.
///
/// Signed so that a step off the edge produces a representable cell that
/// bounds checks can reject. Ordering is row-major, which is also the
/// canonical tie-break order wherever two cells compare equal otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index, growing southwards.
    pub row: i32,
    /// Column index, growing eastwards.
    pub col: i32,
}

impl Cell {
    /// Construct a cell.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The neighbouring cell one step in `dir`. May lie off the grid.
    pub const fn step(self, dir: Direction) -> Self {
        let (dr, dc) = dir.offset();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Manhattan distance to `other`.
    pub const fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The heading that moves from `self` to an orthogonally adjacent
    /// `other`, or `None` if the cells are not adjacent.
    pub fn direction_to(self, other: Cell) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.step(*d) == other)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((row, col): (i32, i32)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four cardinal headings.
///
/// Discriminants follow clockwise order starting at north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Direction {
    /// Row - 1.
    North = 0,
    /// Col + 1.
    East = 1,
    /// Row + 1.
    South = 2,
    /// Col - 1.
    West = 3,
}

impl Direction {
    /// All headings in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// `(d_row, d_col)` offset of a single step.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }

    /// The next heading clockwise.
    pub const fn clockwise(self) -> Self {
        Self::ALL[(self as usize + 1) % 4]
    }

    /// The reversed heading.
    pub const fn opposite(self) -> Self {
        Self::ALL[(self as usize + 2) % 4]
    }

    /// Stable index in `0..4`.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::index`].
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 4 {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Neighbour exploration order for an agent facing `self`: straight
    /// ahead first, then clockwise. The reverse heading comes last.
    pub const fn preference_order(self) -> [Direction; 4] {
        let a = self.clockwise();
        let b = a.clockwise();
        [self, a, b, b.clockwise()]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        f.write_str(name)
    }
}
