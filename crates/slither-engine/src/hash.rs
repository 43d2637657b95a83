//! Determinism hashing of grid state and occurrence streams.
//!
//! FNV-1a over a canonical byte encoding. Not cryptographic; used to
//! compare runs cheaply.

use slither_core::{Cell, CellFlags, DeathCause, Occurrence, OccurrenceKind};

/// FNV-1a offset basis for 64-bit.
pub const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

#[inline]
fn fnv1a_u32(mut hash: u64, v: u32) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_u64(mut hash: u64, v: u64) -> u64 {
    for &b in &v.to_le_bytes() {
        hash = fnv1a_byte(hash, b);
    }
    hash
}

#[inline]
fn fnv1a_cell(hash: u64, cell: Cell) -> u64 {
    fnv1a_u32(fnv1a_u32(hash, cell.row as u32), cell.col as u32)
}

/// Hash of a row-major cell array.
pub fn grid_hash(cells: &[CellFlags]) -> u64 {
    cells
        .iter()
        .fold(FNV_OFFSET, |h, c| fnv1a_byte(h, c.bits()))
}

/// Fold one occurrence into `hash`.
pub fn fold_occurrence(mut hash: u64, occurrence: &Occurrence) -> u64 {
    hash = fnv1a_u64(hash, occurrence.tick.0);
    match &occurrence.kind {
        OccurrenceKind::Moved {
            agent,
            from,
            to,
            direction,
            grew,
        } => {
            hash = fnv1a_byte(hash, 0);
            hash = fnv1a_u32(hash, agent.0);
            hash = fnv1a_cell(hash, *from);
            hash = fnv1a_cell(hash, *to);
            hash = fnv1a_byte(hash, *direction as u8);
            fnv1a_byte(hash, u8::from(*grew))
        }
        OccurrenceKind::FoodEaten { agent, cell } => {
            hash = fnv1a_byte(hash, 1);
            hash = fnv1a_u32(hash, agent.0);
            fnv1a_cell(hash, *cell)
        }
        OccurrenceKind::Died {
            agent,
            head,
            cause,
            length,
        } => {
            hash = fnv1a_byte(hash, 2);
            hash = fnv1a_u32(hash, agent.0);
            hash = fnv1a_cell(hash, *head);
            let cause = match cause {
                DeathCause::OutOfBounds => 0,
                DeathCause::SelfCollision => 1,
                DeathCause::AgentCollision => 2,
            };
            hash = fnv1a_byte(hash, cause);
            fnv1a_u64(hash, *length as u64)
        }
        OccurrenceKind::FoodSpawned { cell } => {
            hash = fnv1a_byte(hash, 3);
            fnv1a_cell(hash, *cell)
        }
    }
}

/// Hash of an ordered occurrence sequence.
pub fn occurrences_hash<'a>(occurrences: impl IntoIterator<Item = &'a Occurrence>) -> u64 {
    occurrences.into_iter().fold(FNV_OFFSET, fold_occurrence)
}
