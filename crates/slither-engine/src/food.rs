//! Food spawning, consumption, and nearest-food lookup.

use std::fmt;

use indexmap::IndexSet;
use rand::prelude::*;
use smallvec::SmallVec;

use slither_core::{Cell, CellFlags, GridError};
use slither_path::TargetSource;
use slither_space::OccupancyGrid;

use crate::config::FoodConfig;

/// Below this many units a linear scan beats the bucket search.
const LINEAR_SCAN_MAX: usize = 32;

// ── FoodIndex ──────────────────────────────────────────────────────

/// Outstanding food cells, bucketed by sector for nearest-neighbour
/// queries.
///
/// [`nearest`](Self::nearest) returns the food cell closest to a point by
/// Manhattan distance, ties broken by row then column.
#[derive(Clone, Debug)]
pub struct FoodIndex {
    width: u32,
    height: u32,
    bucket_size: u32,
    buckets_wide: u32,
    buckets_high: u32,
    buckets: Vec<SmallVec<[Cell; 4]>>,
    active: IndexSet<Cell>,
}

impl FoodIndex {
    /// Empty index over a `width × height` grid with square buckets of
    /// `bucket_size` cells.
    pub fn new(width: u32, height: u32, bucket_size: u32) -> Self {
        let bucket_size = bucket_size.max(1);
        let buckets_wide = width.div_ceil(bucket_size).max(1);
        let buckets_high = height.div_ceil(bucket_size).max(1);
        Self {
            width,
            height,
            bucket_size,
            buckets_wide,
            buckets_high,
            buckets: vec![SmallVec::new(); (buckets_wide * buckets_high) as usize],
            active: IndexSet::new(),
        }
    }

    /// Number of outstanding food cells.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True if no food is outstanding.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// True if `cell` holds indexed food.
    pub fn contains(&self, cell: Cell) -> bool {
        self.active.contains(&cell)
    }

    /// Outstanding food cells.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.active.iter().copied()
    }

    /// Add `cell`. Returns false if already present.
    pub fn insert(&mut self, cell: Cell) -> bool {
        if !self.active.insert(cell) {
            return false;
        }
        let b = self.bucket_of(cell);
        self.buckets[b].push(cell);
        true
    }

    /// Remove `cell`. Returns false if absent.
    pub fn remove(&mut self, cell: Cell) -> bool {
        if !self.active.swap_remove(&cell) {
            return false;
        }
        let b = self.bucket_of(cell);
        let bucket = &mut self.buckets[b];
        if let Some(pos) = bucket.iter().position(|c| *c == cell) {
            bucket.swap_remove(pos);
        }
        true
    }

    /// Closest food cell to `from`.
    pub fn nearest(&self, from: Cell) -> Option<Cell> {
        if self.active.len() <= LINEAR_SCAN_MAX {
            return self.active.iter().copied().min_by_key(|c| (from.manhattan(*c), *c));
        }
        let size = i64::from(self.bucket_size);
        let br = (i64::from(from.row) / size).clamp(0, i64::from(self.buckets_high) - 1);
        let bc = (i64::from(from.col) / size).clamp(0, i64::from(self.buckets_wide) - 1);
        let max_ring = i64::from(self.buckets_wide.max(self.buckets_high));

        let mut best: Option<(u32, Cell)> = None;
        for ring in 0..=max_ring {
            // Cells in ring r are at least (r - 1) * size + 1 away.
            if let Some((d, _)) = best {
                if ring > 0 && i64::from(d) <= (ring - 1) * size {
                    break;
                }
            }
            self.scan_ring(br, bc, ring, |cell| {
                let key = (from.manhattan(cell), cell);
                if best.is_none_or(|b| key < b) {
                    best = Some(key);
                }
            });
        }
        best.map(|(_, c)| c)
    }

    fn scan_ring(&self, br: i64, bc: i64, ring: i64, mut visit: impl FnMut(Cell)) {
        let mut bucket = |r: i64, c: i64| {
            if r < 0
                || c < 0
                || r >= i64::from(self.buckets_high)
                || c >= i64::from(self.buckets_wide)
            {
                return;
            }
            let i = (r * i64::from(self.buckets_wide) + c) as usize;
            for &cell in &self.buckets[i] {
                visit(cell);
            }
        };
        if ring == 0 {
            bucket(br, bc);
            return;
        }
        for c in bc - ring..=bc + ring {
            bucket(br - ring, c);
            bucket(br + ring, c);
        }
        for r in br - ring + 1..br + ring {
            bucket(r, bc - ring);
            bucket(r, bc + ring);
        }
    }

    fn bucket_of(&self, cell: Cell) -> usize {
        let r = (cell.row.max(0) as u32 / self.bucket_size).min(self.buckets_high - 1);
        let c = (cell.col.max(0) as u32 / self.bucket_size).min(self.buckets_wide - 1);
        (r * self.buckets_wide + c) as usize
    }

    /// Grid dimensions the index was built for.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl TargetSource for FoodIndex {
    fn nearest_target(&self, from: Cell) -> Option<Cell> {
        self.nearest(from)
    }
}

// ── FoodManager ────────────────────────────────────────────────────

/// Why a spawn round stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnError {
    /// No empty cell is left on the grid.
    GridFull,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridFull => write!(f, "grid has no empty cell"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Result of one [`FoodManager::spawn_tick`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Cells that received food, in placement order.
    pub cells: Vec<Cell>,
    /// Random cells sampled.
    pub attempts: usize,
    /// Set when the round stopped because the grid was full.
    pub skipped: Option<SpawnError>,
}

/// Lifetime food counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoodStats {
    /// Units placed, including initial placement.
    pub spawned: u64,
    /// Units eaten.
    pub consumed: u64,
    /// Random cells sampled by spawn rounds.
    pub attempts: u64,
    /// Spawn rounds cut short by a full grid.
    pub grid_full_skips: u64,
}

/// Owns the food index and the spawn policy.
#[derive(Clone, Debug)]
pub struct FoodManager {
    max_food: usize,
    max_per_tick: usize,
    spawn_attempts: usize,
    spawn_rate: f64,
    index: FoodIndex,
    stats: FoodStats,
}

impl FoodManager {
    /// Manager for a `width × height` grid. Initial placement is separate.
    pub fn new(config: &FoodConfig, width: u32, height: u32, bucket_size: u32) -> Self {
        Self {
            max_food: config.max_food,
            max_per_tick: config.max_per_tick,
            spawn_attempts: config.spawn_attempts,
            spawn_rate: config.spawn_rate,
            index: FoodIndex::new(width, height, bucket_size),
            stats: FoodStats::default(),
        }
    }

    /// The outstanding-food index.
    pub fn index(&self) -> &FoodIndex {
        &self.index
    }

    /// Outstanding food.
    pub fn count(&self) -> usize {
        self.index.len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> FoodStats {
        self.stats
    }

    /// Place food at `cell`, which must be empty.
    pub fn place(&mut self, grid: &mut OccupancyGrid, cell: Cell) -> Result<(), GridError> {
        grid.place_food(&[cell])?;
        self.index.insert(cell);
        self.stats.spawned += 1;
        Ok(())
    }

    /// Place up to `count` units on random empty cells. Returns the cells
    /// placed; fewer than `count` if the grid ran out of room.
    pub fn scatter<R: Rng + ?Sized>(
        &mut self,
        grid: &mut OccupancyGrid,
        rng: &mut R,
        count: usize,
    ) -> Vec<Cell> {
        let mut placed = Vec::with_capacity(count);
        let budget = count.saturating_mul(64);
        let mut attempts = 0;
        while placed.len() < count && attempts < budget && grid.empty_count() > 0 {
            attempts += 1;
            let cell = random_cell(grid, rng);
            if grid.get(cell) == Ok(CellFlags::EMPTY) && self.place(grid, cell).is_ok() {
                placed.push(cell);
            }
        }
        self.stats.attempts += attempts as u64;
        placed
    }

    /// Remove the food at `cell` because an agent ate it.
    ///
    /// Returns whether food was present.
    pub fn consume(&mut self, grid: &mut OccupancyGrid, cell: Cell) -> Result<bool, GridError> {
        let had = grid.remove_food(cell)?;
        if had {
            self.index.remove(cell);
            self.stats.consumed += 1;
        }
        Ok(had)
    }

    /// One spawn round.
    ///
    /// Skips when `max_food` units are outstanding. Otherwise a round runs
    /// with probability `spawn_rate × (2 − outstanding / max_food)` and
    /// samples up to `spawn_attempts` uniform cells, accepting empty ones,
    /// until `max_per_tick` units are placed or the cap is reached.
    pub fn spawn_tick<R: Rng + ?Sized>(
        &mut self,
        grid: &mut OccupancyGrid,
        rng: &mut R,
    ) -> SpawnReport {
        let mut report = SpawnReport::default();
        let outstanding = self.index.len();
        if self.max_food == 0 || outstanding >= self.max_food {
            return report;
        }
        let scarcity = 1.0 - outstanding as f64 / self.max_food as f64;
        let chance = (self.spawn_rate * (1.0 + scarcity)).min(1.0);
        if rng.random::<f64>() >= chance {
            return report;
        }
        let want = (self.max_food - outstanding).min(self.max_per_tick);
        while report.cells.len() < want && report.attempts < self.spawn_attempts {
            if grid.empty_count() == 0 {
                report.skipped = Some(SpawnError::GridFull);
                self.stats.grid_full_skips += 1;
                tracing::debug!(outstanding = self.index.len(), "food spawn skipped: grid full");
                break;
            }
            report.attempts += 1;
            let cell = random_cell(grid, rng);
            if grid.get(cell) == Ok(CellFlags::EMPTY) && self.place(grid, cell).is_ok() {
                report.cells.push(cell);
            }
        }
        self.stats.attempts += report.attempts as u64;
        report
    }
}

fn random_cell<R: Rng + ?Sized>(grid: &OccupancyGrid, rng: &mut R) -> Cell {
    Cell::new(
        rng.random_range(0..grid.height()) as i32,
        rng.random_range(0..grid.width()) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn manager(max_food: usize, rate: f64) -> FoodManager {
        let config = FoodConfig {
            max_food,
            max_per_tick: 4,
            spawn_attempts: 64,
            spawn_rate: rate,
            ..FoodConfig::default()
        };
        FoodManager::new(&config, 16, 16, 4)
    }

    // ── Index tests ─────────────────────────────────────────────

    #[test]
    fn nearest_breaks_ties_by_row_then_col() {
        let mut idx = FoodIndex::new(10, 10, 4);
        idx.insert(Cell::new(5, 3));
        idx.insert(Cell::new(3, 5));
        idx.insert(Cell::new(4, 6));
        assert_eq!(idx.nearest(Cell::new(4, 4)), Some(Cell::new(3, 5)));
    }

    #[test]
    fn insert_remove_roundtrip() {
        let mut idx = FoodIndex::new(8, 8, 4);
        assert!(idx.insert(Cell::new(1, 1)));
        assert!(!idx.insert(Cell::new(1, 1)));
        assert!(idx.contains(Cell::new(1, 1)));
        assert!(idx.remove(Cell::new(1, 1)));
        assert!(!idx.remove(Cell::new(1, 1)));
        assert!(idx.is_empty());
        assert_eq!(idx.nearest(Cell::new(0, 0)), None);
    }

    proptest! {
        #[test]
        fn bucket_search_matches_linear_scan(
            cells in proptest::collection::hash_set((0i32..64, 0i32..48), 40..120),
            from in (0i32..64, 0i32..48),
        ) {
            let mut idx = FoodIndex::new(48, 64, 8);
            for (r, c) in &cells {
                idx.insert(Cell::new(*r, *c));
            }
            let from = Cell::new(from.0, from.1);
            let expected = cells
                .iter()
                .map(|&(r, c)| Cell::new(r, c))
                .min_by_key(|c| (from.manhattan(*c), *c));
            prop_assert_eq!(idx.nearest(from), expected);
        }
    }

    // ── Spawn tests ─────────────────────────────────────────────

    #[test]
    fn spawn_respects_max_food() {
        let mut grid = OccupancyGrid::new(16, 16).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut fm = manager(6, 1.0);
        for _ in 0..10 {
            fm.spawn_tick(&mut grid, &mut rng);
        }
        assert_eq!(fm.count(), 6);
        assert_eq!(grid.food_count(), 6);
        assert!(fm.spawn_tick(&mut grid, &mut rng).cells.is_empty());
    }

    #[test]
    fn spawn_batch_is_capped_per_tick() {
        let mut grid = OccupancyGrid::new(16, 16).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut fm = manager(100, 1.0);
        let report = fm.spawn_tick(&mut grid, &mut rng);
        assert_eq!(report.cells.len(), 4);
    }

    #[test]
    fn zero_rate_never_spawns() {
        let mut grid = OccupancyGrid::new(16, 16).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut fm = manager(10, 0.0);
        for _ in 0..50 {
            assert!(fm.spawn_tick(&mut grid, &mut rng).cells.is_empty());
        }
    }

    #[test]
    fn full_grid_is_skipped_silently() {
        let mut grid = OccupancyGrid::new(2, 1).unwrap();
        grid.place_body(&[Cell::new(0, 0), Cell::new(0, 1)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut fm = FoodManager::new(
            &FoodConfig {
                max_food: 4,
                spawn_rate: 1.0,
                ..FoodConfig::default()
            },
            2,
            1,
            4,
        );
        let report = fm.spawn_tick(&mut grid, &mut rng);
        assert_eq!(report.skipped, Some(SpawnError::GridFull));
        assert!(report.cells.is_empty());
        assert_eq!(fm.stats().grid_full_skips, 1);
    }

    #[test]
    fn consume_updates_grid_index_and_stats() {
        let mut grid = OccupancyGrid::new(4, 4).unwrap();
        let mut fm = manager(4, 1.0);
        fm.place(&mut grid, Cell::new(1, 2)).unwrap();
        assert_eq!(fm.consume(&mut grid, Cell::new(1, 2)), Ok(true));
        assert_eq!(fm.consume(&mut grid, Cell::new(1, 2)), Ok(false));
        assert_eq!(grid.food_count(), 0);
        assert_eq!(fm.count(), 0);
        assert_eq!(fm.stats().consumed, 1);
        assert_eq!(fm.stats().spawned, 1);
    }

    #[test]
    fn scatter_is_deterministic_per_seed() {
        let run = |seed| {
            let mut grid = OccupancyGrid::new(16, 16).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            manager(0, 0.0).scatter(&mut grid, &mut rng, 10)
        };
        assert_eq!(run(42), run(42));
        assert_eq!(run(42).len(), 10);
    }
}
