//! Pathfinder tuning.

/// Pathfinder configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathConfig {
    /// Maximum A* node expansions per query. `None` derives the cap from
    /// grid area (see [`PathConfig::resolved_max_expansions`]).
    pub max_expansions: Option<usize>,
    /// Maximum cells visited by the fallback safe-move search.
    pub fallback_nodes: usize,
}

impl PathConfig {
    /// Lower bound of the derived expansion cap.
    pub const MIN_AUTO_EXPANSIONS: usize = 64;
    /// Upper bound of the derived expansion cap.
    pub const MAX_AUTO_EXPANSIONS: usize = 4096;

    /// Resolve the expansion cap for a grid of `cell_count` cells.
    ///
    /// - `Some(n)` → `n`
    /// - `None` → a quarter of the grid area, clamped to
    ///   `[MIN_AUTO_EXPANSIONS, MAX_AUTO_EXPANSIONS]`
    pub fn resolved_max_expansions(&self, cell_count: usize) -> usize {
        match self.max_expansions {
            Some(n) => n,
            None => (cell_count / 4).clamp(Self::MIN_AUTO_EXPANSIONS, Self::MAX_AUTO_EXPANSIONS),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_expansions: None,
            fallback_nodes: 64,
        }
    }
}
