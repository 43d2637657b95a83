//! Per-tick performance and outcome metrics.
//!
//! [`StepMetrics`] is returned in every [`TickReport`](crate::TickReport)
//! and retained as [`Engine::last_metrics`](crate::Engine::last_metrics).

use slither_path::{FallbackReason, PathOutcome};

use crate::intent::Proposal;

/// Timing and outcome counters for a single tick.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Time spent in the parallel intention phase, in microseconds.
    pub intent_us: u64,
    /// Time spent in cache write-back and the sequential commit, in microseconds.
    pub commit_us: u64,
    /// Time spent in cleanup, food spawning and emission, in microseconds.
    pub cleanup_us: u64,
    /// Live agents at the end of the tick.
    pub live_agents: usize,
    /// Proposals served from a cached path.
    pub cache_hits: u32,
    /// Proposals that ran A* to completion.
    pub paths_computed: u32,
    /// Proposals that used the fallback safe-move search.
    pub fallbacks: u32,
    /// Of `fallbacks`, those caused by the expansion cap.
    pub exhausted: u32,
    /// A* node expansions across all agents.
    pub nodes_expanded: u64,
    /// Agents with no safe move.
    pub no_safe_moves: u32,
    /// Agents not planned before the intent deadline.
    pub intents_skipped: u32,
    /// Agents that died this tick.
    pub deaths: u32,
    /// Food units eaten this tick.
    pub food_eaten: u32,
    /// Food units spawned this tick.
    pub food_spawned: u32,
    /// Spawn rounds cut short by a full grid.
    pub grid_full_skips: u32,
    /// Sectors dirtied by this tick's commit.
    pub dirty_sectors: usize,
    /// Occurrences dropped because a subscriber queue was full.
    pub occurrences_dropped: u64,
    /// True if `total_us` exceeded the target tick duration.
    pub over_budget: bool,
}

impl StepMetrics {
    /// Fold one proposal into the planning counters.
    pub(crate) fn record(&mut self, proposal: &Proposal) {
        match proposal {
            Proposal::Planned(decision) => match decision.outcome {
                PathOutcome::CacheHit => self.cache_hits += 1,
                PathOutcome::Computed { expanded, .. } => {
                    self.paths_computed += 1;
                    self.nodes_expanded += expanded as u64;
                }
                PathOutcome::Fallback { reason, expanded } => {
                    self.fallbacks += 1;
                    self.nodes_expanded += expanded as u64;
                    if reason == FallbackReason::Exhausted {
                        self.exhausted += 1;
                    }
                }
            },
            Proposal::Boxed(_) => self.no_safe_moves += 1,
            Proposal::Skipped => self.intents_skipped += 1,
        }
    }

    /// Fraction of planned agents served from cache, in `[0, 1]`.
    pub fn cache_hit_rate(&self) -> f64 {
        let planned = self.cache_hits + self.paths_computed + self.fallbacks;
        if planned == 0 {
            0.0
        } else {
            f64::from(self.cache_hits) / f64::from(planned)
        }
    }
}
