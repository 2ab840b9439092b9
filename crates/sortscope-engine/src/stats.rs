//! Comparison/swap counters and run timing.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Counters updated by the engine primitives.
///
/// Elapsed time is not a running clock; it is derived from the start
/// instant whenever it is asked for, and frozen once the run ends.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    comparisons: u64,
    swaps: u64,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl Statistics {
    /// Empty counters with no start time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh counters stamped with the current instant.
    pub fn started() -> Self {
        Self {
            started_at: Some(Instant::now()),
            ..Self::default()
        }
    }

    pub fn comparisons(&self) -> u64 {
        self.comparisons
    }

    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    pub fn record_comparison(&mut self) {
        self.comparisons += 1;
    }

    pub fn record_swap(&mut self) {
        self.swaps += 1;
    }

    /// Stop the clock. Later calls keep the first finish instant.
    pub fn finish(&mut self) {
        if self.started_at.is_some() && self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    /// Milliseconds since the run started, or zero before any run.
    pub fn elapsed_ms(&self) -> u64 {
        match self.started_at {
            Some(start) => {
                let end = self.finished_at.unwrap_or_else(Instant::now);
                end.saturating_duration_since(start).as_millis() as u64
            }
            None => 0,
        }
    }

    /// Point-in-time copy for renderers and API responses.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            comparisons: self.comparisons,
            swaps: self.swaps,
            elapsed_ms: self.elapsed_ms(),
        }
    }
}

/// Serializable view of [`Statistics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub comparisons: u64,
    pub swaps: u64,
    pub elapsed_ms: u64,
}
