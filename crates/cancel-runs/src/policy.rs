//! Decide which collected runs are stale duplicates of the current run.
//!
//! Runs are visited newest first. A run is a cancellation target unless one
//! of the following applies, checked in this order:
//!
//! 1. its id is not lower than the current run's id (current or newer run),
//! 2. it already completed,
//! 3. it was triggered by something other than a push or pull request.
//!
//! Run ids come from a single increasing sequence, so comparing them orders
//! runs by creation without another lookup.

use tracing::debug;

use crate::models::{CollectedRuns, RunRecord};

/// Why a collected run is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotOlder,
    Completed,
    Trigger,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOlder => write!(f, "not older than current run"),
            Self::Completed => write!(f, "already completed"),
            Self::Trigger => write!(f, "trigger event is not deduplicated"),
        }
    }
}

/// First exclusion rule matching `run`, or `None` if it should be cancelled.
#[must_use]
pub fn skip_reason(run: &RunRecord, current_run_id: u64) -> Option<SkipReason> {
    if run.run_id >= current_run_id {
        Some(SkipReason::NotOlder)
    } else if run.status.is_terminal() {
        Some(SkipReason::Completed)
    } else if !run.event.is_deduplicable() {
        Some(SkipReason::Trigger)
    } else {
        None
    }
}

/// Cancellation targets in descending run number order.
#[must_use]
pub fn select_duplicates(collected: &CollectedRuns, current_run_id: u64) -> Vec<RunRecord> {
    collected
        .newest_first()
        .filter(|run| match skip_reason(run, current_run_id) {
            Some(reason) => {
                debug!(
                    run_id = run.run_id,
                    run_number = run.run_number,
                    reason = %reason,
                    "Skipping run"
                );
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}
