//! Workflow run models and the collected run set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Run status and trigger event
// ============================================================================

/// Workflow run status as reported by the Actions API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Waiting for a runner.
    Queued,
    /// Currently executing.
    InProgress,
    /// Finished, whatever the conclusion.
    Completed,
    /// Any other status (waiting, requested, pending, ...).
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Non-terminal statuses whose runs are candidates for cancellation.
    pub const TRACKED: [Self; 2] = [Self::Queued, Self::InProgress];

    /// Value used for the `status` query filter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Other => "other",
        }
    }

    /// Whether the run has already finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event that triggered a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    Push,
    PullRequest,
    Schedule,
    WorkflowDispatch,
    /// Any other event (`repository_dispatch`, `release`, ...).
    #[serde(other)]
    Other,
}

impl TriggerEvent {
    /// Parse an event name such as `GITHUB_EVENT_NAME`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "push" => Self::Push,
            "pull_request" => Self::PullRequest,
            "schedule" => Self::Schedule,
            "workflow_dispatch" => Self::WorkflowDispatch,
            _ => Self::Other,
        }
    }

    /// Only push and pull request runs can supersede each other.
    #[must_use]
    pub const fn is_deduplicable(self) -> bool {
        matches!(self, Self::Push | Self::PullRequest)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequest => "pull_request",
            Self::Schedule => "schedule",
            Self::WorkflowDispatch => "workflow_dispatch",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Run record
// ============================================================================

/// One workflow run, as returned by the run lookup and listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Globally unique run id.
    #[serde(rename = "id")]
    pub run_id: u64,
    /// Sequential number within the workflow.
    pub run_number: u64,
    /// Current status.
    pub status: RunStatus,
    /// Triggering event.
    pub event: TriggerEvent,
    /// Owning workflow id.
    #[serde(default)]
    pub workflow_id: Option<u64>,
    /// API URL of the owning workflow.
    #[serde(default)]
    pub workflow_url: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl RunRecord {
    /// Identifier of the owning workflow.
    ///
    /// Prefers `workflow_id` and falls back to the last segment of
    /// `workflow_url` (`.../actions/workflows/{id}`).
    #[must_use]
    pub fn workflow_ref(&self) -> Option<String> {
        if let Some(id) = self.workflow_id {
            return Some(id.to_string());
        }
        self.workflow_url
            .as_deref()
            .and_then(|url| url.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(ToString::to_string)
    }
}

// ============================================================================
// Listing pages
// ============================================================================

/// Body of one page of the workflow runs listing.
///
/// Some responses wrap the runs one level deeper than documented, and some
/// proxies return the bare array; all shapes normalize to a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RunsPage {
    Wrapped { workflow_runs: Vec<RunRecord> },
    Nested { workflow_runs: NestedRuns },
    Bare(Vec<RunRecord>),
}

/// Inner object of a [`RunsPage::Nested`] page.
#[derive(Debug, Deserialize)]
pub struct NestedRuns {
    pub workflow_runs: Vec<RunRecord>,
}

impl RunsPage {
    #[must_use]
    pub fn into_runs(self) -> Vec<RunRecord> {
        match self {
            Self::Wrapped { workflow_runs } | Self::Bare(workflow_runs) => workflow_runs,
            Self::Nested { workflow_runs } => workflow_runs.workflow_runs,
        }
    }
}

// ============================================================================
// Collected set
// ============================================================================

/// Sibling runs keyed by run number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedRuns {
    runs: BTreeMap<u64, RunRecord>,
}

impl CollectedRuns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run, replacing any earlier entry with the same run number.
    pub fn insert(&mut self, run: RunRecord) {
        let run_number = run.run_number;
        if let Some(previous) = self.runs.insert(run_number, run) {
            warn!(
                run_number,
                previous_run_id = previous.run_id,
                previous_status = %previous.status,
                "Run number listed more than once, keeping latest entry"
            );
        }
    }

    /// Iterate newest first (descending run number).
    pub fn newest_first(&self) -> impl Iterator<Item = &RunRecord> {
        self.runs.values().rev()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl Extend<RunRecord> for CollectedRuns {
    fn extend<T: IntoIterator<Item = RunRecord>>(&mut self, iter: T) {
        for run in iter {
            self.insert(run);
        }
    }
}

impl FromIterator<RunRecord> for CollectedRuns {
    fn from_iter<T: IntoIterator<Item = RunRecord>>(iter: T) -> Self {
        let mut collected = Self::new();
        collected.extend(iter);
        collected
    }
}
