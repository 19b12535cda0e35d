//! Collaborator trait for the Actions runs API.

use async_trait::async_trait;

use crate::config::Repository;
use crate::error::ApiError;
use crate::models::{RunRecord, RunStatus};

/// Operations the pipeline needs from the runs API.
#[async_trait]
pub trait RunsApi: Send + Sync {
    /// Look up a single run by id.
    async fn get_run(&self, repo: &Repository, run_id: u64) -> Result<RunRecord, ApiError>;

    /// List every run of a workflow with the given status on `branch`.
    ///
    /// Implementations must follow pagination until no pages remain.
    async fn list_runs(
        &self,
        repo: &Repository,
        workflow: &str,
        status: RunStatus,
        branch: &str,
    ) -> Result<Vec<RunRecord>, ApiError>;

    /// Request cancellation of a run.
    async fn cancel_run(&self, repo: &Repository, run_id: u64) -> Result<(), ApiError>;
}
