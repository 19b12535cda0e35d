//! Resolve the workflow that owns the current run.

use tracing::info;

use crate::api::RunsApi;
use crate::config::Repository;
use crate::error::Error;

/// Look up the current run and return its workflow identifier.
///
/// # Errors
///
/// Returns [`Error::Resolution`] if the run cannot be fetched or carries no
/// workflow reference.
pub async fn resolve_workflow<A: RunsApi + ?Sized>(
    api: &A,
    repo: &Repository,
    run_id: u64,
) -> Result<String, Error> {
    let run = api
        .get_run(repo, run_id)
        .await
        .map_err(|e| Error::Resolution {
            run_id,
            reason: e.to_string(),
        })?;

    let workflow = run.workflow_ref().ok_or_else(|| Error::Resolution {
        run_id,
        reason: "run has no workflow reference".to_string(),
    })?;

    info!(run_id, workflow = %workflow, run_number = run.run_number, "Resolved workflow");
    Ok(workflow)
}
