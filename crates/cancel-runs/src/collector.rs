//! Collect the non-terminal sibling runs of a workflow on one branch.

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::api::RunsApi;
use crate::config::Repository;
use crate::error::Error;
use crate::models::{CollectedRuns, RunStatus};

/// List runs for every status in `statuses` and merge them by run number.
///
/// The listings are issued concurrently; merging starts only after all of
/// them completed.
///
/// # Errors
///
/// Returns [`Error::Listing`] if any listing fails, since a partial set
/// cannot be trusted.
pub async fn collect_runs<A: RunsApi + ?Sized>(
    api: &A,
    repo: &Repository,
    workflow: &str,
    branch: &str,
    statuses: &[RunStatus],
) -> Result<CollectedRuns, Error> {
    let listings = try_join_all(statuses.iter().map(|&status| async move {
        api.list_runs(repo, workflow, status, branch)
            .await
            .map(|runs| (status, runs))
            .map_err(|source| Error::Listing { status, source })
    }))
    .await?;

    let mut collected = CollectedRuns::new();
    for (status, runs) in listings {
        debug!(status = %status, count = runs.len(), "Merging listed runs");
        collected.extend(runs);
    }

    info!(
        workflow,
        branch,
        count = collected.len(),
        "Collected non-terminal runs"
    );
    Ok(collected)
}
