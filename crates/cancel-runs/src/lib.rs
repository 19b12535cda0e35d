//! Cancel superseded GitHub Actions runs.
//!
//! Invoked from inside a running job, this crate finds older queued or
//! in-progress runs of the same workflow on the same branch and cancels them,
//! so only the newest push or pull request run keeps executing.
//!
//! # Pipeline
//!
//! 1. [`resolver::resolve_workflow`] looks up the current run's workflow.
//! 2. [`collector::collect_runs`] lists queued and in-progress runs on the branch.
//! 3. [`policy::select_duplicates`] picks the stale duplicates.
//! 4. [`driver::cancel_targets`] cancels them, isolating per-run failures.
//!
//! # Example
//!
//! ```rust,ignore
//! use cancel_runs::{run, CancelOptions, GitHubClient, Inputs, Target};
//!
//! let client = GitHubClient::new(&token)?;
//! if let Target::Dedupe(ctx) = inputs.resolve_target()? {
//!     let report = run(&client, &ctx, CancelOptions::default()).await?;
//!     println!("cancelled {}", report.cancelled());
//! }
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod collector;
pub mod config;
pub mod driver;
pub mod error;
pub mod github;
pub mod models;
pub mod policy;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use api::RunsApi;
pub use config::{Inputs, Repository, RunContext, Target};
pub use driver::{CancelAttempt, CancelOptions, CancelOutcome, CancelReport};
pub use error::{ApiError, ConfigError, Error};
pub use github::GitHubClient;
pub use models::{CollectedRuns, RunRecord, RunStatus, TriggerEvent};

use tracing::info;

/// Cancel every stale duplicate of the current run.
///
/// Stages run strictly in sequence. Cancel failures are reported in the
/// returned [`CancelReport`] and do not fail the call.
///
/// # Errors
///
/// Returns an [`Error`] if the workflow cannot be resolved or a listing
/// fails; nothing is cancelled in that case.
pub async fn run<A: RunsApi + ?Sized>(
    api: &A,
    ctx: &RunContext,
    options: CancelOptions,
) -> Result<CancelReport, Error> {
    info!(
        repository = %ctx.repository,
        run_id = ctx.run_id,
        event = %ctx.event,
        branch = %ctx.branch,
        "Looking for superseded runs"
    );

    let workflow = resolver::resolve_workflow(api, &ctx.repository, ctx.run_id).await?;
    let collected = collector::collect_runs(
        api,
        &ctx.repository,
        &workflow,
        &ctx.branch,
        &RunStatus::TRACKED,
    )
    .await?;

    let targets = policy::select_duplicates(&collected, ctx.run_id);
    if targets.is_empty() {
        info!("No superseded runs to cancel");
        return Ok(CancelReport::default());
    }
    info!(count = targets.len(), "Found superseded runs");

    Ok(driver::cancel_targets(api, &ctx.repository, &targets, options).await)
}
