//! Issue cancellation requests for selected runs.
//!
//! Each target is attempted once. A failed cancellation is logged and
//! recorded in the report; it never aborts the remaining targets.

use futures::stream::{self, StreamExt};
use tracing::{error, info};

use crate::api::RunsApi;
use crate::config::Repository;
use crate::models::RunRecord;

/// Options controlling how cancellations are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOptions {
    /// Log targets without calling the API.
    pub dry_run: bool,
    /// Maximum number of cancel requests in flight.
    pub max_concurrent: usize,
}

impl Default for CancelOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_concurrent: 1,
        }
    }
}

/// Result of one cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    Failed {
        status: Option<u16>,
        message: String,
    },
    DryRun,
}

/// A target and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelAttempt {
    pub run_id: u64,
    pub run_number: u64,
    pub outcome: CancelOutcome,
}

/// Outcomes of all attempts, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelReport {
    pub attempts: Vec<CancelAttempt>,
}

impl CancelReport {
    fn count(&self, pred: impl Fn(&CancelOutcome) -> bool) -> usize {
        self.attempts.iter().filter(|a| pred(&a.outcome)).count()
    }

    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.count(|o| matches!(o, CancelOutcome::Cancelled))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CancelOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn dry_run(&self) -> usize {
        self.count(|o| matches!(o, CancelOutcome::DryRun))
    }
}

async fn cancel_one<A: RunsApi + ?Sized>(
    api: &A,
    repo: &Repository,
    target: &RunRecord,
    dry_run: bool,
) -> CancelAttempt {
    let outcome = if dry_run {
        info!(
            run_id = target.run_id,
            run_number = target.run_number,
            "Dry run, would cancel run"
        );
        CancelOutcome::DryRun
    } else {
        match api.cancel_run(repo, target.run_id).await {
            Ok(()) => {
                info!(
                    run_id = target.run_id,
                    run_number = target.run_number,
                    url = target.html_url.as_deref().unwrap_or_default(),
                    "Cancelled run"
                );
                CancelOutcome::Cancelled
            }
            Err(e) => {
                let status = e.status();
                error!(
                    run_id = target.run_id,
                    run_number = target.run_number,
                    status = ?status,
                    error = %e,
                    "Failed to cancel run"
                );
                CancelOutcome::Failed {
                    status,
                    message: e.to_string(),
                }
            }
        }
    };

    CancelAttempt {
        run_id: target.run_id,
        run_number: target.run_number,
        outcome,
    }
}

/// Attempt to cancel every target.
///
/// Up to `max_concurrent` requests run at once; the report keeps the order of
/// `targets` regardless of completion order.
pub async fn cancel_targets<A: RunsApi + ?Sized>(
    api: &A,
    repo: &Repository,
    targets: &[RunRecord],
    options: CancelOptions,
) -> CancelReport {
    let attempts = stream::iter(targets)
        .map(|target| cancel_one(api, repo, target, options.dry_run))
        .buffered(options.max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await;

    let report = CancelReport { attempts };
    info!(
        targets = targets.len(),
        cancelled = report.cancelled(),
        failed = report.failed(),
        dry_run = report.dry_run(),
        "Cancellation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RunStatus, TriggerEvent};
    use crate::testing::{record, FakeApi};

    fn repo() -> Repository {
        Repository::parse("octo/widgets").unwrap()
    }

    fn targets() -> Vec<RunRecord> {
        vec![
            record(101, 11, RunStatus::InProgress, TriggerEvent::Push),
            record(100, 10, RunStatus::Queued, TriggerEvent::Push),
        ]
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining() {
        let api = FakeApi::default().failing_cancel(101);
        let report = cancel_targets(&api, &repo(), &targets(), CancelOptions::default()).await;

        assert_eq!(api.cancelled(), vec![101, 100]);
        assert_eq!(report.attempts.len(), 2);
        assert_eq!(
            report.attempts[0].outcome,
            CancelOutcome::Failed {
                status: Some(409),
                message: "API error: 409 - Cannot cancel a workflow run that is completed."
                    .to_string(),
            }
        );
        assert_eq!(report.attempts[1].outcome, CancelOutcome::Cancelled);
        assert_eq!(report.cancelled(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_requests() {
        let api = FakeApi::default();
        let options = CancelOptions {
            dry_run: true,
            ..CancelOptions::default()
        };
        let report = cancel_targets(&api, &repo(), &targets(), options).await;

        assert!(api.cancelled().is_empty());
        assert_eq!(report.dry_run(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_keeps_target_order() {
        let api = FakeApi::default();
        let options = CancelOptions {
            dry_run: false,
            max_concurrent: 4,
        };
        let report = cancel_targets(&api, &repo(), &targets(), options).await;

        let ids: Vec<u64> = report.attempts.iter().map(|a| a.run_id).collect();
        assert_eq!(ids, vec![101, 100]);
        assert_eq!(report.cancelled(), 2);
    }

    #[tokio::test]
    async fn test_no_targets() {
        let api = FakeApi::default();
        let report = cancel_targets(&api, &repo(), &[], CancelOptions::default()).await;
        assert!(report.attempts.is_empty());
    }
}
