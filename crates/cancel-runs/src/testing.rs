//! In-memory runs API used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::RunsApi;
use crate::config::Repository;
use crate::error::ApiError;
use crate::models::{RunRecord, RunStatus, TriggerEvent};

pub fn record(run_id: u64, run_number: u64, status: RunStatus, event: TriggerEvent) -> RunRecord {
    RunRecord {
        run_id,
        run_number,
        status,
        event,
        workflow_id: None,
        workflow_url: None,
        head_branch: None,
        html_url: None,
    }
}

#[derive(Default)]
pub struct FakeApi {
    runs: HashMap<u64, RunRecord>,
    listings: HashMap<RunStatus, Vec<RunRecord>>,
    failing_listing: Option<RunStatus>,
    failing_cancels: HashSet<u64>,
    pub list_calls: Mutex<Vec<(String, RunStatus, String)>>,
    pub cancelled: Mutex<Vec<u64>>,
}

impl FakeApi {
    pub fn with_run(mut self, run: RunRecord) -> Self {
        self.runs.insert(run.run_id, run);
        self
    }

    pub fn with_listing(mut self, status: RunStatus, runs: Vec<RunRecord>) -> Self {
        self.listings.insert(status, runs);
        self
    }

    pub fn failing_listing(mut self, status: RunStatus) -> Self {
        self.failing_listing = Some(status);
        self
    }

    pub fn failing_cancel(mut self, run_id: u64) -> Self {
        self.failing_cancels.insert(run_id);
        self
    }

    pub fn cancelled(&self) -> Vec<u64> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl RunsApi for FakeApi {
    async fn get_run(&self, _repo: &Repository, run_id: u64) -> Result<RunRecord, ApiError> {
        self.runs
            .get(&run_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("run {run_id}")))
    }

    async fn list_runs(
        &self,
        _repo: &Repository,
        workflow: &str,
        status: RunStatus,
        branch: &str,
    ) -> Result<Vec<RunRecord>, ApiError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((workflow.to_string(), status, branch.to_string()));
        if self.failing_listing == Some(status) {
            return Err(ApiError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(self.listings.get(&status).cloned().unwrap_or_default())
    }

    async fn cancel_run(&self, _repo: &Repository, run_id: u64) -> Result<(), ApiError> {
        self.cancelled.lock().unwrap().push(run_id);
        if self.failing_cancels.contains(&run_id) {
            return Err(ApiError::Api {
                status: 409,
                message: "Cannot cancel a workflow run that is completed.".to_string(),
            });
        }
        Ok(())
    }
}
