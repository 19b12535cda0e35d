//! GitHub Actions API client.
//!
//! API Documentation: <https://docs.github.com/en/rest/actions/workflow-runs>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::api::RunsApi;
use crate::config::Repository;
use crate::error::ApiError;
use crate::models::{RunRecord, RunStatus, RunsPage};

/// Public GitHub API.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Largest page size the listing endpoint accepts.
const PAGE_SIZE: &str = "100";

/// GitHub API client for workflow runs.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client for the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against another API root (GitHub Enterprise, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("cancel-runs/1.0"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repo: &Repository) -> String {
        format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.name)
    }

    /// Turn a non-success response into an [`ApiError`].
    async fn error_for(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            ApiError::NotFound(message)
        } else {
            ApiError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Fetch one listing page, returning its runs and the next page URL.
    async fn fetch_page(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(Vec<RunRecord>, Option<String>), ApiError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let next = next_page_url(response.headers());
        let text = response.text().await?;
        let page: RunsPage = serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse runs page");
            ApiError::Serialization(e)
        })?;

        Ok((page.into_runs(), next))
    }
}

#[async_trait]
impl RunsApi for GitHubClient {
    async fn get_run(&self, repo: &Repository, run_id: u64) -> Result<RunRecord, ApiError> {
        let url = format!("{}/actions/runs/{run_id}", self.repo_url(repo));
        debug!(url = %url, "GET run");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse run");
            ApiError::Serialization(e)
        })
    }

    async fn list_runs(
        &self,
        repo: &Repository,
        workflow: &str,
        status: RunStatus,
        branch: &str,
    ) -> Result<Vec<RunRecord>, ApiError> {
        let url = format!(
            "{}/actions/workflows/{workflow}/runs",
            self.repo_url(repo)
        );
        debug!(url = %url, status = %status, branch, "GET workflow runs");

        let first = self.client.get(&url).query(&[
            ("status", status.as_str()),
            ("branch", branch),
            ("per_page", PAGE_SIZE),
        ]);
        let (mut runs, mut next) = self.fetch_page(first).await?;
        let mut pages = 1_u32;

        while let Some(next_url) = next {
            debug!(url = %next_url, page = pages + 1, "GET workflow runs (next page)");
            let (page_runs, page_next) = self.fetch_page(self.client.get(&next_url)).await?;
            runs.extend(page_runs);
            next = page_next;
            pages += 1;
        }

        debug!(status = %status, pages, count = runs.len(), "Listed workflow runs");
        Ok(runs)
    }

    async fn cancel_run(&self, repo: &Repository, run_id: u64) -> Result<(), ApiError> {
        let url = format!("{}/actions/runs/{run_id}/cancel", self.repo_url(repo));
        debug!(url = %url, "POST cancel run");

        let response = self.client.post(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_for(response).await)
        }
    }
}

/// Extract the `rel="next"` target from a `Link` header.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(ToString::to_string)
    })
}
