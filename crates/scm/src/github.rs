//! GitHub Actions run lookup.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{RunSnapshot, StatusCode};
use crate::RunSnapshotFetcher;

/// Default GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Fetches the latest workflow run from the GitHub REST API.
pub struct GitHubFetcher {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl GitHubFetcher {
    /// Create a fetcher for `owner/repo`. `base_url` overrides the public API
    /// (GitHub Enterprise or a test server).
    pub fn new(
        token: &str,
        owner: &str,
        repo: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base = base_url.unwrap_or(GITHUB_API_URL).trim_end_matches('/');
        Ok(Self {
            client: crate::http_client(timeout)?,
            token: token.to_string(),
            endpoint: format!(
                "{base}/repos/{}/{}/actions/runs",
                urlencoding::encode(owner),
                urlencoding::encode(repo)
            ),
        })
    }
}

/// Map a workflow run's `status` and `conclusion` onto [`StatusCode`].
///
/// Anything short of `completed` is still in flight; once completed the
/// conclusion decides.
#[must_use]
pub fn normalize_status(status: Option<&str>, conclusion: Option<&str>) -> StatusCode {
    let completed = status.is_some_and(|s| s.eq_ignore_ascii_case("completed"));
    if !completed {
        return StatusCode::Pending;
    }

    match conclusion.map(str::to_ascii_lowercase).as_deref() {
        Some("success") => StatusCode::Success,
        Some("failure" | "timed_out" | "startup_failure") => StatusCode::Failure,
        _ => StatusCode::Unknown,
    }
}

#[async_trait]
impl RunSnapshotFetcher for GitHubFetcher {
    fn platform(&self) -> &'static str {
        "github"
    }

    async fn fetch_latest(&self) -> Result<Option<RunSnapshot>, FetchError> {
        debug!(endpoint = %self.endpoint, "Fetching latest GitHub workflow run");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("per_page", "1")])
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, &body));
        }

        let runs: WorkflowRunsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Transient(format!("failed to decode workflow runs: {e}")))?;

        Ok(runs.workflow_runs.into_iter().next().map(|run| {
            let snapshot = RunSnapshot::new(
                run.id.to_string(),
                normalize_status(run.status.as_deref(), run.conclusion.as_deref()),
            );
            match run.html_url {
                Some(url) => snapshot.with_url(url),
                None => snapshot,
            }
        }))
    }
}

// =============================================================================
// GitHub API types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
    status: Option<String>,
    conclusion: Option<String>,
    html_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_in_flight() {
        for status in ["queued", "in_progress", "waiting", "requested", "pending"] {
            assert_eq!(normalize_status(Some(status), None), StatusCode::Pending);
        }
        assert_eq!(normalize_status(None, None), StatusCode::Pending);
    }

    #[test]
    fn test_normalize_completed() {
        let completed = Some("completed");
        assert_eq!(normalize_status(completed, Some("success")), StatusCode::Success);
        assert_eq!(normalize_status(Some("COMPLETED"), Some("Success")), StatusCode::Success);
        assert_eq!(normalize_status(completed, Some("failure")), StatusCode::Failure);
        assert_eq!(normalize_status(completed, Some("timed_out")), StatusCode::Failure);
        assert_eq!(
            normalize_status(completed, Some("startup_failure")),
            StatusCode::Failure
        );
        assert_eq!(normalize_status(completed, Some("cancelled")), StatusCode::Unknown);
        assert_eq!(normalize_status(completed, Some("skipped")), StatusCode::Unknown);
        assert_eq!(normalize_status(completed, None), StatusCode::Unknown);
    }

    #[test]
    fn test_endpoint_uses_base_override() {
        let fetcher = GitHubFetcher::new(
            "t",
            "5dlabs",
            "cto",
            Some("https://ghe.example.com/api/v3/"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            fetcher.endpoint,
            "https://ghe.example.com/api/v3/repos/5dlabs/cto/actions/runs"
        );
    }
}
