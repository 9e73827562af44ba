//! GitLab CI pipeline lookup.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::types::{RunSnapshot, StatusCode};
use crate::RunSnapshotFetcher;

/// Default GitLab instance.
pub const GITLAB_URL: &str = "https://gitlab.com";

/// Fetches the latest pipeline from the GitLab REST API.
pub struct GitLabFetcher {
    client: reqwest::Client,
    token: String,
    endpoint: String,
}

impl GitLabFetcher {
    /// Create a fetcher for the project `owner/repo`. `base_url` points at a
    /// self-hosted instance (without the `/api/v4` suffix).
    pub fn new(
        token: &str,
        owner: &str,
        repo: &str,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let base = base_url.unwrap_or(GITLAB_URL).trim_end_matches('/');
        let project = urlencoding::encode(&format!("{owner}/{repo}")).into_owned();
        Ok(Self {
            client: crate::http_client(timeout)?,
            token: token.to_string(),
            endpoint: format!("{base}/api/v4/projects/{project}/pipelines"),
        })
    }
}

/// Map a GitLab pipeline status onto [`StatusCode`].
#[must_use]
pub fn normalize_status(status: &str) -> StatusCode {
    match status.to_ascii_lowercase().as_str() {
        "success" => StatusCode::Success,
        "failed" => StatusCode::Failure,
        "created" | "waiting_for_resource" | "preparing" | "pending" | "running"
        | "scheduled" | "manual" => StatusCode::Pending,
        _ => StatusCode::Unknown,
    }
}

#[async_trait]
impl RunSnapshotFetcher for GitLabFetcher {
    fn platform(&self) -> &'static str {
        "gitlab"
    }

    async fn fetch_latest(&self) -> Result<Option<RunSnapshot>, FetchError> {
        debug!(endpoint = %self.endpoint, "Fetching latest GitLab pipeline");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("per_page", "1")])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status, &body));
        }

        let pipelines: Vec<Pipeline> = response
            .json()
            .await
            .map_err(|e| FetchError::Transient(format!("failed to decode pipelines: {e}")))?;

        Ok(pipelines.into_iter().next().map(|pipeline| {
            let snapshot =
                RunSnapshot::new(pipeline.id.to_string(), normalize_status(&pipeline.status));
            match pipeline.web_url {
                Some(url) => snapshot.with_url(url),
                None => snapshot,
            }
        }))
    }
}

#[derive(Debug, Deserialize)]
struct Pipeline {
    id: u64,
    status: String,
    web_url: Option<String>,
}
