//! Latest pipeline run lookup for GitHub Actions and GitLab CI.
//!
//! Each platform gets one [`RunSnapshotFetcher`] implementation that asks for
//! the single most recent run and normalizes the platform's status vocabulary
//! into [`StatusCode`]. The implementation is chosen once via [`fetcher_for`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod github;
pub mod gitlab;
pub mod types;

pub use error::FetchError;
pub use github::GitHubFetcher;
pub use gitlab::GitLabFetcher;
pub use types::{RunSnapshot, StatusCode};

use async_trait::async_trait;
use config::{AlertConfig, Platform};
use std::time::Duration;
use tracing::debug;

/// User agent sent with every platform API request.
pub(crate) const USER_AGENT: &str = concat!("ci-monitor/", env!("CARGO_PKG_VERSION"));

/// Source of the most recent pipeline run for one repository.
#[async_trait]
pub trait RunSnapshotFetcher: Send + Sync {
    /// Platform identifier, for logging.
    fn platform(&self) -> &'static str;

    /// Fetch the most recent run, or `None` if the repository has no runs yet.
    async fn fetch_latest(&self) -> Result<Option<RunSnapshot>, FetchError>;
}

/// Build the fetcher for the configured platform.
pub fn fetcher_for(config: &AlertConfig) -> Result<Box<dyn RunSnapshotFetcher>, FetchError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let base = config.api_base_url.as_deref();
    debug!(platform = %config.platform, repository = %config.repository(), "Creating run fetcher");

    let fetcher: Box<dyn RunSnapshotFetcher> = match config.platform {
        Platform::GitHub => Box::new(GitHubFetcher::new(
            &config.token,
            &config.owner,
            &config.repo,
            base,
            timeout,
        )?),
        Platform::GitLab => Box::new(GitLabFetcher::new(
            &config.token,
            &config.owner,
            &config.repo,
            base,
            timeout,
        )?),
    };
    Ok(fetcher)
}

/// Shared HTTP client construction for platform fetchers.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Transient(format!("failed to build HTTP client: {e}")))
}
