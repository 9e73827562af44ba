//! Configuration types for the CI pipeline monitor.
//!
//! An [`AlertConfig`] is built once at start-up (from CLI flags, environment
//! variables or a JSON file) and is read-only afterwards. [`AlertConfig::validate`]
//! must pass before the monitor touches the network.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod sink;

pub use error::ConfigError;
pub use sink::{SinkKind, SinkTarget};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default timeout applied to every outbound HTTP call, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// CI/CD platform hosting the monitored pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub Actions
    GitHub,
    /// GitLab CI
    GitLab,
}

impl Platform {
    /// Lowercase identifier used on the command line and in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GitHub => "github",
            Self::GitLab => "gitlab",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            other => Err(ConfigError::UnknownPlatform(other.to_string())),
        }
    }
}

/// Immutable monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Platform to poll
    pub platform: Platform,
    /// API token (never logged)
    #[serde(skip_serializing)]
    pub token: String,
    /// Repository owner, user or group
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Notification sinks; at least one is required
    #[serde(default)]
    pub sinks: Vec<SinkTarget>,
    /// Seconds between poll cycles in continuous mode
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Keep polling until cancelled instead of running a single cycle
    #[serde(default)]
    pub continuous: bool,
    /// Timeout for each outbound HTTP call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Override for the platform API base URL (GitHub Enterprise, self-hosted GitLab)
    #[serde(default)]
    pub api_base_url: Option<String>,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl AlertConfig {
    /// Create a configuration with default interval, timeout and single-shot mode.
    #[must_use]
    pub fn new(
        platform: Platform,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        sinks: Vec<SinkTarget>,
    ) -> Self {
        Self {
            platform,
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            sinks,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            continuous: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            api_base_url: None,
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading monitor configuration");
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(ConfigError::Parse)
    }

    /// Repository identifier in `owner/repo` form.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Check that the configuration is usable before polling starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sinks.is_empty() {
            return Err(ConfigError::NoSinksConfigured);
        }
        for (field, value) in [
            ("token", &self.token),
            ("owner", &self.owner),
            ("repo", &self.repo),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingCredentials(field));
            }
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn slack() -> SinkTarget {
        SinkTarget::parse("https://hooks.slack.com/services/T/B/X").unwrap()
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("GitHub".parse::<Platform>().unwrap(), Platform::GitHub);
        assert_eq!(" gitlab ".parse::<Platform>().unwrap(), Platform::GitLab);
        assert!(matches!(
            "bitbucket".parse::<Platform>(),
            Err(ConfigError::UnknownPlatform(p)) if p == "bitbucket"
        ));
    }

    #[test]
    fn test_validate_requires_sinks() {
        let config = AlertConfig::new(Platform::GitHub, "t", "5dlabs", "cto", vec![]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoSinksConfigured)
        ));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let config = AlertConfig::new(Platform::GitHub, "  ", "5dlabs", "cto", vec![slack()]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredentials("token"))
        ));

        let config = AlertConfig::new(Platform::GitLab, "t", "5dlabs", "", vec![slack()]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingCredentials("repo"))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = AlertConfig::new(Platform::GitHub, "t", "5dlabs", "cto", vec![slack()]);
        config.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));

        config.poll_interval_secs = 30;
        assert!(config.validate().is_ok());
        assert_eq!(config.repository(), "5dlabs/cto");
    }

    #[test]
    fn test_from_file_applies_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "platform": "gitlab",
                "token": "glpat-123",
                "owner": "group",
                "repo": "project",
                "sinks": [{{"kind": "webhook", "url": "https://example.com/hook"}}]
            }}"#
        )
        .unwrap();

        let config = AlertConfig::from_file(file.path()).unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(!config.continuous);
        assert_eq!(config.sinks[0].kind, SinkKind::Webhook);
    }

    #[test]
    fn test_from_file_missing() {
        let err = AlertConfig::from_file("/nonexistent/monitor.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_token_not_serialized() {
        let config = AlertConfig::new(Platform::GitHub, "secret", "o", "r", vec![slack()]);
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
