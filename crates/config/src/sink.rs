//! Notification sink targets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Wire format a sink expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Slack incoming webhook (attachments)
    Slack,
    /// Generic JSON webhook (flat event record)
    Webhook,
    /// Discord webhook (embeds)
    Discord,
}

impl SinkKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Slack => "slack",
            Self::Webhook => "webhook",
            Self::Discord => "discord",
        }
    }

    /// Guess the sink kind from a webhook URL.
    #[must_use]
    pub fn infer(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        let rest = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .unwrap_or(&lower);

        if rest.starts_with("hooks.slack.com/") {
            Self::Slack
        } else if rest.starts_with("discord.com/api/webhooks")
            || rest.starts_with("discordapp.com/api/webhooks")
        {
            Self::Discord
        } else {
            Self::Webhook
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slack" => Ok(Self::Slack),
            "webhook" | "generic" => Ok(Self::Webhook),
            "discord" => Ok(Self::Discord),
            _ => Err(ConfigError::InvalidSink(s.to_string())),
        }
    }
}

/// A configured notification destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkTarget {
    pub kind: SinkKind,
    pub url: String,
}

impl SinkTarget {
    /// Parse `kind=url` or a bare URL whose kind is inferred from the host.
    ///
    /// Examples:
    /// - `https://hooks.slack.com/services/...` -> Slack
    /// - `discord=https://proxy.internal/discord` -> Discord
    /// - `https://example.com/ci-events` -> Webhook
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        let (kind, url) = match spec.split_once('=') {
            Some((prefix, url)) if !prefix.contains("://") => (Some(prefix.parse()?), url),
            _ => (None, spec),
        };

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidSink(spec.to_string()));
        }

        Ok(Self {
            kind: kind.unwrap_or_else(|| SinkKind::infer(url)),
            url: url.to_string(),
        })
    }
}

impl FromStr for SinkTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
