//! Run snapshot types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized pipeline status, shared by every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    Success,
    Failure,
    /// Queued or running
    Pending,
    /// Cancelled, skipped, or a value we don't recognise
    Unknown,
}

impl StatusCode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Pending => "pending",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The most recent run of a pipeline as seen by one fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Platform run id, unique within the repository
    pub id: String,
    pub status: StatusCode,
    /// Link to the run page, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RunSnapshot {
    #[must_use]
    pub fn new(id: impl Into<String>, status: StatusCode) -> Self {
        Self {
            id: id.into(),
            status,
            url: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
