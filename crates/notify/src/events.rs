//! Notification types for pipeline state changes.

use chrono::{DateTime, Utc};
use scm::RunSnapshot;
use serde::{Deserialize, Serialize};

/// What happened to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A new run finished in failure
    Failure,
    /// A new run finished successfully
    Recovery,
}

impl NotificationKind {
    /// Wire name used in the generic webhook `event` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Recovery => "recovery",
        }
    }
}

/// One alert, built once per alertable transition and shared read-only by
/// every sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Repository in `owner/repo` form
    pub repository: String,
    pub run: RunSnapshot,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(
        kind: NotificationKind,
        repository: impl Into<String>,
        run: RunSnapshot,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            repository: repository.into(),
            run,
            timestamp,
        }
    }

    /// Get a short title for this notification.
    #[must_use]
    pub fn title(&self) -> String {
        match self.kind {
            NotificationKind::Failure => format!("Pipeline Failed: {}", self.repository),
            NotificationKind::Recovery => format!("Pipeline Recovered: {}", self.repository),
        }
    }

    /// One-line human summary.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.kind {
            NotificationKind::Failure => format!(
                "❌ CI pipeline run {} failed for {}",
                self.run.id, self.repository
            ),
            NotificationKind::Recovery => format!(
                "✅ CI pipeline recovered for {} (run {} succeeded)",
                self.repository, self.run.id
            ),
        }
    }

    /// Details line: the run link when known, the run id otherwise.
    #[must_use]
    pub fn details(&self) -> String {
        self.run
            .url
            .clone()
            .unwrap_or_else(|| format!("Run ID: {}", self.run.id))
    }
}
