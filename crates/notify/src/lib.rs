//! Pipeline failure and recovery notifications.
//!
//! This crate delivers [`Notification`]s to Slack, Discord and generic JSON
//! webhooks when a monitored CI pipeline fails or recovers.
//!
//! # Usage
//!
//! ```no_run
//! use notify::{ChannelSink, Dispatcher, Notification, NotificationKind, SlackSink};
//! use scm::{RunSnapshot, StatusCode};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let slack: Box<dyn ChannelSink> =
//!     Box::new(SlackSink::new("https://hooks.slack.com/services/...".to_string()));
//! let dispatcher = Dispatcher::with_sinks(vec![slack], Duration::from_secs(10));
//!
//! let report = dispatcher
//!     .dispatch(&Notification::new(
//!         NotificationKind::Failure,
//!         "5dlabs/cto",
//!         RunSnapshot::new("42", StatusCode::Failure),
//!         chrono::Utc::now(),
//!     ))
//!     .await;
//! assert_eq!(report.outcomes.len(), 1);
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`ChannelSink`] trait defines the interface for notification sinks
//! - [`SlackSink`], [`WebhookSink`] and [`DiscordSink`] render and post payloads
//! - [`Dispatcher`] delivers one notification to every sink, isolating failures

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod events;

pub use channels::discord::DiscordSink;
pub use channels::slack::SlackSink;
pub use channels::webhook::WebhookSink;
pub use channels::{sink_for, ChannelSink};
pub use error::DeliveryError;
pub use events::{Notification, NotificationKind};

use config::AlertConfig;
use futures::future::join_all;
use std::time::Duration;
use tracing::{debug, error, info};

/// Outcome of one delivery attempt.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: &'static str,
    pub result: Result<(), DeliveryError>,
}

/// Per-sink results of a single dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<SinkOutcome>,
}

impl DispatchReport {
    /// Number of sinks that accepted the notification.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of sinks that failed or timed out.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Central notification dispatcher.
///
/// Every configured sink gets exactly one attempt per notification. Attempts
/// run concurrently, each bounded by its own timeout, and one sink failing
/// never prevents the others from being tried.
pub struct Dispatcher {
    sinks: Vec<Box<dyn ChannelSink>>,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher with specific sinks.
    #[must_use]
    pub fn with_sinks(sinks: Vec<Box<dyn ChannelSink>>, timeout: Duration) -> Self {
        Self { sinks, timeout }
    }

    /// Build one sink per configured target.
    pub fn from_config(config: &AlertConfig) -> Result<Self, DeliveryError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let sinks = config
            .sinks
            .iter()
            .map(|target| {
                debug!(kind = %target.kind, "Configuring notification sink");
                sink_for(target, timeout)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(sink_count = sinks.len(), "Notification dispatcher initialized");
        Ok(Self::with_sinks(sinks, timeout))
    }

    /// Get the number of configured sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver a notification to all sinks and wait for every attempt.
    ///
    /// Errors are logged and returned in the report, never propagated.
    pub async fn dispatch(&self, notification: &Notification) -> DispatchReport {
        if self.sinks.is_empty() {
            debug!("No sinks configured, skipping notification");
            return DispatchReport::default();
        }

        let attempts = self.sinks.iter().map(|sink| async move {
            let name = sink.name();
            let result = match tokio::time::timeout(self.timeout, sink.deliver(notification)).await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Transient(format!(
                    "timed out after {}s",
                    self.timeout.as_secs_f64()
                ))),
            };

            match &result {
                Ok(()) => info!(
                    sink = name,
                    event = notification.kind.as_str(),
                    repository = %notification.repository,
                    run_id = %notification.run.id,
                    "Notification delivered"
                ),
                Err(e) => error!(
                    sink = name,
                    event = notification.kind.as_str(),
                    repository = %notification.repository,
                    run_id = %notification.run.id,
                    error = %e,
                    "Failed to deliver notification"
                ),
            }

            SinkOutcome { sink: name, result }
        });

        DispatchReport {
            outcomes: join_all(attempts).await,
        }
    }
}
