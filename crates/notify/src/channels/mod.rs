//! Notification sink implementations.

pub mod discord;
pub mod slack;
pub mod webhook;

use async_trait::async_trait;
use config::{SinkKind, SinkTarget};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::error::DeliveryError;
use crate::events::Notification;

/// Trait for notification sinks (Slack, Discord, generic webhooks).
///
/// Each sink renders the shared [`Notification`] into its own wire format.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    /// Get the name of this sink.
    fn name(&self) -> &'static str;

    /// Deliver a notification to this sink.
    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Build the sink for a configured target. `timeout` bounds each HTTP call.
pub fn sink_for(
    target: &SinkTarget,
    timeout: Duration,
) -> Result<Box<dyn ChannelSink>, DeliveryError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DeliveryError::Transient(format!("failed to build HTTP client: {e}")))?;
    let url = target.url.clone();

    let sink: Box<dyn ChannelSink> = match target.kind {
        SinkKind::Slack => Box::new(slack::SlackSink::with_client(url, client)),
        SinkKind::Webhook => Box::new(webhook::WebhookSink::with_client(url, client)),
        SinkKind::Discord => Box::new(discord::DiscordSink::with_client(url, client)),
    };
    Ok(sink)
}

/// POST a JSON payload and classify the response.
pub(crate) async fn post_json<T: Serialize + Sync>(
    client: &reqwest::Client,
    sink: &'static str,
    url: &str,
    payload: &T,
) -> Result<(), DeliveryError> {
    let response = client.post(url).json(payload).send().await?;

    if response.status().is_success() {
        debug!(sink, "Notification accepted");
        Ok(())
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::from_response(status, body))
    }
}
