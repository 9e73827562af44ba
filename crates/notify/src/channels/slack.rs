//! Slack webhook notification sink.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::DeliveryError;
use crate::events::{Notification, NotificationKind};
use crate::ChannelSink;

/// Slack incoming-webhook sink.
pub struct SlackSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackSink {
    /// Create a Slack sink with a specific webhook URL.
    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        Self::with_client(webhook_url, reqwest::Client::new())
    }

    #[must_use]
    pub fn with_client(webhook_url: String, client: reqwest::Client) -> Self {
        Self {
            webhook_url,
            client,
        }
    }

    /// Format a notification as a Slack webhook payload.
    fn format_payload(notification: &Notification) -> SlackPayload {
        let (color, status) = match notification.kind {
            NotificationKind::Failure => ("#ff0000", "Failed"),
            NotificationKind::Recovery => ("#00ff00", "Recovered"),
        };

        let fields = vec![
            SlackField {
                title: "Repository".to_string(),
                value: notification.repository.clone(),
                short: true,
            },
            SlackField {
                title: "Status".to_string(),
                value: status.to_string(),
                short: true,
            },
            SlackField {
                title: "Details".to_string(),
                value: notification.details(),
                short: false,
            },
        ];

        SlackPayload {
            text: notification.summary(),
            attachments: vec![SlackAttachment {
                color: color.to_string(),
                fields,
                footer: Some(
                    notification
                        .timestamp
                        .format("%Y-%m-%d %H:%M:%S UTC")
                        .to_string(),
                ),
                ts: Some(notification.timestamp.timestamp()),
            }],
        }
    }
}

#[async_trait]
impl ChannelSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let payload = Self::format_payload(notification);

        debug!(sink = "slack", title = %notification.title(), "Sending notification");

        super::post_json(&self.client, self.name(), &self.webhook_url, &payload).await
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload {
    text: String,
    attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment {
    color: String,
    fields: Vec<SlackField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SlackField {
    title: String,
    value: String,
    short: bool,
}
