//! Discord webhook notification sink.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::DeliveryError;
use crate::events::{Notification, NotificationKind};
use crate::ChannelSink;

/// Discord webhook sink (embeds).
pub struct DiscordSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordSink {
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

    fn format_payload(notification: &Notification) -> DiscordPayload {
        let color = match notification.kind {
            NotificationKind::Failure => 0x00ff_0000,  // Red
            NotificationKind::Recovery => 0x0000_ff00, // Green
        };

        DiscordPayload {
            content: notification.summary(),
            embeds: vec![DiscordEmbed {
                title: notification.title(),
                color,
                fields: vec![
                    DiscordField {
                        name: "Repository".to_string(),
                        value: notification.repository.clone(),
                        inline: true,
                    },
                    DiscordField {
                        name: "Status".to_string(),
                        value: notification.run.status.to_string(),
                        inline: true,
                    },
                    DiscordField {
                        name: "Details".to_string(),
                        value: notification.details(),
                        inline: false,
                    },
                ],
                timestamp: notification.timestamp.to_rfc3339(),
            }],
        }
    }
}

#[async_trait]
impl ChannelSink for DiscordSink {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let payload = Self::format_payload(notification);

        debug!(sink = "discord", title = %notification.title(), "Sending notification");

        super::post_json(&self.client, self.name(), &self.webhook_url, &payload).await
    }
}

// =============================================================================
// Discord API types
// =============================================================================

#[derive(Debug, Serialize)]
struct DiscordPayload {
    content: String,
    embeds: Vec<DiscordEmbed>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed {
    title: String,
    color: u32,
    fields: Vec<DiscordField>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct DiscordField {
    name: String,
    value: String,
    inline: bool,
}
