//! Generic JSON webhook sink.

use async_trait::async_trait;
use scm::RunSnapshot;
use serde::Serialize;
use tracing::debug;

use crate::error::DeliveryError;
use crate::events::Notification;
use crate::ChannelSink;

/// Posts a flat JSON event record to an arbitrary URL.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    #[must_use]
    pub fn with_client(url: String, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    fn format_payload(notification: &Notification) -> WebhookPayload<'_> {
        WebhookPayload {
            event: notification.kind.as_str(),
            repository: &notification.repository,
            timestamp: notification.timestamp.to_rfc3339(),
            run: &notification.run,
        }
    }
}

#[async_trait]
impl ChannelSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        let payload = Self::format_payload(notification);

        debug!(sink = "webhook", event = payload.event, "Sending notification");

        super::post_json(&self.client, self.name(), &self.url, &payload).await
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    event: &'static str,
    repository: &'a str,
    timestamp: String,
    run: &'a RunSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NotificationKind;
    use chrono::TimeZone;
    use scm::StatusCode;

    #[test]
    fn test_payload_shape() {
        let notification = Notification::new(
            NotificationKind::Recovery,
            "group/project",
            RunSnapshot::new("4411", StatusCode::Success),
            chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
        );

        let json = serde_json::to_value(WebhookSink::format_payload(&notification)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "event": "recovery",
                "repository": "group/project",
                "timestamp": "2026-03-01T12:30:00+00:00",
                "run": { "id": "4411", "status": "success" }
            })
        );
    }
}
