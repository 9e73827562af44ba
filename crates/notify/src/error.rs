//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when delivering a notification to one sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Network failure, timeout, rate limit or server error
    #[error("transient delivery failure: {0}")]
    Transient(String),

    /// The endpoint refused the payload
    #[error("delivery rejected with {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl DeliveryError {
    /// Classify a non-success HTTP response.
    #[must_use]
    pub fn from_response(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient(format!("{status}: {body}"))
        } else {
            Self::Rejected {
                status: status.as_u16(),
                body,
            }
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transient(e.to_string())
    }
}
