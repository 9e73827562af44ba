//! Error types for run lookups.

use thiserror::Error;

/// Errors that can occur while fetching the latest run.
///
/// None of these are fatal to the poll loop: a failed fetch is treated as
/// "no new information" and retried on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, server error or undecodable response
    #[error("transient error: {0}")]
    Transient(String),

    /// Token rejected (HTTP 401/403)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Repository or project not found (HTTP 404)
    #[error("not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = format!("{status}: {body}");
        match status.as_u16() {
            401 | 403 => Self::Auth(detail),
            404 => Self::NotFound(detail),
            _ => Self::Transient(detail),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transient(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            FetchError::from_status(reqwest::StatusCode::UNAUTHORIZED, ""),
            FetchError::Auth(_)
        ));
        assert!(matches!(
            FetchError::from_status(reqwest::StatusCode::FORBIDDEN, ""),
            FetchError::Auth(_)
        ));
        assert!(matches!(
            FetchError::from_status(reqwest::StatusCode::NOT_FOUND, ""),
            FetchError::NotFound(_)
        ));
        assert!(matches!(
            FetchError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream"),
            FetchError::Transient(msg) if msg.contains("upstream")
        ));
    }
}
