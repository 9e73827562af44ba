//! Configuration errors.

use thiserror::Error;

/// Errors that make a configuration unusable. All of them are fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No notification sink was configured
    #[error("at least one notification sink must be configured")]
    NoSinksConfigured,

    /// A required credential or repository field is empty
    #[error("missing required field: {0}")]
    MissingCredentials(&'static str),

    /// Poll interval of zero seconds
    #[error("poll interval must be greater than zero")]
    InvalidInterval,

    /// Platform name not recognised
    #[error("unknown platform '{0}' (expected github or gitlab)")]
    UnknownPlatform(String),

    /// Sink specification could not be parsed
    #[error("invalid sink '{0}'")]
    InvalidSink(String),

    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::AlertConfig`]
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}
