//! Error types for Recap.

use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    /// Missing or blank required input, rejected before any upstream call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Nothing selected for re-summarization; no request was issued.
    #[error("Select at least one original text to summarize")]
    EmptySelection,

    #[error("Upstream did not answer within {0} seconds")]
    UpstreamTimeout(u64),

    /// Upstream answered with a non-success status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        detail: Option<serde_json::Value>,
    },

    #[error("Could not reach upstream: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RecapError {
    /// HTTP status reported for this error at the gateway boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            RecapError::Validation(_) | RecapError::EmptySelection => 400,
            RecapError::Upstream { status, .. } => *status,
            RecapError::UpstreamTimeout(_) => 504,
            _ => 500,
        }
    }

    /// Forwarded upstream detail, when the upstream supplied one.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            RecapError::Upstream { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
