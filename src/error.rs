//! Custom error types for autoresearcher.
//!
//! Every library function returns `Result<T, ResearchError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for autoresearcher operations.
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Paper search endpoint answered with a non-success status
    #[error("Paper source unavailable: HTTP {status}")]
    SourceUnavailable {
        /// HTTP status code returned by the search endpoint
        status: u16,
    },

    /// Citation lookup for a single DOI failed
    #[error("Citation unavailable for DOI {doi}: {reason}")]
    CitationUnavailable { doi: String, reason: String },

    /// Language model request failed (transport, API status or response shape)
    #[error("Model call failed: {0}")]
    ModelCallFailed(String),

    /// Required credential is absent at startup
    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ResearchError {
    pub(crate) fn citation(doi: &str, reason: impl Into<String>) -> Self {
        Self::CitationUnavailable {
            doi: doi.to_string(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SourceUnavailable { status } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias using `ResearchError`
pub type Result<T> = std::result::Result<T, ResearchError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| ResearchError::Parse(msg.to_string()))
    }
}
