//! Runtime configuration: credentials, service endpoints and request timeout.
//!
//! The credential is passed explicitly into every client constructor; nothing
//! reads process-wide state after startup.

use crate::error::{ResearchError, Result};
use std::time::Duration;
use url::Url;

/// Semantic Scholar graph API base URL
pub const SEMANTIC_SCHOLAR_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

/// CiteAs API base URL
pub const CITEAS_API_BASE: &str = "https://api.citeas.org";

/// OpenAI-compatible chat API base URL
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Contact address sent with citation lookups
pub const DEFAULT_CONTACT_EMAIL: &str = "autoresearcher@example.com";

/// Environment variable holding the language model credential
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Language model provider credential; required by the review stages
    pub openai_api_key: Option<String>,
    /// Optional Semantic Scholar key for higher rate limits
    pub semantic_scholar_api_key: Option<String>,
    pub semantic_scholar_url: String,
    pub citeas_url: String,
    pub openai_base_url: String,
    pub contact_email: String,
    pub request_timeout: Duration,
}

impl Config {
    /// Configuration with default endpoints and the given credential.
    pub fn new(openai_api_key: Option<String>) -> Self {
        Self {
            openai_api_key: non_blank(openai_api_key),
            semantic_scholar_api_key: None,
            semantic_scholar_url: SEMANTIC_SCHOLAR_API_BASE.to_string(),
            citeas_url: CITEAS_API_BASE.to_string(),
            openai_base_url: OPENAI_API_BASE.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Point every service at a single mock server.
    pub fn for_testing(base_uri: &str) -> Self {
        let base = base_uri.trim_end_matches('/');
        Self {
            openai_api_key: Some("test-key".to_string()),
            semantic_scholar_api_key: None,
            semantic_scholar_url: format!("{}/graph/v1", base),
            citeas_url: base.to_string(),
            openai_base_url: format!("{}/v1", base),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_semantic_scholar_key(mut self, key: Option<String>) -> Self {
        self.semantic_scholar_api_key = non_blank(key);
        self
    }

    /// The language model credential.
    ///
    /// Fails with [`ResearchError::MissingCredential`] when it is absent or blank.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or(ResearchError::MissingCredential(OPENAI_API_KEY_ENV))
    }

    pub fn with_contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = email.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check that every endpoint parses as an absolute URL.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("semantic_scholar_url", &self.semantic_scholar_url),
            ("citeas_url", &self.citeas_url),
            ("openai_base_url", &self.openai_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| ResearchError::Config(format!("Invalid {}: {} ({})", name, value, e)))?;
        }
        if self.request_timeout.is_zero() {
            return Err(ResearchError::Config("Request timeout must be positive".to_string()));
        }
        Ok(())
    }

    /// Shared HTTP client honouring the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(format!("autoresearcher/{} (mailto:{})", env!("CARGO_PKG_VERSION"), self.contact_email))
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| ResearchError::Config(format!("Failed to build HTTP client: {}", e)))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
