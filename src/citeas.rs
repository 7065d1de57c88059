//! CiteAs API client for formatted citations.
//!
//! Turns a DOI into a ready-to-print citation string. Any failure (transport,
//! status, body shape, empty list) is reported as `CitationUnavailable` so the
//! caller can decide whether one missing citation should stop the review.

use crate::config::Config;
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Resolves a DOI to a formatted citation.
#[async_trait]
pub trait CitationResolver: Send + Sync {
    async fn resolve_by_doi(&self, doi: &str) -> Result<String>;
}

// === CiteAs API Response Types ===

#[derive(Debug, Deserialize)]
struct CiteAsResponse {
    #[serde(default)]
    citations: Vec<CiteAsCitation>,
}

#[derive(Debug, Deserialize)]
struct CiteAsCitation {
    citation: String,
}

pub struct CiteAsClient {
    client: Client,
    base_url: String,
    contact_email: String,
}

impl CiteAsClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.citeas_url.trim_end_matches('/').to_string(),
            contact_email: config.contact_email.clone(),
        }
    }

    /// `{base}/product/{doi}?email={contact}`; the DOI keeps its slashes
    fn product_url(&self, doi: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/product/{}", self.base_url, doi.trim()))
            .map_err(|e| ResearchError::citation(doi, format!("invalid lookup URL: {}", e)))?;
        url.query_pairs_mut().append_pair("email", &self.contact_email);
        Ok(url)
    }
}

#[async_trait]
impl CitationResolver for CiteAsClient {
    async fn resolve_by_doi(&self, doi: &str) -> Result<String> {
        let url = self.product_url(doi)?;

        debug!(doi = doi, "Querying CiteAs");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ResearchError::citation(doi, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::citation(doi, format!("HTTP {}", status.as_u16())));
        }

        let data: CiteAsResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::citation(doi, format!("malformed response: {}", e)))?;

        data.citations
            .into_iter()
            .next()
            .map(|c| c.citation)
            .ok_or_else(|| ResearchError::citation(doi, "no citations returned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_url_keeps_doi_path() {
        let config = Config::for_testing("http://localhost:8080");
        let client = CiteAsClient::new(Client::new(), &config);
        let url = client.product_url("10.1038/nature12373").expect("url");
        assert_eq!(url.path(), "/product/10.1038/nature12373");
        assert_eq!(url.query(), Some("email=autoresearcher%40example.com"));
    }

    #[test]
    fn test_parse_empty_citations() {
        let data: CiteAsResponse = serde_json::from_str(r#"{"name": "x"}"#).expect("json");
        assert!(data.citations.is_empty());
    }
}
