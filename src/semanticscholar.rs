//! Semantic Scholar API Client
//!
//! Single bounded keyword search against the graph API.
//!
//! API Details:
//! - Search endpoint: GET /graph/v1/paper/search
//! - `limit` capped at 100 by the API
//! - Rate limit: 1 req/s (unauthenticated), higher with API key

use crate::config::Config;
use crate::error::{ResearchError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Fields requested for every search hit
pub const SEARCH_FIELDS: &str =
    "title,url,abstract,authors,citationStyles,journal,citationCount,year,externalIds";

/// Paper record as returned by the search endpoint.
///
/// Every field is optional on the wire; accessors below resolve the defaults
/// in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    #[serde(default)]
    pub paper_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub citation_count: Option<u64>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub journal: Option<Journal>,
    #[serde(default)]
    pub citation_styles: Option<CitationStyles>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// External identifiers; only the DOI is interpreted, the rest are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(rename = "DOI", default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationStyles {
    #[serde(default)]
    pub bibtex: Option<String>,
}

impl Paper {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    /// Abstract text, empty when the API has none
    pub fn abstract_text(&self) -> &str {
        self.abstract_text.as_deref().unwrap_or_default()
    }

    /// Non-blank DOI, if the paper has one
    pub fn doi(&self) -> Option<&str> {
        self.external_ids
            .as_ref()
            .and_then(|ids| ids.doi.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Citation count used for ranking; missing counts rank as zero
    pub fn citations(&self) -> u64 {
        self.citation_count.unwrap_or(0)
    }

    /// Author names joined with ", "
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn journal_name(&self) -> &str {
        self.journal
            .as_ref()
            .and_then(|j| j.name.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    data: Vec<Paper>,
}

/// Source of candidate papers for a research question.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Fetch at most `limit` papers matching `query`, optionally restricted to
    /// a `"YYYY-YYYY"` year range.
    async fn fetch(&self, query: &str, limit: u32, year_range: Option<&str>) -> Result<Vec<Paper>>;
}

/// Semantic Scholar search client
pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.semantic_scholar_url.trim_end_matches('/').to_string(),
            api_key: config.semantic_scholar_api_key.clone(),
        }
    }

    fn search_params(query: &str, limit: u32, year_range: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("fields", SEARCH_FIELDS.to_string()),
        ];
        if let Some(years) = year_range {
            params.push(("year", years.to_string()));
        }
        params
    }
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    async fn fetch(&self, query: &str, limit: u32, year_range: Option<&str>) -> Result<Vec<Paper>> {
        if limit == 0 {
            return Err(ResearchError::Validation("limit must be positive".to_string()));
        }

        let url = format!("{}/paper/search", self.base_url);
        let params = Self::search_params(query, limit, year_range);

        debug!(url = %url, query = query, limit = limit, year = ?year_range, "Sending search request");

        let mut request = self.client.get(&url).query(&params);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), error = %error_text, "Semantic Scholar API error");
            return Err(ResearchError::SourceUnavailable {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            ResearchError::Parse(format!("Failed to parse Semantic Scholar response: {}", e))
        })?;

        info!(
            returned = body.data.len(),
            total = body.total.unwrap_or_default(),
            "Semantic Scholar search complete"
        );

        Ok(body.data)
    }
}
