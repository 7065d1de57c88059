//! Scripted collaborators for stage tests.

use crate::citeas::CitationResolver;
use crate::error::{ResearchError, Result};
use crate::llm::{LanguageModel, ModelParams};
use crate::semanticscholar::{Paper, PaperSource};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Replies in order; a `None` entry (or running out) fails the call
pub(crate) struct FakeModel {
    replies: Mutex<VecDeque<Option<String>>>,
    calls: Mutex<Vec<(String, ModelParams)>>,
}

impl FakeModel {
    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::from_replies(replies.iter().map(|r| Some(*r)).collect())
    }

    pub(crate) fn from_replies(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(prompt, _)| prompt).collect()
    }

    pub(crate) fn calls(&self) -> Vec<(String, ModelParams)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((prompt.to_string(), *params));
        let next = self.replies.lock().expect("replies lock").pop_front();
        match next {
            Some(Some(reply)) => Ok(reply.trim().to_string()),
            _ => Err(ResearchError::ModelCallFailed("scripted failure".to_string())),
        }
    }
}

/// Known DOIs resolve; anything else is `CitationUnavailable`
pub(crate) struct FakeResolver {
    citations: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub(crate) fn with(citations: &[(&str, &str)]) -> Self {
        Self {
            citations: citations
                .iter()
                .map(|(doi, citation)| (doi.to_string(), citation.to_string()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl CitationResolver for FakeResolver {
    async fn resolve_by_doi(&self, doi: &str) -> Result<String> {
        self.calls.lock().expect("calls lock").push(doi.to_string());
        self.citations
            .get(doi)
            .cloned()
            .ok_or_else(|| ResearchError::citation(doi, "unknown DOI"))
    }
}

/// Returns a fixed paper list, or a fixed HTTP status failure
pub(crate) struct FakeSource {
    result: std::result::Result<Vec<Paper>, u16>,
    calls: Mutex<Vec<(String, u32, Option<String>)>>,
}

impl FakeSource {
    pub(crate) fn papers(papers: Vec<Paper>) -> Self {
        Self {
            result: Ok(papers),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(status: u16) -> Self {
        Self {
            result: Err(status),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, u32, Option<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl PaperSource for FakeSource {
    async fn fetch(&self, query: &str, limit: u32, year_range: Option<&str>) -> Result<Vec<Paper>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((query.to_string(), limit, year_range.map(str::to_string)));
        match &self.result {
            Ok(papers) => Ok(papers.clone()),
            Err(status) => Err(ResearchError::SourceUnavailable { status: *status }),
        }
    }
}
