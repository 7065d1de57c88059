//! Three-stage review pipeline: fetch & rank, extract, synthesize.
//!
//! Stages run strictly one after another; a stage only starts once the
//! previous one has returned.

use crate::citeas::{CitationResolver, CiteAsClient};
use crate::config::Config;
use crate::error::{ResearchError, Result};
use crate::extraction::{extract_answers, Answer, ExtractionOptions};
use crate::llm::{LanguageModel, ModelParams, OpenAiClient, TokenUsage};
use crate::ranking::rank_top;
use crate::semanticscholar::{Paper, PaperSource, SemanticScholarClient};
use crate::synthesis::synthesize;
use tracing::info;

/// Research question used when none is given
pub const DEFAULT_RESEARCH_QUESTION: &str = "AI impact on the economy";

/// Default publication year window for the search
pub const DEFAULT_YEAR_RANGE: &str = "2010-2023";

/// Inputs for one literature review run
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    pub research_question: String,
    /// Papers requested from the search endpoint
    pub limit: u32,
    /// Papers kept after ranking
    pub top_n: usize,
    pub year_range: Option<String>,
    pub extraction: ModelParams,
    pub synthesis: ModelParams,
    pub options: ExtractionOptions,
}

impl Default for ReviewRequest {
    fn default() -> Self {
        Self {
            research_question: DEFAULT_RESEARCH_QUESTION.to_string(),
            limit: 100,
            top_n: 20,
            year_range: Some(DEFAULT_YEAR_RANGE.to_string()),
            extraction: ModelParams::EXTRACTION,
            synthesis: ModelParams::SYNTHESIS,
            options: ExtractionOptions::default(),
        }
    }
}

impl ReviewRequest {
    pub fn validate(&self) -> Result<()> {
        if self.research_question.trim().is_empty() {
            return Err(ResearchError::Validation("research question is empty".to_string()));
        }
        if self.limit == 0 {
            return Err(ResearchError::Validation("limit must be positive".to_string()));
        }
        self.extraction.validate()?;
        self.synthesis.validate()
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct LiteratureReview {
    pub research_question: String,
    /// Ranked papers the answers were extracted from
    pub papers: Vec<Paper>,
    pub answers: Vec<Answer>,
    pub review: String,
    pub usage: TokenUsage,
}

/// Production clients built from one [`Config`], sharing a single HTTP client
pub struct Services {
    pub source: SemanticScholarClient,
    pub citations: CiteAsClient,
    pub model: OpenAiClient,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = config.http_client()?;
        let model = OpenAiClient::new(http.clone(), config)?;

        Ok(Self {
            source: SemanticScholarClient::new(http.clone(), config),
            citations: CiteAsClient::new(http, config),
            model,
        })
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.source, &self.citations, &self.model)
    }
}

/// Stage 1: fetch candidates and keep the `top_n` most cited
pub async fn fetch_and_rank(
    source: &dyn PaperSource,
    query: &str,
    limit: u32,
    top_n: usize,
    year_range: Option<&str>,
) -> Result<Vec<Paper>> {
    let papers = source.fetch(query, limit, year_range).await?;
    let fetched = papers.len();
    let ranked = rank_top(papers, top_n);

    info!(fetched = fetched, kept = ranked.len(), "Papers ranked by citation count");

    Ok(ranked)
}

pub struct Pipeline<'a> {
    source: &'a dyn PaperSource,
    resolver: &'a dyn CitationResolver,
    model: &'a dyn LanguageModel,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        source: &'a dyn PaperSource,
        resolver: &'a dyn CitationResolver,
        model: &'a dyn LanguageModel,
    ) -> Self {
        Self {
            source,
            resolver,
            model,
        }
    }

    /// Run all three stages for one request.
    pub async fn run(&self, request: &ReviewRequest) -> Result<LiteratureReview> {
        request.validate()?;
        let question = request.research_question.as_str();

        info!(question = question, "Stage 1: fetching papers");
        let papers = fetch_and_rank(
            self.source,
            question,
            request.limit,
            request.top_n,
            request.year_range.as_deref(),
        )
        .await?;

        info!(papers = papers.len(), "Stage 2: extracting answers");
        let answers = extract_answers(
            &papers,
            question,
            &request.extraction,
            &request.options,
            self.resolver,
            self.model,
        )
        .await?;

        info!(answers = answers.len(), "Stage 3: synthesizing review");
        let review = synthesize(&answers, question, &request.synthesis, self.model).await?;

        Ok(LiteratureReview {
            research_question: request.research_question.clone(),
            papers,
            answers,
            review,
            usage: self.model.usage(),
        })
    }
}
