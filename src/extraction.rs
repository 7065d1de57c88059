//! Per-paper answer extraction.
//!
//! Each ranked paper's abstract is sent to the language model together with the
//! research question. Replies equal to the sentinel are dropped; every other
//! reply becomes an [`Answer`] tagged with the paper's citation.

use crate::citeas::CitationResolver;
use crate::error::Result;
use crate::llm::{LanguageModel, ModelParams};
use crate::prompts::{build_extraction_prompt, NO_ANSWER_SENTINEL};
use crate::semanticscholar::Paper;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// One extracted answer with its source citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Title of the paper the answer came from
    pub title: String,
    /// Trimmed model reply
    pub answer: String,
    /// Formatted citation, or the paper URL when none could be resolved
    pub citation: String,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} SOURCE: {}", self.answer, self.citation)
    }
}

/// What to do when one paper's citation lookup or model call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Citation failure falls back to the paper URL; model failure aborts
    #[default]
    CitationFallback,
    /// Like `CitationFallback`, but a failed model call skips the paper
    SkipFailed,
    /// Any failure aborts the whole stage
    Abort,
}

impl FailurePolicy {
    fn falls_back_on_citation(self) -> bool {
        !matches!(self, Self::Abort)
    }

    fn skips_failed_model_calls(self) -> bool {
        matches!(self, Self::SkipFailed)
    }
}

/// How model replies are compared against the sentinel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SentinelMatch {
    /// Byte-for-byte equality with `"No answer found."`
    #[default]
    Exact,
    /// Case-insensitive, ignoring surrounding whitespace and trailing periods
    Lenient,
}

impl SentinelMatch {
    pub fn is_no_answer(self, reply: &str) -> bool {
        match self {
            Self::Exact => reply == NO_ANSWER_SENTINEL,
            Self::Lenient => {
                let normalize = |s: &str| s.trim().trim_end_matches('.').trim().to_lowercase();
                normalize(reply) == normalize(NO_ANSWER_SENTINEL)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionOptions {
    pub failure_policy: FailurePolicy,
    pub sentinel: SentinelMatch,
}

/// Extract question-relevant answers from each paper, in ranked order.
pub async fn extract_answers(
    papers: &[Paper],
    research_question: &str,
    params: &ModelParams,
    options: &ExtractionOptions,
    resolver: &dyn CitationResolver,
    model: &dyn LanguageModel,
) -> Result<Vec<Answer>> {
    let mut answers = Vec::new();

    for (idx, paper) in papers.iter().enumerate() {
        let citation = match cite(idx, paper, resolver).await {
            Ok(citation) => citation,
            Err(e) if options.failure_policy.falls_back_on_citation() => {
                warn!(idx = idx, error = %e, "Citation lookup failed, using paper URL");
                fallback_citation(idx, paper)
            }
            Err(e) => return Err(e),
        };

        let prompt = build_extraction_prompt(research_question, paper.abstract_text());
        let reply = match model.complete(&prompt, params).await {
            Ok(reply) => reply,
            Err(e) if options.failure_policy.skips_failed_model_calls() => {
                warn!(
                    idx = idx,
                    title = %paper.title().chars().take(50).collect::<String>(),
                    error = %e,
                    "Extraction failed, skipping paper"
                );
                continue;
            }
            Err(e) => return Err(e),
        };

        if options.sentinel.is_no_answer(&reply) {
            debug!(idx = idx, "No answer in abstract");
            continue;
        }

        let answer = Answer {
            title: paper.title().to_string(),
            answer: reply,
            citation,
        };
        info!(idx = idx, answer = %answer, "Answer found");
        answers.push(answer);
    }

    info!(papers = papers.len(), answers = answers.len(), "Extraction complete");

    Ok(answers)
}

/// DOI-resolved citation, or the paper URL when there is no DOI
async fn cite(idx: usize, paper: &Paper, resolver: &dyn CitationResolver) -> Result<String> {
    match paper.doi() {
        Some(doi) => resolver.resolve_by_doi(doi).await,
        None => Ok(fallback_citation(idx, paper)),
    }
}

/// Paper URL, or the title when the API returned no URL
fn fallback_citation(idx: usize, paper: &Paper) -> String {
    let url = paper.url().trim();
    if !url.is_empty() {
        return url.to_string();
    }

    let title = paper.title().trim();
    warn!(idx = idx, title = %title, "Paper has no DOI or URL, citing by title");
    if title.is_empty() {
        format!("Untitled paper #{}", idx + 1)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResearchError;
    use crate::semanticscholar::ExternalIds;
    use crate::testing::{FakeModel, FakeResolver};

    fn paper(title: &str, url: &str, doi: Option<&str>, abstract_text: &str) -> Paper {
        Paper {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            abstract_text: Some(abstract_text.to_string()),
            external_ids: doi.map(|d| ExternalIds {
                doi: Some(d.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_doi_resolved_and_url_fallback() {
        let papers = vec![
            paper("With DOI", "https://s2/1", Some("10.1/x"), "abstract one"),
            paper("No DOI", "https://s2/2", None, "abstract two"),
        ];
        let resolver = FakeResolver::with(&[("10.1/x", "Doe, 2020")]);
        let model = FakeModel::replying(&["Answer one", "Answer two"]);

        let answers = extract_answers(
            &papers,
            "q",
            &ModelParams::EXTRACTION,
            &ExtractionOptions::default(),
            &resolver,
            &model,
        )
        .await
        .expect("extract");

        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].to_string(), "Answer one SOURCE: Doe, 2020");
        assert_eq!(answers[1].to_string(), "Answer two SOURCE: https://s2/2");
        assert_eq!(resolver.calls(), vec!["10.1/x".to_string()]);
    }

    #[tokio::test]
    async fn test_no_doi_never_calls_resolver() {
        let papers = vec![paper("a", "https://s2/a", None, "x"), paper("b", "https://s2/b", None, "y")];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["one", "two"]);

        let answers = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model)
            .await
            .expect("extract");

        assert!(resolver.calls().is_empty());
        assert_eq!(answers[0].citation, "https://s2/a");
        assert_eq!(answers[1].citation, "https://s2/b");
    }

    #[tokio::test]
    async fn test_sentinel_dropped() {
        let papers = vec![
            paper("a", "u1", None, "x"),
            paper("b", "u2", None, "y"),
            paper("c", "u3", None, "z"),
        ];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["first", "No answer found.", "third"]);

        let answers = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model)
            .await
            .expect("extract");

        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].title, "a");
        assert_eq!(answers[1].title, "c");
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_prompt_contains_question_and_abstract() {
        let papers = vec![paper("a", "u", None, "Automation raised wages.")];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["ok"]);

        extract_answers(&papers, "AI impact on the economy", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model)
            .await
            .expect("extract");

        let prompts = model.prompts();
        assert!(prompts[0].contains("research question: AI impact on the economy from"));
        assert!(prompts[0].contains("This is the abstract: Automation raised wages."));
    }

    #[tokio::test]
    async fn test_missing_abstract_sends_empty() {
        let mut p = paper("a", "u", None, "");
        p.abstract_text = None;
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["No answer found."]);

        let answers = extract_answers(&[p], "q", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model)
            .await
            .expect("extract");

        assert!(answers.is_empty());
        assert!(model.prompts()[0].ends_with("This is the abstract: \n\n"));
    }

    #[test]
    fn test_exact_sentinel_is_strict() {
        assert!(SentinelMatch::Exact.is_no_answer("No answer found."));
        assert!(!SentinelMatch::Exact.is_no_answer("No answer found"));
        assert!(!SentinelMatch::Exact.is_no_answer("no answer found."));
    }

    #[test]
    fn test_lenient_sentinel() {
        assert!(SentinelMatch::Lenient.is_no_answer("No answer found"));
        assert!(SentinelMatch::Lenient.is_no_answer("  no answer found.. "));
        assert!(!SentinelMatch::Lenient.is_no_answer("No answer found for sample size"));
    }

    #[tokio::test]
    async fn test_citation_failure_isolated_falls_back_to_url() {
        let papers = vec![paper("a", "https://s2/a", Some("10.9/missing"), "x")];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["answer"]);

        let answers = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model)
            .await
            .expect("extract");

        assert_eq!(answers[0].citation, "https://s2/a");
    }

    #[tokio::test]
    async fn test_citation_failure_aborts_when_strict() {
        let papers = vec![paper("a", "https://s2/a", Some("10.9/missing"), "x")];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["answer"]);
        let options = ExtractionOptions {
            failure_policy: FailurePolicy::Abort,
            ..Default::default()
        };

        let result = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &options, &resolver, &model).await;

        assert!(matches!(result, Err(ResearchError::CitationUnavailable { .. })));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_model_failure_aborts_by_default() {
        let papers = vec![paper("a", "u1", None, "x"), paper("b", "u2", None, "y")];
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::from_replies(vec![None, None]);

        let result = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &ExtractionOptions::default(), &resolver, &model).await;

        assert!(matches!(result, Err(ResearchError::ModelCallFailed(_))));
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_model_failure_policies() {
        let papers = vec![paper("a", "u1", None, "x"), paper("b", "u2", None, "y")];
        let resolver = FakeResolver::with(&[]);

        let model = FakeModel::from_replies(vec![None, Some("second")]);
        let options = ExtractionOptions {
            failure_policy: FailurePolicy::SkipFailed,
            ..Default::default()
        };
        let answers = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &options, &resolver, &model)
            .await
            .expect("skipped");
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].title, "b");

        let model = FakeModel::from_replies(vec![None, Some("second")]);
        let options = ExtractionOptions {
            failure_policy: FailurePolicy::Abort,
            ..Default::default()
        };
        let result = extract_answers(&papers, "q", &ModelParams::EXTRACTION, &options, &resolver, &model).await;
        assert!(matches!(result, Err(ResearchError::ModelCallFailed(_))));
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_url_cites_title() {
        let mut no_url = paper("Robots and Jobs", "", None, "x");
        no_url.url = None;
        let mut failed_lookup = paper("Automation", "  ", Some("10.9/missing"), "y");
        failed_lookup.url = None;
        let anonymous = paper("", "", None, "z");
        let resolver = FakeResolver::with(&[]);
        let model = FakeModel::replying(&["one", "two", "three"]);

        let answers = extract_answers(
            &[no_url, failed_lookup, anonymous],
            "q",
            &ModelParams::EXTRACTION,
            &ExtractionOptions::default(),
            &resolver,
            &model,
        )
        .await
        .expect("extract");

        assert_eq!(answers[0].to_string(), "one SOURCE: Robots and Jobs");
        assert_eq!(answers[1].citation, "Automation");
        assert_eq!(answers[2].citation, "Untitled paper #3");
        assert!(answers.iter().all(|a| !a.citation.is_empty()));
    }
}
