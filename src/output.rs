//! Export of a finished review into a timestamped output folder.
//!
//! Layout:
//! - `1_papers.csv`   ranked papers, flattened
//! - `2_answers.csv`  extracted answers with citations
//! - `3_review.md`    the literature review and its sources
//! - `token_usage.log`

use crate::error::Result;
use crate::pipeline::LiteratureReview;
use crate::semanticscholar::Paper;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flat CSV row for a ranked paper
#[derive(Debug, Serialize)]
pub struct PaperRow {
    pub rank: usize,
    pub title: String,
    pub authors: String,
    pub year: String,
    pub citation_count: u64,
    pub doi: String,
    pub journal: String,
    pub url: String,
    pub has_abstract: bool,
}

impl PaperRow {
    pub fn new(rank: usize, paper: &Paper) -> Self {
        Self {
            rank,
            title: paper.title().to_string(),
            authors: paper.author_names(),
            year: paper.year.map(|y| y.to_string()).unwrap_or_default(),
            citation_count: paper.citations(),
            doi: paper.doi().unwrap_or_default().to_string(),
            journal: paper.journal_name().to_string(),
            url: paper.url().to_string(),
            has_abstract: !paper.abstract_text().trim().is_empty(),
        }
    }
}

pub fn paper_rows(papers: &[Paper]) -> Vec<PaperRow> {
    papers
        .iter()
        .enumerate()
        .map(|(idx, paper)| PaperRow::new(idx + 1, paper))
        .collect()
}

/// Folder-safe version of the research question
pub fn safe_name(question: &str) -> String {
    question
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Create `{output_dir}/{timestamp}_{question}` and return its path
pub fn create_run_folder(output_dir: &Path, question: &str) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let folder = output_dir.join(format!("{}_{}", timestamp, safe_name(question)));
    std::fs::create_dir_all(&folder)?;
    Ok(folder)
}

/// Save rows to a CSV file with headers; empty input writes nothing
pub fn save_csv<T: Serialize>(path: &Path, data: &[T]) -> Result<bool> {
    if data.is_empty() {
        debug!(path = %path.display(), "No rows to save");
        return Ok(false);
    }

    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;

    info!(path = %path.display(), rows = data.len(), "Saved CSV");
    Ok(true)
}

/// Markdown rendering of the review with its source list
pub fn render_markdown(result: &LiteratureReview) -> String {
    let mut md = format!(
        "# Literature Review\n\n**Research question:** {}\n\n{}\n\n## Findings\n\n",
        result.research_question,
        result.review.trim()
    );

    if result.answers.is_empty() {
        md.push_str("_No paper abstract answered the research question._\n");
    }
    for (idx, answer) in result.answers.iter().enumerate() {
        md.push_str(&format!("{}. **{}**: {}\n", idx + 1, answer.title, answer));
    }
    md
}

/// Write every artifact of a run into a fresh folder under `output_dir`
pub fn save_review(output_dir: &Path, result: &LiteratureReview) -> Result<PathBuf> {
    let folder = create_run_folder(output_dir, &result.research_question)?;

    save_csv(&folder.join("1_papers.csv"), &paper_rows(&result.papers))?;
    save_csv(&folder.join("2_answers.csv"), &result.answers)?;
    std::fs::write(folder.join("3_review.md"), render_markdown(result))?;

    let usage = result.usage;
    let usage_line = format!(
        "{},{},{},{}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens
    );
    std::fs::write(folder.join("token_usage.log"), usage_line)?;

    info!(folder = %folder.display(), "Review exported");
    Ok(folder)
}
