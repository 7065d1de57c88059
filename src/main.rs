//! autoresearcher - automated literature review
//!
//! Searches Semantic Scholar for a research question, ranks the hits by
//! citation count, extracts an answer from every abstract and synthesizes a
//! short literature review.
//!
//! ## Usage
//!
//! ```bash
//! autoresearcher review "AI impact on the economy" --top-n 20
//! autoresearcher search "AI impact on the economy" --all-years
//! ```

use anyhow::{Context, Result};
use autoresearcher::config::{Config, DEFAULT_CONTACT_EMAIL, DEFAULT_TIMEOUT_SECS};
use autoresearcher::extraction::{ExtractionOptions, FailurePolicy, SentinelMatch};
use autoresearcher::llm::{ModelParams, ModelTier};
use autoresearcher::output;
use autoresearcher::pipeline::{
    fetch_and_rank, ReviewRequest, Services, DEFAULT_RESEARCH_QUESTION, DEFAULT_YEAR_RANGE,
};
use autoresearcher::semanticscholar::SemanticScholarClient;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Automated literature review from Semantic Scholar abstracts
#[derive(Parser)]
#[command(name = "autoresearcher")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Semantic Scholar API key (optional, raises rate limits)
    #[arg(long, global = true, env = "SEMANTIC_SCHOLAR_API_KEY", hide_env_values = true)]
    s2_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full review: search, extract answers, synthesize
    Review(ReviewArgs),

    /// Search and rank papers only
    Search(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// Research question (also used as the search query)
    #[arg(default_value = DEFAULT_RESEARCH_QUESTION)]
    question: String,

    /// Papers requested from Semantic Scholar
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=100))]
    limit: u32,

    /// Papers kept after ranking by citation count
    #[arg(long, default_value_t = 20)]
    top_n: usize,

    /// Publication year range (e.g., "2010-2023")
    #[arg(long, default_value = DEFAULT_YEAR_RANGE, conflicts_with = "all_years")]
    year_range: String,

    /// Search all publication years
    #[arg(long)]
    all_years: bool,
}

impl SearchArgs {
    fn year_range(&self) -> Option<String> {
        (!self.all_years).then(|| self.year_range.clone())
    }
}

#[derive(Args)]
struct ReviewArgs {
    #[command(flatten)]
    search: SearchArgs,

    /// Language model credential
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Contact email sent with citation lookups
    #[arg(long, env = "CITEAS_EMAIL", default_value = DEFAULT_CONTACT_EMAIL)]
    citeas_email: String,

    /// Model tier: fast or high-quality
    #[arg(long, default_value = "fast")]
    tier: ModelTier,

    /// Sampling temperature for answer extraction
    #[arg(long, default_value_t = ModelParams::EXTRACTION.temperature)]
    extract_temperature: f64,

    /// Max tokens per extracted answer
    #[arg(long, default_value_t = ModelParams::EXTRACTION.max_tokens)]
    extract_max_tokens: u32,

    /// Sampling temperature for the review
    #[arg(long, default_value_t = ModelParams::SYNTHESIS.temperature)]
    review_temperature: f64,

    /// Max tokens for the review
    #[arg(long, default_value_t = ModelParams::SYNTHESIS.max_tokens)]
    review_max_tokens: u32,

    /// Abort the whole review when one paper's citation lookup fails
    #[arg(long, conflicts_with = "skip_failed")]
    strict: bool,

    /// Skip papers whose extraction call fails instead of aborting
    #[arg(long)]
    skip_failed: bool,

    /// Accept case and trailing-period variants of "No answer found."
    #[arg(long)]
    lenient_sentinel: bool,

    /// Write papers, answers and the review into a timestamped folder here
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl ReviewArgs {
    fn request(&self) -> ReviewRequest {
        ReviewRequest {
            research_question: self.search.question.clone(),
            limit: self.search.limit,
            top_n: self.search.top_n,
            year_range: self.search.year_range(),
            extraction: ModelParams {
                tier: self.tier,
                temperature: self.extract_temperature,
                max_tokens: self.extract_max_tokens,
            },
            synthesis: ModelParams {
                tier: self.tier,
                temperature: self.review_temperature,
                max_tokens: self.review_max_tokens,
            },
            options: ExtractionOptions {
                failure_policy: if self.strict {
                    FailurePolicy::Abort
                } else if self.skip_failed {
                    FailurePolicy::SkipFailed
                } else {
                    FailurePolicy::CitationFallback
                },
                sentinel: if self.lenient_sentinel {
                    SentinelMatch::Lenient
                } else {
                    SentinelMatch::Exact
                },
            },
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.log_json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Review(args) => {
            let config = Config::new(args.openai_api_key.clone())
                .with_semantic_scholar_key(cli.s2_key)
                .with_contact_email(args.citeas_email.clone())
                .with_timeout(timeout);
            run_review(&config, &args).await
        }
        Commands::Search(args) => {
            let config = Config::new(None)
                .with_semantic_scholar_key(cli.s2_key)
                .with_timeout(timeout);
            run_search(&config, &args).await
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

async fn run_review(config: &Config, args: &ReviewArgs) -> Result<()> {
    let services = Services::from_config(config).context("Failed to initialise clients")?;
    let request = args.request();

    println!("Research question: {}", request.research_question);
    println!("Auto Researcher initiated!");
    println!(
        "\n--- Fetching top {} papers, extracting answers, synthesizing ---",
        request.top_n
    );

    let result = services
        .pipeline()
        .run(&request)
        .await
        .context("Literature review failed")?;

    println!(
        "Reviewed {} papers, {} contained an answer.",
        result.papers.len(),
        result.answers.len()
    );
    println!("\nAcademic Literature Review:\n\n{}\n", result.review);

    let usage = result.usage;
    info!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "Token usage"
    );

    if let Some(dir) = &args.output {
        let folder = output::save_review(dir, &result).context("Failed to export review")?;
        println!("✓ Results in: {}", folder.display());
    }

    Ok(())
}

async fn run_search(config: &Config, args: &SearchArgs) -> Result<()> {
    config.validate()?;
    let source = SemanticScholarClient::new(config.http_client()?, config);
    let year_range = args.year_range();

    println!("\n--- Searching Semantic Scholar: {} ---", args.question);

    let papers = fetch_and_rank(&source, &args.question, args.limit, args.top_n, year_range.as_deref())
        .await
        .context("Search failed")?;

    if papers.is_empty() {
        println!("No results from Semantic Scholar.");
        return Ok(());
    }

    for row in output::paper_rows(&papers) {
        println!(
            "{:>3}. [{:>6} cites] {} ({}) {}",
            row.rank,
            row.citation_count,
            row.title,
            if row.year.is_empty() { "n.d." } else { row.year.as_str() },
            if row.doi.is_empty() { row.url.as_str() } else { row.doi.as_str() }
        );
    }

    Ok(())
}
