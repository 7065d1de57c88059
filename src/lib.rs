//! # autoresearcher
//!
//! Automated literature review: Semantic Scholar search, citation-count ranking,
//! per-abstract answer extraction and LLM synthesis.
//!
//! ## Modules
//!
//! - [`semanticscholar`] - Paper search client and paper record
//! - [`citeas`] - DOI to formatted citation
//! - [`llm`] - Chat-completion client and model tiers
//! - [`ranking`] - Citation-count ranking
//! - [`extraction`] - Per-paper answer extraction
//! - [`synthesis`] - Literature review synthesis
//! - [`pipeline`] - Stage orchestration
//! - [`output`] - CSV / Markdown export
//! - [`config`] - Credentials and endpoints
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use autoresearcher::{config::Config, pipeline::{ReviewRequest, Services}};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new(std::env::var("OPENAI_API_KEY").ok());
//!     let services = Services::from_config(&config)?;
//!     let result = services.pipeline().run(&ReviewRequest::default()).await?;
//!     println!("{}", result.review);
//!     Ok(())
//! }
//! ```

pub mod citeas;
pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod ranking;
pub mod semanticscholar;
pub mod synthesis;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ResearchError, Result};
