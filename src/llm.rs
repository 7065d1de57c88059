//! Chat-completion client for the extraction and synthesis stages.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint with a single
//! user message per call. No retries, no streaming.

use crate::config::Config;
use crate::error::{OptionExt, ResearchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Model quality selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelTier {
    /// Cheaper, faster model
    #[default]
    Fast,
    /// Higher-quality model
    HighQuality,
}

impl ModelTier {
    /// Provider model identifier for this tier
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Fast => "gpt-3.5-turbo",
            Self::HighQuality => "gpt-4",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => f.write_str("fast"),
            Self::HighQuality => f.write_str("high-quality"),
        }
    }
}

impl FromStr for ModelTier {
    type Err = ResearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "high-quality" | "high_quality" | "hq" => Ok(Self::HighQuality),
            other => Err(ResearchError::Validation(format!("Unknown model tier: {}", other))),
        }
    }
}

/// Sampling parameters for one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub tier: ModelTier,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ModelParams {
    /// Short per-abstract answers
    pub const EXTRACTION: Self = Self {
        tier: ModelTier::Fast,
        temperature: 0.1,
        max_tokens: 150,
    };

    /// Multi-paragraph literature review
    pub const SYNTHESIS: Self = Self {
        tier: ModelTier::Fast,
        temperature: 0.1,
        max_tokens: 1800,
    };

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ResearchError::Validation(format!(
                "temperature must be within [0, 1], got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ResearchError::Validation("max_tokens must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            tier: ModelTier::Fast,
            temperature: 0.5,
            max_tokens: 100,
        }
    }
}

/// Token usage tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Accumulated token usage with atomic counters
#[derive(Debug, Default)]
struct AtomicTokenUsage {
    prompt_tokens: AtomicU64,
    completion_tokens: AtomicU64,
    total_tokens: AtomicU64,
}

impl AtomicTokenUsage {
    fn add(&self, usage: &TokenUsage) {
        self.prompt_tokens.fetch_add(usage.prompt_tokens, Ordering::Relaxed);
        self.completion_tokens.fetch_add(usage.completion_tokens, Ordering::Relaxed);
        self.total_tokens.fetch_add(usage.total_tokens, Ordering::Relaxed);
    }

    fn get(&self) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.load(Ordering::Relaxed),
            completion_tokens: self.completion_tokens.load(Ordering::Relaxed),
            total_tokens: self.total_tokens.load(Ordering::Relaxed),
        }
    }
}

/// A text completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` and return the trimmed text of the single choice.
    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String>;

    /// Tokens consumed so far; models that do not report usage return zero
    fn usage(&self) -> TokenUsage {
        TokenUsage::default()
    }
}

// === OpenAI-compatible API structures ===

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(prompt: &'a str, params: &ModelParams) -> Self {
        Self {
            model: params.tier.model_name(),
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// OpenAI chat-completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    usage: AtomicTokenUsage,
}

impl OpenAiClient {
    /// Fails with `MissingCredential` before any request is made when no key is configured.
    pub fn new(client: reqwest::Client, config: &Config) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            api_key: config.require_openai_key()?.to_string(),
            usage: AtomicTokenUsage::default(),
        })
    }

    async fn send(&self, prompt: &str, params: &ModelParams) -> Result<String> {
        let request_body = ChatCompletionRequest::new(prompt, params);
        let api_url = format!("{}/chat/completions", self.base_url);

        debug!(
            model = request_body.model,
            temperature = params.temperature,
            max_tokens = params.max_tokens,
            prompt_chars = prompt.len(),
            "Sending LLM request"
        );

        let response = self
            .client
            .post(&api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ModelCallFailed(format!(
                "LLM API error: {} - {}",
                status, error_text
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Parse(format!("Failed to parse LLM response: {}", e)))?;

        if let Some(u) = api_response.usage {
            self.usage.add(&TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            });
        }

        let content = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_parse("LLM response contained no choices")?
            .message
            .content
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str, params: &ModelParams) -> Result<String> {
        params.validate()?;

        self.send(prompt, params).await.map_err(|e| match e {
            ResearchError::ModelCallFailed(_) => e,
            other => ResearchError::ModelCallFailed(other.to_string()),
        })
    }

    fn usage(&self) -> TokenUsage {
        self.usage.get()
    }
}
