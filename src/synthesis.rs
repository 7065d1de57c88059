//! Literature review synthesis from the collected answers.

use crate::error::Result;
use crate::extraction::Answer;
use crate::llm::{LanguageModel, ModelParams};
use crate::prompts::build_review_prompt;
use tracing::info;

/// Join answers with a blank line, in the order received
pub fn answer_list(answers: &[Answer]) -> String {
    answers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ask the model for one literature review over all answers.
///
/// Always issues exactly one model call, also when `answers` is empty.
/// The reply is returned as-is.
pub async fn synthesize(
    answers: &[Answer],
    research_question: &str,
    params: &ModelParams,
    model: &dyn LanguageModel,
) -> Result<String> {
    let prompt = build_review_prompt(research_question, &answer_list(answers));

    info!(answers = answers.len(), max_tokens = params.max_tokens, "Synthesizing literature review");

    model.complete(&prompt, params).await
}
