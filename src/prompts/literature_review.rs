//! Literature review synthesis prompt.

/// Synthesis template.
/// Placeholders: {research_question}, {answer_list}
pub const LITERATURE_REVIEW_TEMPLATE: &str = r#""
`reset`
`no quotes`
`no explanations`
`no prompt`
`no self-reference`
`no apologies`
`no filler`
`just answer`

I will give you a list of research findings and a research question.

Synthesize the list of research findings to generate a scientific literature review. Also, identify knowledge gaps and future research directions.

Make sure to always reference every research finding you use with in-text citations in APA format using the source provided. 

Only use the research findings I provide you with to create your literature review. Only give me the output and nothing else.

Now, using the concepts above, create a literature review for this research question '{research_question}' using the following research findings:

{answer_list}
"#;

/// Build the synthesis prompt from the joined answer list
pub fn build_review_prompt(research_question: &str, answer_list: &str) -> String {
    super::fill_template(
        LITERATURE_REVIEW_TEMPLATE,
        &[("research_question", research_question), ("answer_list", answer_list)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_review_prompt() {
        let prompt = build_review_prompt("AI impact on the economy", "A SOURCE: x\n\nB SOURCE: y");
        assert!(prompt.contains("research question 'AI impact on the economy'"));
        assert!(prompt.ends_with("research findings:\n\nA SOURCE: x\n\nB SOURCE: y\n"));
    }

    #[test]
    fn test_placeholder_text_in_question_kept_literal() {
        let prompt = build_review_prompt("What is {answer_list}?", "A SOURCE: x");
        assert!(prompt.contains("research question 'What is {answer_list}?'"));
        assert_eq!(prompt.matches("A SOURCE: x").count(), 1);
    }

    #[test]
    fn test_empty_answer_list() {
        let prompt = build_review_prompt("q", "");
        assert!(prompt.ends_with("research findings:\n\n\n"));
        assert!(prompt.contains("in APA format"));
    }
}
