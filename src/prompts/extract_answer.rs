//! Per-abstract answer extraction prompt.

/// Literal reply meaning the abstract holds no answer
pub const NO_ANSWER_SENTINEL: &str = "No answer found.";

/// Extraction template.
/// Placeholders: {research_question}, {abstract}
pub const EXTRACT_ANSWER_TEMPLATE: &str = r#""
`reset`
`no quotes`
`no explanations`
`no prompt`
`no self-reference`
`no apologies`
`no filler`
`just answer`

I will give you the abstract of an academic paper. Extract the answer to this research question: {research_question} from the abstract. 

Also assess the study quality of the paper based on its abstract. Consider the following factors: study design, sample size, data collection methods, and statistical analysis techniques.

If the answer is not in the abstract then you are only allowed to respond with 'No answer found'.

This is the abstract: {abstract}

"#;

/// Build the extraction prompt for one abstract
pub fn build_extraction_prompt(research_question: &str, abstract_text: &str) -> String {
    super::fill_template(
        EXTRACT_ANSWER_TEMPLATE,
        &[("research_question", research_question), ("abstract", abstract_text)],
    )
}
