//! Prompt module for LLM-based operations.
//!
//! Templates are reproduced verbatim; placeholders use `{name}` syntax and are
//! filled right before each model call.

pub mod extract_answer;
pub mod literature_review;

pub use extract_answer::{build_extraction_prompt, EXTRACT_ANSWER_TEMPLATE, NO_ANSWER_SENTINEL};
pub use literature_review::{build_review_prompt, LITERATURE_REVIEW_TEMPLATE};

/// Fill `{name}` placeholders in one left-to-right pass over `template`.
///
/// Inserted values are never scanned again, so a value containing `{abstract}`
/// stays literal. Unknown `{...}` spans are copied through unchanged.
pub(crate) fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let filled = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });

        match filled {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
