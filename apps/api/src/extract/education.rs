//! Education extraction. The resume is first reduced to its
//! education-relevant lines (keyword line plus one line of leading and four
//! lines of trailing context) so the LLM never reasons over work history.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::EDUCATION_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const EDUCATION_TEXT_LIMIT: usize = 4000;
const CONTEXT_BEFORE: usize = 1;
const CONTEXT_AFTER: usize = 4;

const EDUCATION_KEYWORDS: &[&str] = &[
    "education",
    "academic",
    "qualification",
    "qualifications",
    "degree",
    "university",
    "college",
    "institute",
];

/// Pulls education-relevant text out of a resume: every keyword-bearing line
/// with surrounding context, deduplicated by line index, in document order.
pub fn isolate_education_text(resume_text: &str) -> String {
    let lines: Vec<&str> = resume_text.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let mut keep = vec![false; lines.len()];
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            let start = i.saturating_sub(CONTEXT_BEFORE);
            let end = (i + CONTEXT_AFTER).min(lines.len() - 1);
            for flag in keep.iter_mut().take(end + 1).skip(start) {
                *flag = true;
            }
        }
    }

    lines
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(line, _)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn extract_education(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    let isolated = isolate_education_text(resume_text);
    if isolated.trim().is_empty() {
        info!(file_name = filename, "no education-relevant text found");
        return None;
    }
    let limited = head(&isolated, EDUCATION_TEXT_LIMIT);

    let prompt = format!(
        "{EDUCATION_PROMPT}\n\nInput education text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):"
    );
    let options = CompletionOptions {
        max_tokens: Some(120),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let education =
                coerce::coerce_string_field(&raw, "education").and_then(reject_sentinels);
            match &education {
                Some(value) => info!(file_name = filename, education = %value, "education extracted"),
                None => info!(file_name = filename, "no education found"),
            }
            education
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "education extraction failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESUME: &str = "\
John Smith
Senior Engineer at Acme

EDUCATION
B.Tech in Computer Science
Springfield Institute of Technology
Graduated with honors
Minor in Mathematics
Unrelated trailing line far below

Work summary paragraph";

    #[test]
    fn test_isolation_keeps_keyword_context_window() {
        let isolated = isolate_education_text(RESUME);
        assert!(isolated.contains("EDUCATION"));
        assert!(isolated.contains("B.Tech in Computer Science"));
        assert!(isolated.contains("Springfield Institute of Technology"));
        // Lines outside every context window are not included.
        assert!(!isolated.contains("John Smith"));
        assert!(!isolated.contains("Work summary paragraph"));
    }

    #[test]
    fn test_isolation_overlapping_windows_dedupe() {
        let text = "University of Here\nCollege of There\nplain line";
        let isolated = isolate_education_text(text);
        assert_eq!(isolated.lines().count(), 3);
    }

    #[test]
    fn test_isolation_no_keywords() {
        assert_eq!(isolate_education_text("nothing relevant at all"), "");
        assert_eq!(isolate_education_text(""), "");
    }
}
