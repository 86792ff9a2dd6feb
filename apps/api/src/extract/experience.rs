//! Total-experience extraction. The stored value is a free-form duration
//! string ("5 years", "10+ years"); the numeric parse lives here too because
//! the vector indexer needs experience-in-years for range filters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::EXPERIENCE_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const EXPERIENCE_TEXT_LIMIT: usize = 6000;

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// First number in the free-form experience string, truncated to whole years.
/// "5.5 years" → 5, "10+ years" → 10, "fresher" → None.
pub fn parse_experience_years(experience: &str) -> Option<i64> {
    FIRST_NUMBER
        .find(experience)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|years| years as i64)
}

pub async fn extract_experience(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    let limited = head(resume_text, EXPERIENCE_TEXT_LIMIT);
    let prompt = format!(
        "{EXPERIENCE_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):"
    );
    let options = CompletionOptions {
        max_tokens: Some(60),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let experience =
                coerce::coerce_string_field(&raw, "experience").and_then(reject_sentinels);
            match &experience {
                Some(value) => info!(file_name = filename, experience = %value, "experience extracted"),
                None => info!(file_name = filename, "no experience found"),
            }
            experience
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "experience extraction failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_years() {
        assert_eq!(parse_experience_years("5 years"), Some(5));
        assert_eq!(parse_experience_years("10+ years"), Some(10));
    }

    #[test]
    fn test_parse_fractional_years_truncates() {
        assert_eq!(parse_experience_years("2.5 years"), Some(2));
    }

    #[test]
    fn test_parse_no_number() {
        assert_eq!(parse_experience_years("fresher"), None);
        assert_eq!(parse_experience_years(""), None);
    }
}
