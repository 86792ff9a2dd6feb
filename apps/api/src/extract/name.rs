//! Candidate-name extraction: LLM first, deterministic line scan as fallback.
//!
//! Names always live at the top of a resume, so only the first 1000
//! characters are ever sent anywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::extract::prompts::NAME_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const NAME_TEXT_LIMIT: usize = 1000;
const NAME_MAX_TOKENS: u32 = 100;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d\s\-()+]{10,}").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}[/\-]\d{1,2}[/\-]\d{2,4}|\d{4}[/\-]\d{1,2}[/\-]\d{1,2}").unwrap());
static NAME_AT_LINE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,4})").unwrap());
static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z\-'.]*(?:\s+[A-Za-z][A-Za-z\-'.]*){0,4}$").unwrap());
static HONORIFIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(Mr\.|Mrs\.|Ms\.|Dr\.|Prof\.|Miss\.)\s+").unwrap());
static CONSECUTIVE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2}").unwrap());
static FORBIDDEN_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@/\\|{}<>:;=_*#$%^~`]").unwrap());

/// Section headers a name line never starts with.
const SKIP_KEYWORDS: &[&str] = &[
    "resume",
    "cv",
    "curriculum vitae",
    "objective",
    "summary",
    "experience",
    "education",
    "skills",
    "certifications",
    "projects",
    "references",
    "phone",
    "email",
    "address",
    "linkedin",
    "github",
    "portfolio",
];

/// Shape validation applied to every candidate name, LLM- or regex-sourced:
/// at least two alphabetic characters, at most 100 chars, no runs of digits,
/// no structural punctuation.
pub fn is_plausible_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.len() > 100 {
        return false;
    }
    let letters = trimmed.chars().filter(|c| c.is_alphabetic()).count();
    if letters < 2 {
        return false;
    }
    if CONSECUTIVE_DIGITS.is_match(trimmed) {
        return false;
    }
    if FORBIDDEN_PUNCT.is_match(trimmed) {
        return false;
    }
    true
}

/// Deterministic fallback: scan header lines for a capitalized word sequence
/// that does not look like contact info, a date, or a section header.
pub fn name_from_lines(text: &str) -> Option<String> {
    if text.trim().len() < 3 {
        return None;
    }

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.len() < 2 {
            continue;
        }

        let line_lower = line.to_lowercase();
        if SKIP_KEYWORDS.iter().any(|k| line_lower.starts_with(k)) {
            continue;
        }

        // Lines like "Jane Doe Springfield, IL | jane@x.com": take the leading
        // capitalized run when the remainder is clearly contact/location data.
        if let Some(captures) = NAME_AT_LINE_START.captures(line) {
            let candidate = captures.get(1).unwrap().as_str().trim();
            let word_count = candidate.split_whitespace().count();
            if (2..=4).contains(&word_count) {
                let rest = line[candidate.len()..].trim();
                let rest_is_contactish = rest.is_empty()
                    || rest.contains(',')
                    || rest.contains('|')
                    || EMAIL.is_match(rest)
                    || PHONE.is_match(rest);
                if rest_is_contactish && candidate.len() >= 3 && is_plausible_name(candidate) {
                    debug!(candidate, "name line-scan matched leading capitalized run");
                    return Some(candidate.to_string());
                }
            }
        }

        // Whole-line candidates.
        if line.len() <= 60 {
            if EMAIL.is_match(line)
                || PHONE.is_match(line)
                || URL.is_match(line)
                || DATE.is_match(line)
            {
                continue;
            }
            if NAME_LINE.is_match(line) {
                let cleaned = HONORIFIC.replace(line, "").trim().to_string();
                let letters = cleaned.chars().filter(|c| c.is_alphabetic()).count();
                let non_space = cleaned.chars().filter(|c| !c.is_whitespace()).count();
                if non_space > 0
                    && letters * 10 >= non_space * 7
                    && is_plausible_name(&cleaned)
                {
                    debug!(candidate = %cleaned, "name line-scan matched whole line");
                    return Some(cleaned);
                }
            }
        }
    }
    None
}

/// Extracts the candidate name. Expects the FULL resume text; slicing to the
/// header happens here.
pub async fn extract_name(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    if resume_text.trim().len() < 10 {
        warn!(file_name = filename, "resume text too short for name extraction");
        return None;
    }
    let limited = head(resume_text, NAME_TEXT_LIMIT);

    let prompt =
        format!("{NAME_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):");
    let options = CompletionOptions {
        max_tokens: Some(NAME_MAX_TOKENS),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            if let Some(name) = coerce::coerce_string_field(&raw, "name")
                .and_then(reject_sentinels)
                .filter(|n| is_plausible_name(n))
            {
                info!(file_name = filename, method = "llm", "name extracted");
                return Some(name);
            }
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "LLM name extraction failed, trying line scan");
        }
    }

    let fallback = name_from_lines(limited);
    if fallback.is_some() {
        info!(file_name = filename, method = "line_scan", "name extracted");
    } else {
        info!(file_name = filename, "no name found");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_name_accepts_ordinary_names() {
        assert!(is_plausible_name("Dennis Zabluda"));
        assert!(is_plausible_name("Mary-Jane O'Neil"));
        assert!(is_plausible_name("J. R. Ewing"));
    }

    #[test]
    fn test_plausible_name_rejects_digit_runs() {
        assert!(!is_plausible_name("John 42 Doe"));
        assert!(!is_plausible_name("user1234"));
    }

    #[test]
    fn test_plausible_name_rejects_structural_punctuation() {
        assert!(!is_plausible_name("john@doe"));
        assert!(!is_plausible_name("name|title"));
    }

    #[test]
    fn test_plausible_name_rejects_too_long_and_too_short() {
        assert!(!is_plausible_name("x"));
        assert!(!is_plausible_name(&"a".repeat(101)));
    }

    #[test]
    fn test_line_scan_simple_header() {
        let text = "John Smith\njohn@example.com\nSoftware Engineer";
        assert_eq!(name_from_lines(text), Some("John Smith".to_string()));
    }

    #[test]
    fn test_line_scan_name_with_trailing_contact_info() {
        let text = "Jane Doe Springfield, IL | jane.doe@example.com\nSummary of things";
        assert_eq!(name_from_lines(text), Some("Jane Doe Springfield".to_string()));
    }

    #[test]
    fn test_line_scan_skips_section_headers() {
        let text = "Resume\nObjective statement here\nAlice Walker\nalice@example.com";
        assert_eq!(name_from_lines(text), Some("Alice Walker".to_string()));
    }

    #[test]
    fn test_line_scan_skips_contact_lines() {
        let text = "john.smith@example.com\n555-123-4567 extension 9\nBob Martin";
        assert_eq!(name_from_lines(text), Some("Bob Martin".to_string()));
    }

    #[test]
    fn test_line_scan_strips_honorific() {
        let text = "Dr. Susan Calvin\nsusan@example.com";
        assert_eq!(name_from_lines(text), Some("Susan Calvin".to_string()));
    }

    #[test]
    fn test_line_scan_empty_text() {
        assert_eq!(name_from_lines(""), None);
        assert_eq!(name_from_lines("  \n "), None);
    }
}
