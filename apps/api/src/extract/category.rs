//! Granular category extraction. Consumes the already-decided master
//! category and produces the free-form label that names the vector-store
//! namespace and selects the skills prompt. Stored lowercase.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::CATEGORY_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};
use crate::models::resume::MasterCategory;

const CATEGORY_TEXT_LIMIT: usize = 3000;

/// Canonical stored form: trimmed, lowercase.
pub fn canonicalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

pub async fn extract_category(
    llm: &LlmClient,
    resume_text: &str,
    master_category: MasterCategory,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    let limited = head(resume_text, CATEGORY_TEXT_LIMIT);
    let prompt = format!(
        "{CATEGORY_PROMPT}\n\nMaster category: {}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):",
        master_category.as_db_str()
    );
    let options = CompletionOptions {
        max_tokens: Some(80),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let category = coerce::coerce_string_field(&raw, "category")
                .and_then(reject_sentinels)
                .map(|c| canonicalize_category(&c));
            match &category {
                Some(value) => info!(file_name = filename, category = %value, "category extracted"),
                None => info!(file_name = filename, "no category found"),
            }
            category
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "category extraction failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_lowercases_and_trims() {
        assert_eq!(
            canonicalize_category("  Full Stack Development (Java) "),
            "full stack development (java)"
        );
    }
}
