//! Designation (explicit job title) extraction. Straight LLM call with the
//! "current > most recent > headline > first occurrence" selection prompt;
//! no normalization of the returned title.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::DESIGNATION_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const DESIGNATION_TEXT_LIMIT: usize = 6000;

pub async fn extract_designation(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    let limited = head(resume_text, DESIGNATION_TEXT_LIMIT);
    let prompt = format!(
        "{DESIGNATION_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):"
    );
    let options = CompletionOptions {
        max_tokens: Some(100),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let designation =
                coerce::coerce_string_field(&raw, "designation").and_then(reject_sentinels);
            match &designation {
                Some(value) => info!(file_name = filename, designation = %value, "designation extracted"),
                None => info!(file_name = filename, "no designation found"),
            }
            designation
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "designation extraction failed");
            None
        }
    }
}
