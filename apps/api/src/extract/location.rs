//! Candidate-location extraction. Locations live near the header, so only
//! the first 1500 characters are sent.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::LOCATION_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const LOCATION_TEXT_LIMIT: usize = 1500;

pub async fn extract_location(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    if resume_text.trim().len() < 10 {
        return None;
    }
    let limited = head(resume_text, LOCATION_TEXT_LIMIT);
    let prompt =
        format!("{LOCATION_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text):");
    let options = CompletionOptions {
        max_tokens: Some(80),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let location = coerce::coerce_string_field(&raw, "location").and_then(reject_sentinels);
            match &location {
                Some(value) => info!(file_name = filename, location = %value, "location extracted"),
                None => info!(file_name = filename, "no location found"),
            }
            location
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "location extraction failed");
            None
        }
    }
}
