//! Job-role extraction: the candidate's primary functional role, distinct
//! from the `designation` column and never reconciled with it.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::prompts::ROLE_PROMPT;
use crate::extract::{head, reject_sentinels};
use crate::llm::{coerce, CompletionOptions, LlmClient};

const ROLE_TEXT_LIMIT: usize = 6000;

pub async fn extract_role(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    let limited = head(resume_text, ROLE_TEXT_LIMIT);
    let prompt = format!(
        "{ROLE_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (JSON only, no other text, no explanations):"
    );
    let options = CompletionOptions {
        max_tokens: Some(100),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let role = coerce::coerce_string_field(&raw, "role").and_then(reject_sentinels);
            match &role {
                Some(value) => info!(file_name = filename, role = %value, "job role extracted"),
                None => info!(file_name = filename, "no job role found"),
            }
            role
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "job role extraction failed");
            None
        }
    }
}
