//! Master-category classification: IT or NON_IT, decided from the first 1000
//! characters. The classifier prompt allows exactly two sentinel lines; any
//! uncertainty, parse failure, or server outage defaults to NON_IT because
//! every downstream routing decision assumes a value exists.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::head;
use crate::extract::prompts::{
    MASTERCATEGORY_IT_SENTINEL, MASTERCATEGORY_NON_IT_SENTINEL, MASTERCATEGORY_PROMPT,
};
use crate::llm::{CompletionOptions, LlmClient};
use crate::models::resume::MasterCategory;

const MASTERCATEGORY_TEXT_LIMIT: usize = 1000;

/// Maps raw classifier output to a category. Navigation sentinels win; a
/// loose "IT" without "NON" is accepted; everything else is NON_IT.
pub fn parse_classifier_output(raw: &str) -> MasterCategory {
    let cleaned = raw.trim().to_uppercase();
    if cleaned.contains(MASTERCATEGORY_IT_SENTINEL) {
        return MasterCategory::It;
    }
    if cleaned.contains(MASTERCATEGORY_NON_IT_SENTINEL) {
        return MasterCategory::NonIt;
    }
    if cleaned.contains("IT") && !cleaned.contains("NON") {
        return MasterCategory::It;
    }
    MasterCategory::NonIt
}

pub async fn extract_master_category(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> MasterCategory {
    let limited = head(resume_text, MASTERCATEGORY_TEXT_LIMIT);
    let prompt = format!(
        "{MASTERCATEGORY_PROMPT}\n\nInput resume text:\n{limited}\n\nOutput (one line only, no explanations):"
    );
    let options = CompletionOptions {
        max_tokens: Some(50),
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let category = parse_classifier_output(&raw);
            info!(
                file_name = filename,
                mastercategory = category.as_db_str(),
                "master category classified"
            );
            category
        }
        Err(e) => {
            warn!(
                file_name = filename,
                error = %e,
                "master category classification failed, defaulting to NON_IT"
            );
            MasterCategory::NonIt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_it_sentinel() {
        assert_eq!(
            parse_classifier_output("NAVIGATE_TO_IT_SKILLS_EXTRACTION"),
            MasterCategory::It
        );
    }

    #[test]
    fn test_non_it_sentinel() {
        assert_eq!(
            parse_classifier_output("NAVIGATE_TO_NON_IT_SKILLS_EXTRACTION"),
            MasterCategory::NonIt
        );
    }

    #[test]
    fn test_sentinel_embedded_in_prose() {
        assert_eq!(
            parse_classifier_output("Result: NAVIGATE_TO_IT_SKILLS_EXTRACTION\nDone."),
            MasterCategory::It
        );
    }

    #[test]
    fn test_loose_it_without_non() {
        assert_eq!(parse_classifier_output("IT"), MasterCategory::It);
    }

    #[test]
    fn test_unclear_output_defaults_to_non_it() {
        assert_eq!(parse_classifier_output(""), MasterCategory::NonIt);
        assert_eq!(parse_classifier_output("maybe?"), MasterCategory::NonIt);
    }
}
