//! Skills extraction with database-sourced prompt routing.
//!
//! There is deliberately no hard-coded skills prompt: the prompt comes from
//! the prompt store keyed by (master-category, category) with the "other"
//! fallback, and extraction is skipped entirely when no prompt exists.
//! Master-category must be present before this extractor may run.

use std::time::Duration;
use tracing::{info, warn};

use crate::extract::head;
use crate::llm::{coerce, CompletionOptions, LlmClient};
use crate::models::resume::MasterCategory;
use crate::repo::prompt::PromptRepository;

const SKILLS_TEXT_LIMIT: usize = 10_000;
const MAX_SKILLS: usize = 100;

/// Trims, deduplicates preserving first occurrence, and caps the list.
pub fn clean_skills(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut skills = Vec::new();
    for skill in raw {
        let trimmed = skill.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            skills.push(trimmed);
        }
        if skills.len() >= MAX_SKILLS {
            break;
        }
    }
    skills
}

/// Joined storage form for the `skillset` column.
pub fn join_skills(skills: &[String]) -> Option<String> {
    if skills.is_empty() {
        None
    } else {
        Some(skills.join(", "))
    }
}

/// Runs the LLM against a database-sourced prompt and parses the skill list
/// (either `{"skills": [...]}` or a bare array).
pub async fn extract_skills_with_prompt(
    llm: &LlmClient,
    db_prompt: &str,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Vec<String> {
    let limited = head(resume_text, SKILLS_TEXT_LIMIT);
    let prompt = format!(
        "{db_prompt}\n\n<<<RESUME_TEXT>>>\n{limited}\n\nOutput (JSON only, no other text, no explanations):"
    );
    let options = CompletionOptions {
        deadline,
        ..CompletionOptions::default()
    };

    match llm.complete(&prompt, &options).await {
        Ok(raw) => {
            let skills = clean_skills(coerce::coerce_string_array(&raw, "skills"));
            info!(
                file_name = filename,
                skills_count = skills.len(),
                "skills extracted"
            );
            skills
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "skills extraction failed");
            Vec::new()
        }
    }
}

/// Full skills path for one resume: require master-category, resolve the
/// prompt through the store, extract, and return the ", "-joined skillset.
/// Returns None (meaning: store null) whenever a prerequisite is missing.
pub async fn extract_skillset(
    llm: &LlmClient,
    prompts: &PromptRepository,
    master_category: Option<MasterCategory>,
    category: Option<&str>,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    // Null master-category short-circuits: no prompt family can be chosen,
    // so no LLM call is made at all.
    let master_category = match master_category {
        Some(mc) => mc,
        None => {
            warn!(
                file_name = filename,
                "skills extraction skipped: mastercategory is null"
            );
            return None;
        }
    };

    let prompt_row = match prompts.lookup(master_category, category).await {
        Ok(Some(row)) => row,
        Ok(None) => {
            warn!(
                file_name = filename,
                mastercategory = master_category.as_prompt_key(),
                "skills extraction failed: no prompt in database"
            );
            return None;
        }
        Err(e) => {
            warn!(file_name = filename, error = %e, "prompt lookup failed");
            return None;
        }
    };

    let skills =
        extract_skills_with_prompt(llm, &prompt_row.prompt, resume_text, filename, deadline).await;
    join_skills(&skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_skills_trims_and_dedupes_preserving_order() {
        let raw = vec![
            " Python ".to_string(),
            "SQL".to_string(),
            "python".to_string(),
            "".to_string(),
            "Docker".to_string(),
        ];
        assert_eq!(clean_skills(raw), vec!["Python", "SQL", "Docker"]);
    }

    #[test]
    fn test_clean_skills_caps_at_one_hundred() {
        let raw: Vec<String> = (0..150).map(|i| format!("skill{i}")).collect();
        assert_eq!(clean_skills(raw).len(), 100);
    }

    #[test]
    fn test_join_skills_storage_form() {
        let skills = vec!["Python".to_string(), "SQL".to_string()];
        assert_eq!(join_skills(&skills), Some("Python, SQL".to_string()));
        assert_eq!(join_skills(&[]), None);
    }
}
