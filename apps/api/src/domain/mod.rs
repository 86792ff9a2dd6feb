//! Industry-domain extraction — the hybrid pipeline.
//!
//! Order of operations: isolate the most recent role (falling back to the
//! experience section, then the resume head), ask the LLM, validate its
//! answer against the deterministic rules, and only then fall back to the
//! rules themselves. Null is the correct answer for ambiguous resumes.

pub mod roles;
pub mod rules;

use crate::extract::prompts::DOMAIN_PROMPT;
use crate::llm::{coerce, CompletionOptions, LlmClient};
use std::time::Duration;
use tracing::{info, warn};

use roles::{
    extract_latest_experience, extract_roles, select_latest_role, validate_role_isolation,
    MAX_ROLE_CHARS,
};

/// Picks the text slice domain reasoning will run on: the validated latest
/// role, else the most recent experience block, else the resume head. All
/// fallbacks are capped at the role character limit.
fn text_to_analyze(resume_text: &str) -> String {
    let all_roles = extract_roles(resume_text);

    if let Some(latest) = select_latest_role(&all_roles) {
        match validate_role_isolation(latest, &all_roles) {
            Ok(()) => {
                let mut text = latest.text.clone();
                if text.chars().count() > MAX_ROLE_CHARS {
                    text = text.chars().take(MAX_ROLE_CHARS).collect();
                }
                info!(
                    role_chars = text.len(),
                    is_current = latest.is_current,
                    end_year = ?latest.end_year,
                    "role isolation validated"
                );
                return text;
            }
            Err(reason) => {
                info!(reason, "role isolation rejected, falling back to experience section");
            }
        }
    }

    let experience = extract_latest_experience(resume_text);
    let source = if experience.trim().len() > 50 {
        experience
    } else {
        resume_text.to_string()
    };
    source.chars().take(MAX_ROLE_CHARS).collect()
}

/// Deterministic fallback chain, applied when the LLM fails, returns null, or
/// is rejected as a hallucination.
fn deterministic_domain(role_text: &str) -> Option<String> {
    rules::check_employer_domain(role_text)
        .or_else(|| rules::check_healthcare_keywords(role_text))
        .or_else(|| rules::check_banking_keywords(role_text))
        .or_else(|| rules::check_retail_keywords(role_text))
        .or_else(|| rules::check_platform_role(role_text))
        .or_else(|| rules::score_domain_keywords(role_text))
        .map(str::to_string)
}

/// Extracts the industry domain of the candidate's most recent role.
/// Never raises; returns None when no evidence supports a domain.
pub async fn extract_domain(
    llm: &LlmClient,
    resume_text: &str,
    filename: &str,
    deadline: Duration,
) -> Option<String> {
    if resume_text.trim().is_empty() {
        warn!(file_name = filename, "empty resume text for domain extraction");
        return None;
    }

    let role_text = text_to_analyze(resume_text);
    if role_text.trim().is_empty() {
        return None;
    }

    let prompt = format!(
        "{DOMAIN_PROMPT}\n\n\
         IMPORTANT CONTEXT:\n\
         The text below represents ONE SINGLE, MOST RECENT JOB ROLE.\n\
         Do NOT infer domain from anything else.\n\
         If domain is unclear, return null (acceptable).\n\n\
         Input resume text (latest role):\n{role_text}\n\n\
         Output (JSON only, no other text, no explanations):"
    );

    // Temperature 0: the same role text must produce the same domain.
    let options = CompletionOptions {
        temperature: 0.0,
        top_p: 0.9,
        max_tokens: Some(500),
        deadline,
    };

    let llm_domain = match llm.complete(&prompt, &options).await {
        Ok(raw) => coerce::coerce_string_field(&raw, "domain"),
        Err(e) => {
            warn!(file_name = filename, error = %e, "LLM domain call failed, using deterministic rules");
            None
        }
    };

    if let Some(domain) = llm_domain {
        match rules::validate_llm_domain(&domain, &role_text) {
            Ok(()) => {
                info!(file_name = filename, domain = %domain, method = "llm_validated", "domain accepted");
                return Some(domain);
            }
            Err(reason) => {
                warn!(
                    file_name = filename,
                    rejected_domain = %domain,
                    reason = %reason,
                    "LLM domain rejected, using deterministic rules"
                );
            }
        }
    }

    let fallback = deterministic_domain(&role_text);
    if let Some(ref domain) = fallback {
        info!(file_name = filename, domain = %domain, method = "deterministic_fallback", "domain determined");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_to_analyze_uses_validated_role() {
        let resume = "\
Summary line that is long enough to not be a header.

Senior Python Developer at Acme Solutions Inc (Jan 2021 - Present)
Built payment processing services for retail clients.

Software Engineer at Initech Ltd (2017 - 2020)
Maintained internal reporting systems.
";
        let text = text_to_analyze(resume);
        assert!(text.contains("Acme Solutions"));
        assert!(!text.contains("Initech"));
    }

    #[test]
    fn test_text_to_analyze_caps_role_body() {
        let mut resume = String::from("Engineer at MegaCorp Inc (2020 - Present)\n");
        for _ in 0..40 {
            resume.push_str("Shipped a feature that mattered to the business unit.\n");
        }
        assert!(resume.len() > MAX_ROLE_CHARS);
        assert!(text_to_analyze(&resume).chars().count() <= MAX_ROLE_CHARS);
    }

    #[test]
    fn test_text_to_analyze_falls_back_to_head_without_roles() {
        let resume = "No dates here at all, just a paragraph about a person.";
        assert_eq!(text_to_analyze(resume), resume);
    }

    #[test]
    fn test_deterministic_chain_employer_beats_keywords() {
        // AWS as a skill mention at a bank resolves to the employer sector.
        let role = "Senior Python Developer at Bank of America. Used AWS S3 and EC2 for storage.";
        assert_eq!(deterministic_domain(role), Some("Banking".to_string()));
    }

    #[test]
    fn test_deterministic_chain_platform_role() {
        let role = "AWS Solutions Architect at TechCorp (2022–present).";
        assert_eq!(deterministic_domain(role), Some("AWS".to_string()));
    }

    #[test]
    fn test_deterministic_chain_null_for_ambiguous_text() {
        assert_eq!(
            deterministic_domain("Did a variety of interesting things at various places."),
            None
        );
    }
}
