//! Email and mobile extraction — fully deterministic, no LLM round-trip.
//!
//! Contact details sit in the resume header and follow rigid shapes, so a
//! regex scan over the head of the text is both faster and more reliable
//! than a model call.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract::head;

const CONTACT_TEXT_LIMIT: usize = 3000;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static PHONE_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{8,}\d").unwrap());

static NON_PHONE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\d+]").unwrap());

/// Lowercases and shape-validates an email. Returns None for anything that
/// does not look like a deliverable address.
pub fn normalize_email(email: &str) -> Option<String> {
    let cleaned = email.trim().to_lowercase();
    EMAIL_SHAPE.is_match(&cleaned).then_some(cleaned)
}

/// Strips punctuation and produces E.164 where the digit count allows it
/// (10-digit and 1-prefixed 11-digit NANP numbers). Other lengths pass
/// through digits-only.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let cleaned = NON_PHONE_CHARS.replace_all(phone.trim(), "").to_string();
    if cleaned.is_empty() {
        return None;
    }
    if let Some(rest) = cleaned.strip_prefix('+') {
        return (rest.len() >= 9).then_some(cleaned);
    }
    match cleaned.len() {
        10 => Some(format!("+1{cleaned}")),
        11 if cleaned.starts_with('1') => Some(format!("+{cleaned}")),
        7..=15 => Some(cleaned),
        _ => None,
    }
}

/// First email address in the resume head, normalized.
pub fn extract_email(resume_text: &str) -> Option<String> {
    let slice = head(resume_text, CONTACT_TEXT_LIMIT);
    EMAIL
        .find_iter(slice)
        .find_map(|m| normalize_email(m.as_str()))
}

/// First phone-shaped token in the resume head, normalized. Year ranges and
/// short ids are filtered by the digit-count window.
pub fn extract_mobile(resume_text: &str) -> Option<String> {
    let slice = head(resume_text, CONTACT_TEXT_LIMIT);
    PHONE_CANDIDATE.find_iter(slice).find_map(|m| {
        let digits = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
        if (10..=15).contains(&digits) {
            normalize_phone(m.as_str())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases() {
        assert_eq!(
            normalize_email(" John.Smith@Example.COM "),
            Some("john.smith@example.com".to_string())
        );
    }

    #[test]
    fn test_normalize_email_rejects_garbage() {
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("a@b"), None);
        assert_eq!(normalize_email(""), None);
    }

    #[test]
    fn test_normalize_phone_nanp_ten_digits() {
        assert_eq!(
            normalize_phone("(555) 123-4567"),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_nanp_eleven_digits() {
        assert_eq!(
            normalize_phone("1-555-123-4567"),
            Some("+15551234567".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_international_passthrough() {
        assert_eq!(
            normalize_phone("+91 98765 43210"),
            Some("+919876543210".to_string())
        );
    }

    #[test]
    fn test_normalize_phone_rejects_empty() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("ext."), None);
    }

    #[test]
    fn test_extract_email_from_header() {
        let resume = "John Smith\njohn.smith@example.com | (555) 123-4567\nEngineer";
        assert_eq!(
            extract_email(resume),
            Some("john.smith@example.com".to_string())
        );
    }

    #[test]
    fn test_extract_mobile_from_header() {
        let resume = "John Smith\njohn.smith@example.com | (555) 123-4567\nEngineer";
        assert_eq!(extract_mobile(resume), Some("+15551234567".to_string()));
    }

    #[test]
    fn test_extract_mobile_ignores_year_ranges() {
        let resume = "Worked 2017 - 2020 at a place\nNo phone listed anywhere in this text";
        assert_eq!(extract_mobile(resume), None);
    }

    #[test]
    fn test_extract_contact_missing() {
        assert_eq!(extract_email("no contact info"), None);
        assert_eq!(extract_mobile("no contact info"), None);
    }
}
