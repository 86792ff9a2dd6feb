//! Field extractors.
//!
//! Each extractor takes the resume text and filename, restricts the input to
//! the slice where the field actually lives, runs the LLM through the
//! gateway + coercer, applies field-specific deterministic rules, and returns
//! `Option<String>`. Extractors never raise across their boundary — failure
//! is `None`, logged with a reason, and the pipeline continues.

pub mod category;
pub mod contact;
pub mod designation;
pub mod education;
pub mod experience;
pub mod location;
pub mod master_category;
pub mod name;
pub mod prompts;
pub mod role;
pub mod skills;

/// First `limit` characters of the text (char-aligned, never panics on
/// multi-byte input).
pub fn head(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Common post-processing: trim and drop placeholder sentinels the models
/// emit instead of null.
pub fn reject_sentinels(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.to_lowercase().as_str() {
        "null" | "none" | "nil" | "other" | "n/a" | "unknown" => None,
        _ => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_respects_char_boundaries() {
        assert_eq!(head("héllo wörld", 5), "héllo");
        assert_eq!(head("short", 100), "short");
        assert_eq!(head("", 10), "");
    }

    #[test]
    fn test_reject_sentinels() {
        assert_eq!(reject_sentinels("  Banking ".into()), Some("Banking".into()));
        assert_eq!(reject_sentinels("null".into()), None);
        assert_eq!(reject_sentinels("Other".into()), None);
        assert_eq!(reject_sentinels("  ".into()), None);
        assert_eq!(reject_sentinels("N/A".into()), None);
    }
}
