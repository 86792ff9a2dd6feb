//! JSON coercion for noisy model output.
//!
//! Models wrap JSON in markdown fences, prepend prose, or trail explanations.
//! The coercers here never fail: they strip fences, then try progressively
//! more forgiving extraction passes, and fall back to a typed default.

use serde_json::Value;

/// Stringly-typed nulls models emit instead of JSON null.
const NULL_SENTINELS: &[&str] = &["null", "none", "nil", ""];

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Substring from the first `open` to the last matching `close`, inclusive.
fn first_to_last(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Substring balanced by delimiter counting from the first `open`.
fn balanced(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    for (i, c) in text[start..].char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[start..start + i + close.len_utf8()]);
            }
        }
    }
    None
}

/// Extracts a JSON object containing `key` from raw model output.
///
/// Attempts, in order: the full cleaned text, first-`{`-to-last-`}`, then a
/// brace-balanced scan. Returns `None` (the caller's null default) when no
/// pass produces an object with the expected key. Never panics.
pub fn coerce_object(raw: &str, key: &str) -> Option<Value> {
    let cleaned = strip_json_fences(raw);

    let candidates = [
        Some(cleaned),
        first_to_last(cleaned, '{', '}'),
        balanced(cleaned, '{', '}'),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            if map.contains_key(key) {
                return Some(Value::Object(map));
            }
        }
    }
    None
}

/// Extracts the string value for `key`, canonicalizing stringly-null
/// sentinels ("null", "none", "nil", "") to absent.
pub fn coerce_string_field(raw: &str, key: &str) -> Option<String> {
    let object = coerce_object(raw, key)?;
    match object.get(key) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if NULL_SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Extracts a string array for `key`, accepting either `{key: [...]}` or a
/// bare top-level array. Malformed entries are dropped; never raises.
pub fn coerce_string_array(raw: &str, key: &str) -> Vec<String> {
    let cleaned = strip_json_fences(raw);

    let object_candidates = [
        Some(cleaned),
        first_to_last(cleaned, '{', '}'),
        balanced(cleaned, '{', '}'),
    ];
    for candidate in object_candidates.into_iter().flatten() {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            if let Some(Value::Array(items)) = map.get(key) {
                return string_items(items);
            }
        }
    }

    let array_candidates = [
        Some(cleaned),
        first_to_last(cleaned, '[', ']'),
        balanced(cleaned, '[', ']'),
    ];
    for candidate in array_candidates.into_iter().flatten() {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(candidate) {
            return string_items(&items);
        }
    }

    Vec::new()
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_plain_object() {
        assert_eq!(
            coerce_string_field(r#"{"name": "Dennis Zabluda"}"#, "name"),
            Some("Dennis Zabluda".to_string())
        );
    }

    #[test]
    fn test_coerce_fenced_object() {
        let raw = "```json\n{\"domain\": \"Banking\"}\n```";
        assert_eq!(
            coerce_string_field(raw, "domain"),
            Some("Banking".to_string())
        );
    }

    #[test]
    fn test_coerce_object_with_surrounding_prose() {
        let raw = "Here is the result:\n{\"designation\": \"Senior Engineer\"}\nHope that helps!";
        assert_eq!(
            coerce_string_field(raw, "designation"),
            Some("Senior Engineer".to_string())
        );
    }

    #[test]
    fn test_coerce_nested_object_via_balanced_scan() {
        let raw = r#"noise {"domain": "AWS", "evidence": {"title": "AWS Architect"}} trailing } brace"#;
        let object = coerce_object(raw, "domain").unwrap();
        assert_eq!(object["domain"], "AWS");
    }

    #[test]
    fn test_json_null_is_absent() {
        assert_eq!(coerce_string_field(r#"{"name": null}"#, "name"), None);
    }

    #[test]
    fn test_stringly_null_sentinels_are_absent() {
        for sentinel in ["null", "None", "NIL", ""] {
            let raw = format!(r#"{{"domain": "{sentinel}"}}"#);
            assert_eq!(coerce_string_field(&raw, "domain"), None, "{sentinel:?}");
        }
    }

    #[test]
    fn test_missing_key_is_absent() {
        assert_eq!(coerce_string_field(r#"{"other": "x"}"#, "name"), None);
    }

    #[test]
    fn test_garbage_never_panics() {
        assert_eq!(coerce_string_field("{{{{", "name"), None);
        assert_eq!(coerce_string_field("not json at all", "name"), None);
        assert!(coerce_string_array("][", "skills").is_empty());
    }

    #[test]
    fn test_skills_object_form() {
        let raw = r#"{"skills": ["Python", " SQL ", ""]}"#;
        assert_eq!(coerce_string_array(raw, "skills"), vec!["Python", "SQL"]);
    }

    #[test]
    fn test_skills_bare_array_form() {
        let raw = "```\n[\"React\", \"Node.js\"]\n```";
        assert_eq!(
            coerce_string_array(raw, "skills"),
            vec!["React", "Node.js"]
        );
    }

    #[test]
    fn test_skills_array_with_prose() {
        let raw = "The candidate lists: [\"Java\", \"Spring\"] among others.";
        assert_eq!(coerce_string_array(raw, "skills"), vec!["Java", "Spring"]);
    }

    #[test]
    fn test_non_string_entries_dropped() {
        let raw = r#"{"skills": ["Go", 42, null, {"x": 1}]}"#;
        assert_eq!(coerce_string_array(raw, "skills"), vec!["Go"]);
    }
}
