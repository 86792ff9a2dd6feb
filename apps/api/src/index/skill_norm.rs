//! Skill normalization: canonical spellings for the vector-store `skills`
//! filter array, so "React.js", "reactjs" and "react" all land on one token.
//!
//! The alias map is frozen at startup. Changing it requires a force-reindex
//! (`POST /reindex-resumes`) to reapply the rules across stored vectors.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static SKILL_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // JavaScript ecosystem
        ("react.js", "react"),
        ("reactjs", "react"),
        ("react js", "react"),
        ("angularjs", "angular"),
        ("angular.js", "angular"),
        ("angular js", "angular"),
        ("vue.js", "vue"),
        ("vuejs", "vue"),
        ("node.js", "nodejs"),
        ("node js", "nodejs"),
        ("node", "nodejs"),
        ("next.js", "nextjs"),
        ("express.js", "express"),
        ("expressjs", "express"),
        ("js", "javascript"),
        ("ecmascript", "javascript"),
        ("ts", "typescript"),
        // Databases
        ("postgres", "postgresql"),
        ("postgre sql", "postgresql"),
        ("ms sql", "sql server"),
        ("mssql", "sql server"),
        ("mongo", "mongodb"),
        ("mongo db", "mongodb"),
        ("my sql", "mysql"),
        // Cloud / infra
        ("amazon web services", "aws"),
        ("google cloud platform", "gcp"),
        ("google cloud", "gcp"),
        ("microsoft azure", "azure"),
        ("k8s", "kubernetes"),
        // Languages & misc
        ("golang", "go"),
        ("c sharp", "c#"),
        ("dotnet", ".net"),
        ("dot net", ".net"),
        (".net core", ".net"),
        ("py", "python"),
        ("ci/cd", "cicd"),
        ("ci-cd", "cicd"),
        ("machine learning", "ml"),
        ("artificial intelligence", "ai"),
        ("restful api", "rest api"),
        ("restful apis", "rest api"),
        ("rest apis", "rest api"),
    ])
});

/// Canonicalizes a single skill token. Idempotent:
/// `normalize_skill(normalize_skill(x)) == normalize_skill(x)`.
pub fn normalize_skill(skill: &str) -> String {
    let lowered = skill.trim().to_lowercase();
    match SKILL_ALIASES.get(lowered.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => lowered,
    }
}

/// Normalizes a list, deduplicating while preserving first occurrence.
pub fn normalize_skill_list<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for skill in skills {
        let normalized = normalize_skill(skill.as_ref());
        if normalized.is_empty() {
            continue;
        }
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_map_to_canonical() {
        assert_eq!(normalize_skill("React.js"), "react");
        assert_eq!(normalize_skill("AngularJS"), "angular");
        assert_eq!(normalize_skill("Amazon Web Services"), "aws");
        assert_eq!(normalize_skill("K8s"), "kubernetes");
    }

    #[test]
    fn test_unknown_skills_just_lowercase() {
        assert_eq!(normalize_skill("Rust"), "rust");
        assert_eq!(normalize_skill("  Terraform "), "terraform");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for skill in ["React.js", "node", "GOLANG", "Rust", "ci/cd", "Postgres"] {
            let once = normalize_skill(skill);
            assert_eq!(normalize_skill(&once), once, "{skill}");
        }
    }

    #[test]
    fn test_canonical_targets_are_fixed_points() {
        // Every alias target must itself normalize to itself, otherwise
        // normalization would not be idempotent.
        for target in super::SKILL_ALIASES.values() {
            assert_eq!(normalize_skill(target), *target, "{target}");
        }
    }

    #[test]
    fn test_list_dedupes_after_normalization() {
        let skills = ["React.js", "reactjs", "react", "SQL"];
        assert_eq!(normalize_skill_list(&skills), vec!["react", "sql"]);
    }

    #[test]
    fn test_list_preserves_first_occurrence_order() {
        let skills = ["Docker", "AWS", "docker", "Python"];
        assert_eq!(normalize_skill_list(&skills), vec!["docker", "aws", "python"]);
    }

    #[test]
    fn test_empty_list() {
        let empty: [&str; 0] = [];
        assert!(normalize_skill_list(&empty).is_empty());
    }
}
