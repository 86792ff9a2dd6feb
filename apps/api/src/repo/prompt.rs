//! Prompt Store — read-only lookups against the `prompts` table.
//!
//! Rows are keyed by (mastercategory, category) in the prompt table's own
//! spelling ("IT" / "non IT"). The category "other" row per mastercategory is
//! the fallback sentinel and is required for the service to be healthy.

use sqlx::PgPool;
use tracing::{debug, warn};

use crate::models::prompt::PromptRow;
use crate::models::resume::MasterCategory;

/// The lookup plan for a skills prompt: at most two probes, never recursion.
/// Category set → (mc, category) then (mc, "other"); category unset →
/// (mc, "other") directly.
pub fn prompt_probes(
    master_category: MasterCategory,
    category: Option<&str>,
) -> Vec<(&'static str, String)> {
    let key = master_category.as_prompt_key();
    match category {
        Some(c) if !c.trim().is_empty() => {
            vec![(key, c.trim().to_string()), (key, "other".to_string())]
        }
        _ => vec![(key, "other".to_string())],
    }
}

pub struct PromptRepository {
    pool: PgPool,
}

impl PromptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        mastercategory: &str,
        category: &str,
    ) -> Result<Option<PromptRow>, sqlx::Error> {
        let row = sqlx::query_as::<_, PromptRow>(
            "SELECT id, mastercategory, category, prompt FROM prompts \
             WHERE mastercategory = $1 AND category = $2",
        )
        .bind(mastercategory)
        .bind(category)
        .fetch_optional(&self.pool)
        .await?;

        if row.is_none() {
            debug!(mastercategory, category, "no prompt row found");
        }
        Ok(row)
    }

    /// Resolves the skills prompt for a resume via the two-probe plan.
    pub async fn lookup(
        &self,
        master_category: MasterCategory,
        category: Option<&str>,
    ) -> Result<Option<PromptRow>, sqlx::Error> {
        for (key, cat) in prompt_probes(master_category, category) {
            if let Some(row) = self.get(key, &cat).await? {
                if !row.prompt.trim().is_empty() {
                    return Ok(Some(row));
                }
            }
        }
        warn!(
            mastercategory = master_category.as_prompt_key(),
            category = category.unwrap_or("<null>"),
            "no prompt found, including the 'other' fallback"
        );
        Ok(None)
    }

    /// Health-check surface: both (IT, "other") and (non IT, "other") rows
    /// must exist. Returns the list of missing prompt descriptions.
    pub async fn missing_required_prompts(&self) -> Result<Vec<String>, sqlx::Error> {
        let mut missing = Vec::new();
        for (key, label) in [("IT", "IT + 'other'"), ("non IT", "NON_IT + 'other'")] {
            let row = self.get(key, "other").await?;
            if row.map(|r| r.prompt.trim().is_empty()).unwrap_or(true) {
                missing.push(label.to_string());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probes_with_specific_category() {
        let probes = prompt_probes(
            MasterCategory::NonIt,
            Some("Pharmaceuticals & Clinical Research"),
        );
        assert_eq!(
            probes,
            vec![
                ("non IT", "Pharmaceuticals & Clinical Research".to_string()),
                ("non IT", "other".to_string()),
            ]
        );
    }

    #[test]
    fn test_probes_without_category_go_straight_to_other() {
        let probes = prompt_probes(MasterCategory::It, None);
        assert_eq!(probes, vec![("IT", "other".to_string())]);
    }

    #[test]
    fn test_probes_blank_category_treated_as_null() {
        let probes = prompt_probes(MasterCategory::It, Some("   "));
        assert_eq!(probes, vec![("IT", "other".to_string())]);
    }

    #[test]
    fn test_probes_never_exceed_two() {
        for category in [None, Some("x"), Some("")] {
            assert!(prompt_probes(MasterCategory::NonIt, category).len() <= 2);
        }
    }
}
