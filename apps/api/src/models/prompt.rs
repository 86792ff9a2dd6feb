use serde::Serialize;

/// A row of the read-only `prompts` table.
///
/// Keyed by (mastercategory, category) where mastercategory uses the prompt
/// table's spelling ("IT" / "non IT") and category = "other" is the fallback
/// sentinel that must exist for each mastercategory.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PromptRow {
    pub id: i64,
    pub mastercategory: String,
    pub category: Option<String>,
    pub prompt: String,
}
