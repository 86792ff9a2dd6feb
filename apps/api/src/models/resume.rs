use serde::{Deserialize, Serialize};

/// Top-level routing label. Selects the vector index and the skills prompt
/// family; distinct from the more granular free-form `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MasterCategory {
    It,
    NonIt,
}

impl MasterCategory {
    /// Form stored on the resume row ("IT" / "NON_IT").
    pub fn as_db_str(&self) -> &'static str {
        match self {
            MasterCategory::It => "IT",
            MasterCategory::NonIt => "NON_IT",
        }
    }

    /// Form used by the prompts table ("IT" / "non IT").
    pub fn as_prompt_key(&self) -> &'static str {
        match self {
            MasterCategory::It => "IT",
            MasterCategory::NonIt => "non IT",
        }
    }

    /// Parses the resume-row form. Anything other than IT/NON_IT is None.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IT" => Some(MasterCategory::It),
            "NON_IT" => Some(MasterCategory::NonIt),
            _ => None,
        }
    }
}

/// A row of `resume_metadata` — the source of truth for one uploaded resume.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub filename: String,
    pub resume_text: Option<String>,
    pub mastercategory: Option<String>,
    pub category: Option<String>,
    pub candidatename: Option<String>,
    pub designation: Option<String>,
    pub jobrole: Option<String>,
    pub experience: Option<String>,
    pub domain: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub education: Option<String>,
    pub location: Option<String>,
    pub skillset: Option<String>,
    pub status: Option<String>,
    pub indexed_flag: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl ResumeRow {
    pub fn master_category(&self) -> Option<MasterCategory> {
        self.mastercategory
            .as_deref()
            .and_then(MasterCategory::from_db_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_category_db_roundtrip() {
        assert_eq!(MasterCategory::from_db_str("IT"), Some(MasterCategory::It));
        assert_eq!(
            MasterCategory::from_db_str("NON_IT"),
            Some(MasterCategory::NonIt)
        );
        assert_eq!(
            MasterCategory::from_db_str(" non_it "),
            Some(MasterCategory::NonIt)
        );
        assert_eq!(MasterCategory::from_db_str("other"), None);
        assert_eq!(MasterCategory::from_db_str(""), None);
    }

    #[test]
    fn test_prompt_key_maps_non_it_to_spaced_form() {
        assert_eq!(MasterCategory::It.as_prompt_key(), "IT");
        assert_eq!(MasterCategory::NonIt.as_prompt_key(), "non IT");
    }
}
