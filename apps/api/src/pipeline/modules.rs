//! `extract_modules` selector parsing.
//!
//! The upload endpoint accepts "all" or a comma-separated mix of numbers
//! (1..8) and names. Unknown tokens are ignored; an empty selection means
//! "all". Master-category and category are not selectable — they are routing
//! prerequisites and always run.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractModule {
    Designation,
    Name,
    Email,
    Mobile,
    Experience,
    Domain,
    Education,
    Skills,
}

impl ExtractModule {
    pub const ALL: [ExtractModule; 8] = [
        ExtractModule::Designation,
        ExtractModule::Name,
        ExtractModule::Email,
        ExtractModule::Mobile,
        ExtractModule::Experience,
        ExtractModule::Domain,
        ExtractModule::Education,
        ExtractModule::Skills,
    ];

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" | "designation" => Some(ExtractModule::Designation),
            "2" | "name" => Some(ExtractModule::Name),
            "3" | "email" => Some(ExtractModule::Email),
            "4" | "mobile" => Some(ExtractModule::Mobile),
            "5" | "experience" => Some(ExtractModule::Experience),
            "6" | "domain" => Some(ExtractModule::Domain),
            "7" | "education" => Some(ExtractModule::Education),
            "8" | "skills" => Some(ExtractModule::Skills),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSelection(HashSet<ExtractModule>);

impl ModuleSelection {
    pub fn all() -> Self {
        Self(ExtractModule::ALL.into_iter().collect())
    }

    /// Parses the `extract_modules` form value.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim().to_lowercase();
        if trimmed.is_empty() || trimmed == "all" {
            return Self::all();
        }
        let selected: HashSet<ExtractModule> = trimmed
            .split(',')
            .map(str::trim)
            .filter_map(ExtractModule::from_token)
            .collect();
        if selected.is_empty() {
            Self::all()
        } else {
            Self(selected)
        }
    }

    pub fn contains(&self, module: ExtractModule) -> bool {
        self.0.contains(&module)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_keyword() {
        let selection = ModuleSelection::parse("all");
        assert_eq!(selection.len(), 8);
    }

    #[test]
    fn test_empty_means_all() {
        assert_eq!(ModuleSelection::parse(""), ModuleSelection::all());
        assert_eq!(ModuleSelection::parse("  "), ModuleSelection::all());
    }

    #[test]
    fn test_numeric_selection() {
        let selection = ModuleSelection::parse("1,2,3");
        assert_eq!(selection.len(), 3);
        assert!(selection.contains(ExtractModule::Designation));
        assert!(selection.contains(ExtractModule::Name));
        assert!(selection.contains(ExtractModule::Email));
        assert!(!selection.contains(ExtractModule::Skills));
    }

    #[test]
    fn test_name_selection() {
        let selection = ModuleSelection::parse("designation,skills");
        assert_eq!(selection.len(), 2);
        assert!(selection.contains(ExtractModule::Designation));
        assert!(selection.contains(ExtractModule::Skills));
    }

    #[test]
    fn test_mixed_numbers_and_names() {
        let selection = ModuleSelection::parse("1, name, 8");
        assert_eq!(selection.len(), 3);
        assert!(selection.contains(ExtractModule::Skills));
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        let selection = ModuleSelection::parse("designation,bogus,99");
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_only_unknown_tokens_fall_back_to_all() {
        assert_eq!(ModuleSelection::parse("bogus,99"), ModuleSelection::all());
    }

    #[test]
    fn test_case_insensitive() {
        let selection = ModuleSelection::parse("Designation,SKILLS");
        assert_eq!(selection.len(), 2);
    }
}
