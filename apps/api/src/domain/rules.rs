//! Deterministic domain rules: the guards that keep the LLM honest.
//!
//! Employer mapping trumps everything, sector keywords trump generic output,
//! and platform domains are only ever accepted when the role body names an
//! explicit platform job title.

use once_cell::sync::Lazy;
use regex::Regex;

/// Hand-maintained employer → domain map. A known employer in the role body
/// decides the domain outright.
pub const EMPLOYER_DOMAIN_MAP: &[(&str, &str)] = &[
    // Healthcare
    ("myeyedr", "Healthcare"),
    ("apollo hospitals", "Healthcare"),
    ("apollo", "Healthcare"),
    ("fortis healthcare", "Healthcare"),
    ("fortis", "Healthcare"),
    ("narayana health", "Healthcare"),
    ("narayana", "Healthcare"),
    ("max healthcare", "Healthcare"),
    ("manipal", "Healthcare"),
    ("mayo clinic", "Healthcare"),
    ("cleveland clinic", "Healthcare"),
    ("kaiser permanente", "Healthcare"),
    ("johns hopkins", "Healthcare"),
    ("mass general", "Healthcare"),
    ("vancouver clinic", "Healthcare"),
    // Banking
    ("bank of america", "Banking"),
    ("hdfc", "Banking"),
    ("icici", "Banking"),
    ("state bank", "Banking"),
    ("sbi", "Banking"),
    ("chase", "Banking"),
    ("wells fargo", "Banking"),
    ("citibank", "Banking"),
    ("jpmorgan", "Banking"),
    ("goldman sachs", "Banking"),
    ("morgan stanley", "Banking"),
    // Retail
    ("walmart", "Retail"),
    ("target", "Retail"),
    ("costco", "Retail"),
    ("home depot", "Retail"),
    // E-Commerce
    ("amazon", "E-Commerce"),
    ("ebay", "E-Commerce"),
    ("etsy", "E-Commerce"),
    // Government / Defense / Aerospace / Energy
    ("drdo", "Defense"),
    ("department of defense", "Defense"),
    ("isro", "Aerospace"),
    ("nasa", "Aerospace"),
    ("barc", "Energy"),
    // Legal
    ("epiq systems", "Legal, Risk & Corporate Governance"),
    // HR
    ("hireright", "Human Resources"),
];

pub const HEALTHCARE_KEYWORDS: &[&str] = &[
    "patient",
    "patients",
    "clinic",
    "clinics",
    "hospital",
    "hospitals",
    "optometry",
    "optometrist",
    "ehr",
    "emr",
    "electronic health record",
    "electronic medical record",
    "medical",
    "healthcare",
    "health care",
    "health system",
    "physician",
    "physicians",
    "nurse",
    "nurses",
    "doctor",
    "doctors",
    "clinical",
    "medicare",
    "medicaid",
    "hipaa",
    "pharmacy",
    "pharmaceutical",
    "diagnosis",
    "treatment",
    "therapy",
];

pub const BANKING_KEYWORDS: &[&str] = &[
    "bank",
    "banking",
    "financial institution",
    "credit union",
    "mortgage",
    "lending",
    "loan",
    "deposit",
    "teller",
    "branch banking",
    "commercial bank",
    "retail banking",
    "investment bank",
    "banking services",
    "banking operations",
];

pub const RETAIL_KEYWORDS: &[&str] = &[
    "retail",
    "retailer",
    "retail store",
    "retail chain",
    "store",
    "stores",
    "merchandising",
    "point of sale",
    "pos",
    "inventory management",
    "retail operations",
    "retail sales",
];

/// Minimum distinct keyword hits before a sector override fires.
const SECTOR_KEYWORD_THRESHOLD: usize = 2;

/// Platform identities that require an explicit platform job title.
pub const PLATFORM_DOMAINS: &[&str] = &[
    "AWS",
    "Salesforce",
    "SAP",
    "Oracle",
    "Microsoft",
    "ServiceNow",
    "Workday",
    "Adobe",
    "Google Cloud",
    "Azure",
];

static PLATFORM_ROLE_GUARDS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "AWS",
            Regex::new(r"(?i)\baws\s+(solutions\s+)?architect|\baws\s+(cloud\s+)?engineer|\baws\s+consultant|\baws\s+developer|\bamazon\s+web\s+services\s+(solutions\s+)?architect").unwrap(),
        ),
        (
            "Salesforce",
            Regex::new(r"(?i)\bsalesforce\s+(admin|administrator|developer|consultant|architect)").unwrap(),
        ),
        (
            "SAP",
            Regex::new(r"(?i)\bsap\s+(consultant|developer|architect|implementation)").unwrap(),
        ),
        (
            "Oracle",
            Regex::new(r"(?i)\boracle\s+(consultant|developer|architect|erp)").unwrap(),
        ),
        (
            "Microsoft",
            Regex::new(r"(?i)\bmicrosoft\s+(consultant|architect|stack|technologies)").unwrap(),
        ),
        (
            "ServiceNow",
            Regex::new(r"(?i)\bservicenow\s+(admin|developer|consultant)").unwrap(),
        ),
        (
            "Workday",
            Regex::new(r"(?i)\bworkday\s+(consultant|developer|admin)").unwrap(),
        ),
        (
            "Adobe",
            Regex::new(r"(?i)\badobe\s+(consultant|developer|architect)").unwrap(),
        ),
        (
            "Azure",
            Regex::new(r"(?i)\bazure\s+(architect|engineer|consultant)|\bmicrosoft\s+azure\s+(architect|engineer)").unwrap(),
        ),
        (
            "Google Cloud",
            Regex::new(r"(?i)\bgoogle\s+cloud\s+(architect|engineer|consultant)|\bgcp\s+(architect|engineer)").unwrap(),
        ),
    ]
});

/// Precedence when multiple domains qualify: business sectors dominate IT;
/// platform domains sit last and only win through the platform-role guard.
pub const DOMAIN_PRIORITY: &[&str] = &[
    "Banking, Financial Services & Insurance (BFSI)",
    "Banking",
    "Insurance",
    "Capital Markets",
    "FinTech",
    "Finance",
    "Finance & Accounting",
    "Healthcare & Life Sciences",
    "Healthcare",
    "Pharmaceuticals & Clinical Research",
    "Retail & E-Commerce",
    "Retail",
    "E-Commerce",
    "Manufacturing & Production",
    "Manufacturing",
    "Supply Chain",
    "Logistics & Transportation",
    "Education, Training & Learning",
    "Education",
    "Government",
    "Public Sector & Government Services",
    "Defense",
    "Energy, Utilities & Sustainability",
    "Energy",
    "Telecommunications",
    "Media, Advertising & Communications",
    "Real Estate & Facilities Management",
    "Construction & Infrastructure",
    "Hospitality",
    "Travel & Tourism",
    "Agriculture",
    "Legal, Risk & Corporate Governance",
    "Human Resources",
    "Sales & Marketing",
    "Customer Service & Customer Experience",
    "Aerospace",
    "Automotive",
    // IT domains below business domains
    "Information Technology",
    "Software & SaaS",
    "Cloud & Infrastructure",
    "Cybersecurity",
    "Data & Analytics",
    "Artificial Intelligence",
    // Platform domains last; they win only via explicit role titles
    "Salesforce",
    "AWS",
    "Microsoft",
    "Oracle",
    "SAP",
    "ServiceNow",
    "Workday",
    "Adobe",
    "Google Cloud",
    "Azure",
];

struct KeywordGroup {
    domain: &'static str,
    high: &'static [&'static str],
    medium: &'static [&'static str],
    low: &'static [&'static str],
}

/// Weighted keyword table for the last-resort scorer. High keywords are
/// specific (company names, regulated terminology); low keywords only ever
/// nudge a score that already has real matches.
static DOMAIN_KEYWORDS: &[KeywordGroup] = &[
    KeywordGroup {
        domain: "Healthcare",
        high: &[
            "healthcare data",
            "healthcare analytics",
            "healthcare it",
            "healthcare consulting",
            "healthcare services",
            "epic",
            "cerner",
            "allscripts",
            "athenahealth",
            "meditech",
            "ehr",
            "emr",
            "population health",
            "value-based care",
            "revenue cycle management",
            "mayo clinic",
            "cleveland clinic",
            "kaiser permanente",
            "johns hopkins",
            "healthcare provider",
            "healthcare payer",
        ],
        medium: &[
            "healthcare",
            "health care",
            "hospital",
            "clinic",
            "medical center",
            "health system",
            "clinical",
            "patient care",
            "patient data",
            "medicare",
            "medicaid",
            "hipaa",
            "hl7",
            "fhir",
            "life sciences",
            "biotech",
            "health insurance",
            "physician",
            "nurse",
        ],
        low: &["medical", "health", "wellness", "treatment", "diagnosis", "therapy"],
    },
    KeywordGroup {
        domain: "Banking",
        high: &[
            "bank of america",
            "chase",
            "wells fargo",
            "citibank",
            "jpmorgan",
            "goldman sachs",
            "morgan stanley",
            "investment bank",
            "commercial bank",
            "retail banking",
            "banking services",
            "banking operations",
        ],
        medium: &[
            "bank",
            "banking",
            "financial institution",
            "credit union",
            "mortgage",
            "lending",
            "loan",
            "deposit",
            "teller",
            "branch banking",
            "corporate banking",
        ],
        low: &[],
    },
    KeywordGroup {
        domain: "Finance",
        high: &[
            "capital markets",
            "investment management",
            "wealth management",
            "asset management",
            "private equity",
            "venture capital",
            "hedge fund",
            "financial planning",
            "financial services",
        ],
        medium: &[
            "finance",
            "financial",
            "accounting",
            "cpa",
            "audit",
            "tax",
            "treasury",
            "financial analyst",
            "financial reporting",
        ],
        low: &[],
    },
    KeywordGroup {
        domain: "FinTech",
        high: &[
            "fintech",
            "digital banking",
            "mobile banking",
            "payment platform",
            "lending platform",
            "cryptocurrency",
            "blockchain",
            "digital wallet",
            "payment gateway",
        ],
        medium: &["financial technology", "payment solutions", "payment processing"],
        low: &[],
    },
    KeywordGroup {
        domain: "Insurance",
        high: &[
            "insurance company",
            "insurance carrier",
            "insurance agency",
            "insurance broker",
            "life insurance",
            "property insurance",
            "casualty insurance",
            "insurance claims",
            "insurance underwriting",
        ],
        medium: &["insurance", "actuary", "underwriting", "claims", "premium", "actuarial"],
        low: &["coverage", "policy"],
    },
    KeywordGroup {
        domain: "E-Commerce",
        high: &[
            "e-commerce",
            "ecommerce",
            "online retail",
            "online marketplace",
            "digital commerce",
            "amazon",
            "ebay",
            "etsy",
            "shopify",
            "magento",
            "woocommerce",
            "online store",
        ],
        medium: &["online shopping", "digital retail", "online sales", "marketplace"],
        low: &[],
    },
    KeywordGroup {
        domain: "Retail",
        high: &[
            "retail chain",
            "retail store",
            "retail operations",
            "retail management",
            "walmart",
            "target",
            "costco",
            "home depot",
            "retailer",
            "merchandising",
        ],
        medium: &[
            "retail",
            "store",
            "point of sale",
            "pos",
            "inventory management",
            "brick and mortar",
            "retail sales",
        ],
        low: &[],
    },
    KeywordGroup {
        domain: "Manufacturing",
        high: &[
            "industrial manufacturing",
            "automotive manufacturing",
            "aerospace manufacturing",
            "industrial automation",
            "lean manufacturing",
            "six sigma",
            "quality control",
            "production management",
        ],
        medium: &[
            "manufacturing",
            "production",
            "factory",
            "assembly",
            "industrial",
            "production planning",
        ],
        low: &["production", "industrial"],
    },
    KeywordGroup {
        domain: "Education",
        high: &[
            "school district",
            "educational institution",
            "edtech company",
            "education consulting",
            "e-learning platform",
            "lms platform",
            "education services",
        ],
        medium: &[
            "educational technology",
            "curriculum development",
            "learning management system",
            "education sector",
            "education industry",
        ],
        low: &[],
    },
    KeywordGroup {
        domain: "Government",
        high: &[
            "federal government",
            "state government",
            "local government",
            "government agency",
            "public sector",
            "government services",
            "public administration",
            "civil service",
            "government contractor",
        ],
        medium: &["government", "federal", "municipal"],
        low: &["public", "administration"],
    },
    KeywordGroup {
        domain: "Information Technology",
        high: &[
            "software company",
            "it company",
            "tech company",
            "saas company",
            "enterprise software",
            "software product",
            "it services company",
            "it consulting firm",
            "cloud services company",
            "cybersecurity company",
            "it infrastructure company",
        ],
        medium: &[
            "information technology company",
            "software development company",
            "technology company",
            "saas",
            "software as a service",
        ],
        low: &[],
    },
    KeywordGroup {
        domain: "Legal, Risk & Corporate Governance",
        high: &[
            "law firm",
            "legal services company",
            "litigation support",
            "ediscovery",
            "class action",
            "legal practice",
            "legal industry",
        ],
        medium: &["legal", "law", "legal services"],
        low: &[],
    },
    KeywordGroup {
        domain: "Human Resources",
        high: &[
            "hr services",
            "hr consulting",
            "background check",
            "talent acquisition",
            "hr platform",
            "hr technology",
            "hr solutions",
        ],
        medium: &["human resources", "hr"],
        low: &[],
    },
];

// ── Rule checks ─────────────────────────────────────────────────────────────

/// Employer map lookup: any known employer token in the role body decides the
/// domain.
pub fn check_employer_domain(role_text: &str) -> Option<&'static str> {
    let text = role_text.to_lowercase();
    EMPLOYER_DOMAIN_MAP
        .iter()
        .find(|(employer, _)| text.contains(employer))
        .map(|(_, domain)| *domain)
}

fn count_keywords(text: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text.contains(*k)).count()
}

pub fn check_healthcare_keywords(role_text: &str) -> Option<&'static str> {
    let text = role_text.to_lowercase();
    (count_keywords(&text, HEALTHCARE_KEYWORDS) >= SECTOR_KEYWORD_THRESHOLD).then_some("Healthcare")
}

pub fn check_banking_keywords(role_text: &str) -> Option<&'static str> {
    let text = role_text.to_lowercase();
    (count_keywords(&text, BANKING_KEYWORDS) >= SECTOR_KEYWORD_THRESHOLD).then_some("Banking")
}

pub fn check_retail_keywords(role_text: &str) -> Option<&'static str> {
    let text = role_text.to_lowercase();
    (count_keywords(&text, RETAIL_KEYWORDS) >= SECTOR_KEYWORD_THRESHOLD).then_some("Retail")
}

/// Platform guard: returns a platform domain only when the role body carries
/// an explicit platform job title ("AWS Solutions Architect", "SAP
/// Consultant"). Skill mentions ("Used AWS S3") never trigger it.
pub fn check_platform_role(role_text: &str) -> Option<&'static str> {
    PLATFORM_ROLE_GUARDS
        .iter()
        .find(|(_, guard)| guard.is_match(role_text))
        .map(|(domain, _)| *domain)
}

/// Picks the highest-priority domain out of several candidates. Unknown
/// domains rank below everything in the priority list.
pub fn resolve_precedence<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }
    candidates
        .iter()
        .min_by_key(|candidate| {
            DOMAIN_PRIORITY
                .iter()
                .position(|d| d == *candidate)
                .unwrap_or(usize::MAX)
        })
        .copied()
}

/// Weighted keyword scorer, the last deterministic fallback. Accepts a domain
/// only with score ≥ 10 and at least one high match or two medium matches.
/// Multiple qualifying domains resolve through the precedence list; platform
/// domains additionally require the platform-role guard.
pub fn score_domain_keywords(role_text: &str) -> Option<&'static str> {
    let text = role_text.to_lowercase();

    let mut qualifying: Vec<&'static str> = Vec::new();
    for group in DOMAIN_KEYWORDS {
        let high = count_keywords(&text, group.high);
        let medium = count_keywords(&text, group.medium);
        let low = count_keywords(&text, group.low);

        if high == 0 && medium == 0 {
            continue;
        }
        let score = high * 10 + medium * 5 + low;
        if score >= 10 && (high >= 1 || medium >= 2) {
            qualifying.push(group.domain);
        }
    }

    // Platform domains dominate when (and only when) the explicit role guard
    // fires; otherwise the business/IT precedence decides.
    if let Some(platform) = check_platform_role(role_text) {
        return Some(platform);
    }
    resolve_precedence(&qualifying)
}

/// Validates an LLM-produced domain against the deterministic rules.
/// Returns Ok(()) to accept or Err(reason) when the rules contradict it.
pub fn validate_llm_domain(llm_domain: &str, role_text: &str) -> Result<(), String> {
    let domain_lower = llm_domain.to_lowercase();

    let employer = check_employer_domain(role_text);
    if let Some(expected) = employer {
        if domain_lower == expected.to_lowercase() {
            return Ok(());
        }
    }
    let healthcare = check_healthcare_keywords(role_text);
    if healthcare.is_some_and(|d| domain_lower == d.to_lowercase()) {
        return Ok(());
    }
    let banking = check_banking_keywords(role_text);
    if banking.is_some_and(|d| domain_lower == d.to_lowercase()) {
        return Ok(());
    }
    let retail = check_retail_keywords(role_text);
    if retail.is_some_and(|d| domain_lower == d.to_lowercase()) {
        return Ok(());
    }

    // Platform claims require the explicit platform-role title.
    if PLATFORM_DOMAINS
        .iter()
        .any(|p| p.to_lowercase() == domain_lower)
    {
        return match check_platform_role(role_text) {
            Some(platform) if platform.to_lowercase() == domain_lower => Ok(()),
            _ => Err(format!(
                "platform domain '{llm_domain}' has no explicit platform role in the text"
            )),
        };
    }

    if let Some(expected) = employer {
        return Err(format!(
            "employer map expects '{expected}', LLM returned '{llm_domain}'"
        ));
    }
    if let Some(expected) = healthcare {
        return Err(format!(
            "healthcare keywords expect '{expected}', LLM returned '{llm_domain}'"
        ));
    }
    if let Some(expected) = banking {
        return Err(format!(
            "banking keywords expect '{expected}', LLM returned '{llm_domain}'"
        ));
    }

    // No rule contradicts the LLM; let it stand.
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANK_PYTHON_ROLE: &str =
        "Senior Python Developer at Bank of America. Used AWS S3 and EC2 for storage.";
    const AWS_ARCHITECT_ROLE: &str = "AWS Solutions Architect at TechCorp (2022–present).";

    #[test]
    fn test_employer_map_hits_known_bank() {
        assert_eq!(check_employer_domain(BANK_PYTHON_ROLE), Some("Banking"));
    }

    #[test]
    fn test_employer_map_misses_unknown_employer() {
        assert_eq!(check_employer_domain("Engineer at Unheard Of Gmbh"), None);
    }

    #[test]
    fn test_healthcare_needs_two_keywords() {
        assert_eq!(check_healthcare_keywords("Worked in a hospital"), None);
        assert_eq!(
            check_healthcare_keywords("Worked in a hospital with patient records"),
            Some("Healthcare")
        );
    }

    #[test]
    fn test_banking_keyword_override() {
        assert_eq!(
            check_banking_keywords("Handled mortgage and loan processing for the branch"),
            Some("Banking")
        );
    }

    #[test]
    fn test_retail_keyword_override() {
        assert_eq!(
            check_retail_keywords("Managed store inventory management and point of sale rollouts"),
            Some("Retail")
        );
    }

    #[test]
    fn test_platform_guard_requires_explicit_title() {
        // Skill mention only: must NOT trigger.
        assert_eq!(check_platform_role(BANK_PYTHON_ROLE), None);
        // Explicit role title: triggers.
        assert_eq!(check_platform_role(AWS_ARCHITECT_ROLE), Some("AWS"));
        assert_eq!(
            check_platform_role("Salesforce Developer at Big Org"),
            Some("Salesforce")
        );
        assert_eq!(check_platform_role("Used Salesforce CRM daily"), None);
    }

    #[test]
    fn test_validate_rejects_platform_hallucination() {
        // AWS appearing only as a skill at a bank must not validate as AWS.
        assert!(validate_llm_domain("AWS", BANK_PYTHON_ROLE).is_err());
        // The employer-backed answer validates.
        assert!(validate_llm_domain("Banking", BANK_PYTHON_ROLE).is_ok());
    }

    #[test]
    fn test_validate_accepts_explicit_platform_role() {
        assert!(validate_llm_domain("AWS", AWS_ARCHITECT_ROLE).is_ok());
    }

    #[test]
    fn test_validate_rejects_employer_contradiction() {
        assert!(validate_llm_domain("Information Technology", BANK_PYTHON_ROLE).is_err());
    }

    #[test]
    fn test_validate_accepts_uncontradicted_domain() {
        assert!(validate_llm_domain("Telecommunications", "Engineer at Unheard Of Gmbh").is_ok());
    }

    #[test]
    fn test_precedence_business_beats_it() {
        assert_eq!(
            resolve_precedence(&["Information Technology", "Banking"]),
            Some("Banking")
        );
    }

    #[test]
    fn test_precedence_unknown_domain_ranks_last() {
        assert_eq!(
            resolve_precedence(&["Totally New Sector", "Healthcare"]),
            Some("Healthcare")
        );
        assert_eq!(
            resolve_precedence(&["Totally New Sector"]),
            Some("Totally New Sector")
        );
    }

    #[test]
    fn test_keyword_scorer_thresholds() {
        // One medium keyword: score 5, rejected.
        assert_eq!(score_domain_keywords("worked on a loan product"), None);
        // Two medium keywords: score 10 with medium >= 2, accepted.
        assert_eq!(
            score_domain_keywords("worked on mortgage and lending systems"),
            Some("Banking")
        );
        // One high keyword: score 10 with high >= 1, accepted.
        assert_eq!(
            score_domain_keywords("consulted for a healthcare provider organization"),
            Some("Healthcare")
        );
    }

    #[test]
    fn test_keyword_scorer_low_keywords_never_qualify_alone() {
        assert_eq!(score_domain_keywords("focused on wellness and treatment"), None);
    }

    #[test]
    fn test_keyword_scorer_platform_needs_guard() {
        // Plenty of IT-company keywords plus an explicit AWS role title:
        // the platform guard wins.
        assert_eq!(
            score_domain_keywords("AWS Solutions Architect at a saas company and tech company"),
            Some("AWS")
        );
    }

    #[test]
    fn test_keyword_scorer_resolves_multi_domain_by_precedence() {
        let text = "software company building mortgage and lending tools for retail banking";
        assert_eq!(score_domain_keywords(text), Some("Banking"));
    }
}
