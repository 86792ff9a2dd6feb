//! Role isolation: reduce a resume to exactly one most-recent dated job span
//! so domain reasoning is not biased by older positions.
//!
//! A resume is line-scanned; every date-bearing line opens a new role and the
//! following lines become its body. Roles are scored by recency and the
//! winner is validated strictly before anything downstream may use it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Character cap applied to the isolated role body before it is sent anywhere.
pub const MAX_ROLE_CHARS: usize = 1800;

/// Recency score assigned to roles explicitly marked as current.
pub const CURRENT_ROLE_SCORE: i64 = i64::MAX;

// ── Date grammar, compiled once ─────────────────────────────────────────────

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|sept|oct|nov|dec";

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({MONTHS})\.?\s+(\d{{4}})\b")).unwrap());

static MONTH_SHORT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({MONTHS})'(\d{{2}})\b")).unwrap());

static MM_YYYY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{4}\b").unwrap());

/// Years constrained to 1950–2039; anything outside is noise, not a date.
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19[5-9]\d|20[0-3]\d)\b").unwrap());

/// "Present"-equivalent vocabulary, covering the spellings that show up in
/// real resumes (till/til/still/to/until/up-to variants, ongoing, currently).
static PRESENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)\b(
            present | current(?:ly)?(?:\s+(?:working|employed|active))? | now | today |
            till?[\s-]*(?:date|now) | still(?:[\s-]*(?:date|now|working|employed|active))? |
            to[\s-]*(?:date|now) | until[\s-]*(?:present|now|date) |
            up[\s-]*to[\s-]*(?:present|now|date) |
            as[\s-]*of[\s-]*(?:now|present|date|today) |
            on[\s-]*going | ongoing | working | continuing | continue | active
        )\b",
    )
    .unwrap()
});

static MONTH_NUMBER: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

// ── Contact / header line filters ───────────────────────────────────────────

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[\w.%+-]+@[\w.-]+\.\w{2,}\b").unwrap());

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\d{3}\)|\d{3}[-.]\d{3}[-.]\d{4}|\+\d{1,3}[\s-]?\d{1,4}[\s-]?\d{1,4}[\s-]?\d{1,9}|\b(phone|tel|mobile|cell)\b").unwrap()
});

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://|www\.|linkedin\.com|github\.com").unwrap());

static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(rd|road|st|street|ave|avenue|blvd|boulevard|dr|drive|ln|lane|ct|court|pl|place|way|cir|circle)\b|\b(apt|apartment|suite|unit)\s*\d+|\bp\.?o\.?\s*box\b|\b(zip|postal\s+code)\b",
    )
    .unwrap()
});

static NUMERIC_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\-()]+$").unwrap());

// ── Role validation vocabularies ────────────────────────────────────────────

static COMPANY_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(company|corporation|corp|inc|ltd|llc|pvt|private|limited|enterprises|solutions|services|systems|technologies|tech|group|holdings)\b|\b(worked\s+(?:at|for)|employed\s+(?:at|by))\b|\b(client|customer|vendor|partner)\b",
    )
    .unwrap()
});

static TITLE_AT_COMPANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(engineer|developer|manager|director|analyst|consultant|specialist|architect|lead|senior|junior)\b.*\b(at|for|with)\b|\b(software|senior|junior|principal|staff)\s+(engineer|developer|manager|analyst)\b",
    )
    .unwrap()
});

static COMPANY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(company|corporation|corp|inc|ltd|llc|pvt|limited|solutions|services|systems|technologies)\b")
        .unwrap()
});

static SEPARATION_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(previous|prior|earlier|before|also\s+worked|also|additionally)\s+(at|for|as|in)\b|\b(prior\s+to|before\s+joining|earlier\s+role|previous\s+position)\b",
    )
    .unwrap()
});

static EDUCATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(education|academic|qualification|degree|university|college|school)\s*:|\b(bachelor|master|phd|doctorate|graduated)\b")
        .unwrap()
});

static WORK_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(worked|employed|role|position|job|experience|sector|industry)\b").unwrap()
});

static EXPERIENCE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#?\s*(work\s+experience|professional\s+experience|employment(\s+history)?|experience|career(\s+history)?|work\s+history)")
        .unwrap()
});

static NEW_SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#?\s*(education|academic|qualification|certification|skill|project)").unwrap()
});

static JOB_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(company|corporation|inc|ltd|worked\s+at|employed\s+at|senior|junior|manager|developer|analyst|engineer)\b")
        .unwrap()
});

/// One dated job span extracted from resume text.
#[derive(Debug, Clone)]
pub struct Role {
    pub date_text: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub is_current: bool,
    pub text: String,
}

impl Role {
    /// Recency score: current roles always win; otherwise end-year×100 with
    /// the month breaking ties when parseable; otherwise start-year×100.
    pub fn recency_score(&self) -> i64 {
        if self.is_current {
            return CURRENT_ROLE_SCORE;
        }
        if let Some(end) = self.end_year {
            let month = month_near_year(&self.date_text, end).unwrap_or(0);
            return end as i64 * 100 + month as i64;
        }
        if let Some(start) = self.start_year {
            return start as i64 * 100;
        }
        0
    }
}

/// True when the line carries anything the date grammar recognizes.
pub fn line_has_date(line: &str) -> bool {
    MONTH_YEAR.is_match(line)
        || MONTH_SHORT_YEAR.is_match(line)
        || MM_YYYY.is_match(line)
        || YEAR.is_match(line)
        || PRESENT.is_match(line)
}

/// True for contact/header lines (email, phone, URL, postal address,
/// numeric-only short lines) that must not open a role.
pub fn is_contact_or_header_line(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 10 {
        return true;
    }
    if EMAIL.is_match(trimmed) || PHONE.is_match(trimmed) || URL.is_match(trimmed) {
        return true;
    }
    if ADDRESS.is_match(trimmed) {
        return true;
    }
    if trimmed.len() < 20 && NUMERIC_ONLY.is_match(trimmed) {
        return true;
    }
    false
}

fn years_in(text: &str) -> Vec<i32> {
    YEAR.find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Month number appearing immediately before `year` in `text`, if any.
fn month_near_year(text: &str, year: i32) -> Option<u32> {
    for captures in MONTH_YEAR.captures_iter(text) {
        let captured_year: i32 = captures.get(2)?.as_str().parse().ok()?;
        if captured_year == year {
            let month_name = captures.get(1)?.as_str().to_lowercase();
            return MONTH_NUMBER
                .iter()
                .find(|(name, _)| *name == month_name)
                .map(|(_, n)| *n);
        }
    }
    None
}

/// (start_year, end_year, is_current) for a date-bearing line.
fn parse_date_line(line: &str) -> (Option<i32>, Option<i32>, bool) {
    let is_current = PRESENT.is_match(line);
    let years = years_in(line);

    match years.len() {
        0 => (None, None, is_current),
        1 => {
            if is_current {
                (Some(years[0]), None, true)
            } else {
                (None, Some(years[0]), false)
            }
        }
        _ => {
            let start = *years.iter().min().unwrap();
            let end = *years.iter().max().unwrap();
            (Some(start), Some(end), is_current)
        }
    }
}

/// Segments resume text into roles. Each date-bearing line opens a role;
/// subsequent non-date lines append to its body until the next date line.
/// Lines before the first date line are skipped.
pub fn extract_roles(resume_text: &str) -> Vec<Role> {
    let mut roles = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut date_text = String::new();
    let mut start_year = None;
    let mut end_year = None;
    let mut is_current = false;

    fn close(
        body: &mut Vec<&str>,
        date_text: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
        is_current: bool,
        roles: &mut Vec<Role>,
    ) {
        let text = body.join("\n").trim().to_string();
        if !text.is_empty() {
            roles.push(Role {
                date_text: date_text.to_string(),
                start_year,
                end_year,
                is_current,
                text,
            });
        }
        body.clear();
    }

    for line in resume_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !body.is_empty() {
                body.push("");
            }
            continue;
        }
        if is_contact_or_header_line(trimmed) {
            continue;
        }

        if line_has_date(trimmed) {
            close(&mut body, &date_text, start_year, end_year, is_current, &mut roles);
            date_text = trimmed.to_string();
            let (start, end, current) = parse_date_line(trimmed);
            start_year = start;
            end_year = end;
            is_current = current;
            body.push(trimmed);
        } else if !body.is_empty() {
            body.push(trimmed);
        }
        // No open role yet: wait for the first date-bearing line.
    }
    close(&mut body, &date_text, start_year, end_year, is_current, &mut roles);

    debug!(role_count = roles.len(), "segmented resume into roles");
    roles
}

/// Picks the most recent role; ties break to first occurrence.
pub fn select_latest_role(roles: &[Role]) -> Option<&Role> {
    let mut best: Option<(&Role, i64)> = None;
    for role in roles {
        let score = role.recency_score();
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((role, score)),
        }
    }
    best.map(|(role, _)| role)
}

/// True when the text shows employer/title patterns, i.e. looks like a job
/// span rather than a skills list or an academic block.
pub fn has_business_context(role_text: &str) -> bool {
    if role_text.trim().len() < 20 {
        return false;
    }
    COMPANY_INDICATOR.is_match(role_text) || TITLE_AT_COMPANY.is_match(role_text)
}

/// Strict isolation validation, applied before the role body may be sent to
/// the LLM. Returns the rejection reason on failure.
pub fn validate_role_isolation(role: &Role, all_roles: &[Role]) -> Result<(), &'static str> {
    let text = role.text.trim();

    if text.len() < 30 {
        return Err("role text too short");
    }
    if text.len() > MAX_ROLE_CHARS * 2 {
        return Err("role text suspiciously long, may contain multiple roles");
    }
    if !has_business_context(text) {
        return Err("role lacks business/company context");
    }

    let distinct_years: HashSet<i32> = years_in(text).into_iter().collect();
    if distinct_years.len() > 4 {
        return Err("too many distinct years, likely multiple roles");
    }

    if COMPANY_TOKEN.find_iter(text).count() > 3 {
        return Err("too many employer tokens, likely multiple roles");
    }

    if SEPARATION_KEYWORD.is_match(text) {
        return Err("contains role-separation keywords");
    }

    if all_roles.len() > 1 {
        let max_score = all_roles
            .iter()
            .map(Role::recency_score)
            .max()
            .unwrap_or(0);
        if role.recency_score() < max_score {
            return Err("selected role is not the most recent");
        }
    }

    if EDUCATION_MARKER.is_match(text) && !WORK_CONTEXT.is_match(text) {
        return Err("education section markers without work context");
    }

    if role.date_text.trim().is_empty() && all_roles.len() > 1 {
        return Err("undated role among multiple roles");
    }

    Ok(())
}

/// Coarser fallback when role isolation fails: the most recent experience
/// block by date score, or the head of the resume when no block is found.
pub fn extract_latest_experience(resume_text: &str) -> String {
    let lines: Vec<&str> = resume_text.lines().collect();
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut in_section = false;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();

        if EXPERIENCE_HEADER.is_match(trimmed) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            in_section = true;
            current.push(line);
            continue;
        }

        if in_section {
            current.push(line);
            let next = lines.get(i + 1).map(|l| l.trim()).unwrap_or("");
            if NEW_SECTION_HEADER.is_match(next) && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
                in_section = false;
            }
        } else if line_has_date(trimmed) && JOB_INDICATOR.is_match(trimmed) {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    let best = blocks
        .into_iter()
        .map(|block| block.join("\n"))
        .max_by_key(|block| block_date_score(block));

    match best {
        Some(block) if !block.trim().is_empty() => block,
        _ => resume_text.chars().take(3000).collect(),
    }
}

/// Date score of a text block: present beats everything, otherwise the
/// highest year with the month as tiebreaker.
fn block_date_score(block: &str) -> i64 {
    if PRESENT.is_match(block) {
        return CURRENT_ROLE_SCORE;
    }
    let max_year = years_in(block).into_iter().max();
    match max_year {
        Some(year) => {
            let month = month_near_year(block, year).unwrap_or(0);
            year as i64 * 100 + month as i64
        }
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROLE_RESUME: &str = "\
John Smith
john.smith@example.com | (555) 123-4567
1509 Cedrus Rd, Springfield

EXPERIENCE

Senior Python Developer at Acme Solutions Inc (Jan 2021 - Present)
Built payment processing services for retail clients.
Led a team of four engineers.

Software Engineer at Initech Ltd (2017 - 2020)
Maintained internal reporting systems.
";

    #[test]
    fn test_line_has_date_variants() {
        assert!(line_has_date("Jan 2021 - Present"));
        assert!(line_has_date("03/2019 to 05/2021"));
        assert!(line_has_date("2017 - 2020"));
        assert!(line_has_date("June 2018 — ongoing"));
        assert!(line_has_date("currently employed"));
        assert!(!line_has_date("Built payment processing services"));
    }

    #[test]
    fn test_year_grammar_bounds() {
        assert!(line_has_date("joined in 1995"));
        assert!(!line_has_date("served 1942 customers"));
        assert!(!line_has_date("room 2047 building"));
    }

    #[test]
    fn test_contact_lines_are_filtered() {
        assert!(is_contact_or_header_line("john.smith@example.com | (555) 123-4567"));
        assert!(is_contact_or_header_line("1509 Cedrus Rd, Springfield"));
        assert!(is_contact_or_header_line("https://linkedin.com/in/jsmith"));
        assert!(is_contact_or_header_line("555-123-4567 ext 22"));
        assert!(!is_contact_or_header_line(
            "Senior Python Developer at Acme Solutions Inc (Jan 2021 - Present)"
        ));
    }

    #[test]
    fn test_address_lines_with_year_like_numbers_do_not_open_roles() {
        // "1509 Cedrus Rd" contains no valid year but "2020 Main St" does;
        // the contact filter must win over the date grammar.
        let resume = "2020 Main Street, Apt 4\n\nDeveloper at Foo Systems Ltd (2019 - 2021)\nDid work.";
        let roles = extract_roles(resume);
        assert_eq!(roles.len(), 1);
        assert!(roles[0].text.contains("Foo Systems"));
    }

    #[test]
    fn test_extract_roles_segments_by_date_lines() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        assert_eq!(roles.len(), 2);
        assert!(roles[0].is_current);
        assert_eq!(roles[0].start_year, Some(2021));
        assert!(roles[0].text.contains("payment processing"));
        assert_eq!(roles[1].start_year, Some(2017));
        assert_eq!(roles[1].end_year, Some(2020));
        assert!(!roles[1].is_current);
    }

    #[test]
    fn test_current_role_score_is_max() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        assert_eq!(roles[0].recency_score(), CURRENT_ROLE_SCORE);
        assert_eq!(roles[1].recency_score(), 2020 * 100);
    }

    #[test]
    fn test_score_is_current_iff_max() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        for role in &roles {
            assert_eq!(role.recency_score() == CURRENT_ROLE_SCORE, role.is_current);
        }
    }

    #[test]
    fn test_month_breaks_year_ties() {
        let early = Role {
            date_text: "Feb 2020 - Mar 2022".into(),
            start_year: Some(2020),
            end_year: Some(2022),
            is_current: false,
            text: String::new(),
        };
        let late = Role {
            date_text: "Apr 2022 - Nov 2022".into(),
            start_year: Some(2022),
            end_year: Some(2022),
            is_current: false,
            text: String::new(),
        };
        assert!(late.recency_score() > early.recency_score());
    }

    #[test]
    fn test_select_latest_prefers_current() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        let latest = select_latest_role(&roles).unwrap();
        assert!(latest.is_current);
        assert!(latest.text.contains("Acme Solutions"));
    }

    #[test]
    fn test_select_latest_tie_breaks_to_first_occurrence() {
        let make = |text: &str| Role {
            date_text: "2018 - 2019".into(),
            start_year: Some(2018),
            end_year: Some(2019),
            is_current: false,
            text: text.into(),
        };
        let roles = vec![make("first"), make("second")];
        assert_eq!(select_latest_role(&roles).unwrap().text, "first");
    }

    #[test]
    fn test_validation_accepts_clean_isolation() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        let latest = select_latest_role(&roles).unwrap();
        assert!(validate_role_isolation(latest, &roles).is_ok());
    }

    #[test]
    fn test_validation_rejects_short_text() {
        let role = Role {
            date_text: "2020".into(),
            start_year: None,
            end_year: Some(2020),
            is_current: false,
            text: "too short".into(),
        };
        assert_eq!(
            validate_role_isolation(&role, std::slice::from_ref(&role)),
            Err("role text too short")
        );
    }

    #[test]
    fn test_validation_rejects_missing_business_context() {
        let role = Role {
            date_text: "2020".into(),
            start_year: None,
            end_year: Some(2020),
            is_current: false,
            text: "Wrote essays about gardening and traveled around the coast.".into(),
        };
        assert!(validate_role_isolation(&role, std::slice::from_ref(&role)).is_err());
    }

    #[test]
    fn test_validation_rejects_too_many_years() {
        let role = Role {
            date_text: "2020".into(),
            start_year: None,
            end_year: Some(2020),
            is_current: false,
            text: "Engineer at Acme Inc, projects in 2015, 2016, 2017, 2018, and 2020.".into(),
        };
        assert_eq!(
            validate_role_isolation(&role, std::slice::from_ref(&role)),
            Err("too many distinct years, likely multiple roles")
        );
    }

    #[test]
    fn test_validation_rejects_separation_keywords() {
        let role = Role {
            date_text: "2021 - Present".into(),
            start_year: Some(2021),
            end_year: None,
            is_current: true,
            text: "Engineer at Acme Inc since 2021. Previous position at Initech doing the same."
                .into(),
        };
        assert!(validate_role_isolation(&role, std::slice::from_ref(&role)).is_err());
    }

    #[test]
    fn test_validation_rejects_academic_block() {
        let role = Role {
            date_text: "2019".into(),
            start_year: None,
            end_year: Some(2019),
            is_current: false,
            text: "Bachelor of Science, Springfield University college program ltd coursework."
                .into(),
        };
        assert_eq!(
            validate_role_isolation(&role, std::slice::from_ref(&role)),
            Err("education section markers without work context")
        );
    }

    #[test]
    fn test_validation_rejects_stale_selection() {
        let roles = extract_roles(TWO_ROLE_RESUME);
        assert_eq!(
            validate_role_isolation(&roles[1], &roles),
            Err("selected role is not the most recent")
        );
    }

    #[test]
    fn test_experience_fallback_finds_section() {
        let text = extract_latest_experience(TWO_ROLE_RESUME);
        assert!(text.contains("EXPERIENCE"));
        assert!(text.contains("Acme Solutions"));
    }

    #[test]
    fn test_experience_fallback_uses_head_when_no_dates() {
        let resume = "A plain document with no employment history whatsoever.";
        assert_eq!(extract_latest_experience(resume), resume);
    }

    #[test]
    fn test_empty_text_yields_no_roles() {
        assert!(extract_roles("").is_empty());
        assert!(select_latest_role(&[]).is_none());
    }
}
