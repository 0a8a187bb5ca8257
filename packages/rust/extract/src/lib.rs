//! Education-info extraction from free-text biographies.
//!
//! A best-effort, stateless classifier. Given a fragment such as
//! `"Completed Ph.D. from Delhi University"` it produces an
//! [`EducationInfo`] with a degree level, a university and an education
//! location. Unresolved fields keep their defaults (`Unknown`, `Unknown`,
//! `India`).
//!
//! Pattern priority is fixed and part of the output contract:
//! - degree levels are tried PhD, then Masters, then Bachelors;
//! - countries are tried in [`FOREIGN_COUNTRIES`] order.
//!
//! The first hit wins in both cases.

use std::sync::LazyLock;

use edutrack_shared::EducationInfo;
use regex::Regex;

/// Countries recognised as a foreign education location, in priority order.
pub const FOREIGN_COUNTRIES: [&str; 6] = ["USA", "UK", "Canada", "Australia", "Germany", "France"];

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// `(level, pattern)` pairs, highest degree first.
static DEGREE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("PhD", r"(?i)Ph\.?D\.?|Doctorate"),
        (
            "Masters",
            r"(?i)Master'?s|M\.A\.|M\.Sc\.|M\.Tech\.?|MBA",
        ),
        (
            "Bachelors",
            r"(?i)Bachelor'?s|B\.A\.|B\.Sc\.|B\.Tech\.?|B\.E\.",
        ),
    ]
    .into_iter()
    .map(|(level, pattern)| (level, Regex::new(pattern).expect("degree regex")))
    .collect()
});

/// `from <words> University|Institute|College`, case-sensitive.
static UNIVERSITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"from\s+([\w\s]+(?:University|Institute|College))").expect("university regex")
});

/// Whole-word, case-insensitive matchers in [`FOREIGN_COUNTRIES`] order.
static COUNTRY_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    FOREIGN_COUNTRIES
        .into_iter()
        .map(|country| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(country));
            (country, Regex::new(&pattern).expect("country regex"))
        })
        .collect()
});

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Infer a structured education record from free text.
pub fn parse_education_info(text: &str) -> EducationInfo {
    let text = clean_text(text);
    let mut info = EducationInfo::default();

    if let Some(level) = detect_degree(&text) {
        info.degree_level = level.to_string();
    }
    if let Some(university) = detect_university(&text) {
        info.university = university;
    }
    if let Some(country) = detect_location(&text) {
        info.education_location = country.to_string();
    }

    tracing::trace!(
        degree = %info.degree_level,
        university = %info.university,
        location = %info.education_location,
        "parsed education info"
    );
    info
}

fn detect_degree(text: &str) -> Option<&'static str> {
    DEGREE_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(level, _)| *level)
}

fn detect_university(text: &str) -> Option<String> {
    UNIVERSITY_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|name| !name.is_empty())
}

fn detect_location(text: &str) -> Option<&'static str> {
    COUNTRY_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(country, _)| *country)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phd_from_delhi_university() {
        let info = parse_education_info("Completed Ph.D. from Delhi University");
        assert_eq!(info, EducationInfo::new("PhD", "Delhi University", "India"));
    }

    #[test]
    fn empty_text_yields_defaults() {
        let info = parse_education_info("");
        assert_eq!(info, EducationInfo::new("Unknown", "Unknown", "India"));
    }

    #[test]
    fn first_country_in_list_order_wins() {
        let info = parse_education_info("Studied in USA and later UK");
        assert_eq!(info.education_location, "USA");

        // List order, not position in the text.
        let info = parse_education_info("Worked in France after studying in Canada");
        assert_eq!(info.education_location, "Canada");
    }

    #[test]
    fn degree_priority_is_fixed() {
        let info = parse_education_info("B.A. in 1990, MBA in 1994 and a Doctorate in 2001");
        assert_eq!(info.degree_level, "PhD");

        let info = parse_education_info("Bachelor's and Master's degrees");
        assert_eq!(info.degree_level, "Masters");
    }

    #[test]
    fn masters_without_university() {
        let info = parse_education_info("Masters from IIT Delhi");
        assert_eq!(info, EducationInfo::new("Masters", "Unknown", "India"));
    }

    #[test]
    fn degree_match_is_case_insensitive() {
        assert_eq!(parse_education_info("holds a phd").degree_level, "PhD");
        assert_eq!(parse_education_info("b.sc. graduate").degree_level, "Bachelors");
        assert_eq!(parse_education_info("M.Tech in VLSI").degree_level, "Masters");
        assert_eq!(parse_education_info("B.Tech from NIT").degree_level, "Bachelors");
    }

    #[test]
    fn university_capture_is_normalized() {
        let info = parse_education_info("Graduated   from \n Presidency\tCollege  in Kolkata");
        assert_eq!(info.university, "Presidency College");
    }

    #[test]
    fn university_keyword_is_case_sensitive() {
        let info = parse_education_info("graduated from delhi university");
        assert_eq!(info.university, "Unknown");
    }

    #[test]
    fn country_requires_whole_word() {
        assert_eq!(parse_education_info("Ukraine exchange").education_location, "India");
        assert_eq!(parse_education_info("MSc, uk").education_location, "UK");
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let text = "Bachelor's from Stanford University in the USA";
        let first = parse_education_info(text);
        for _ in 0..10 {
            assert_eq!(parse_education_info(text), first);
        }
        assert_eq!(first, EducationInfo::new("Bachelors", "Stanford University", "USA"));
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a \t b\n\nc  "), "a b c");
        assert_eq!(clean_text(""), "");
    }
}
