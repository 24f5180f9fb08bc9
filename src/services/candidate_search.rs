// src/services/candidate_search.rs
//! Recruiter query parsing.
//!
//! Turns a free-text query like "CS grads with GPA > 3.5 from Stanford"
//! into a tagged list of independent predicate rules. The rules themselves
//! are applied conjunctively by the registry scan; this module only decides
//! which rules a query implies. Keyword-based on purpose; there is no
//! language model here.

use crate::storage::registry_store::CandidateRule;

/// Keywords that match as whole words of the query. Short tokens would
/// otherwise fire on substrings ("physics" contains "cs").
const WORD_KEYWORDS: [(&str, KeywordKind); 2] = [
    ("cs", KeywordKind::Major("computer")),
    ("mit", KeywordKind::University("mit")),
];

/// Keywords long enough to match as substrings.
const SUBSTRING_KEYWORDS: [(&str, KeywordKind); 5] = [
    ("computer science", KeywordKind::Major("computer")),
    ("stanford", KeywordKind::University("stanford")),
    ("berkeley", KeywordKind::University("berkeley")),
    ("bachelor", KeywordKind::Degree("bachelor")),
    ("master", KeywordKind::Degree("master")),
];

#[derive(Clone, Copy)]
enum KeywordKind {
    University(&'static str),
    Degree(&'static str),
    Major(&'static str),
}

impl KeywordKind {
    fn to_rule(self) -> CandidateRule {
        match self {
            KeywordKind::University(needle) => CandidateRule::UniversityContains(needle.into()),
            KeywordKind::Degree(needle) => CandidateRule::DegreeContains(needle.into()),
            KeywordKind::Major(needle) => CandidateRule::MajorContains(needle.into()),
        }
    }
}

/// Parses a recruiter query into predicate rules.
///
/// An unrecognized query yields an empty rule list, which the scan treats
/// as "all non-revoked candidates".
pub fn parse_query(query: &str) -> Vec<CandidateRule> {
    let query = query.to_lowercase();
    let words: Vec<&str> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let mut rules = Vec::new();

    for (keyword, kind) in WORD_KEYWORDS {
        if words.contains(&keyword) && !rules.contains(&kind.to_rule()) {
            rules.push(kind.to_rule());
        }
    }
    for (keyword, kind) in SUBSTRING_KEYWORDS {
        if query.contains(keyword) && !rules.contains(&kind.to_rule()) {
            rules.push(kind.to_rule());
        }
    }

    if let Some(threshold) = parse_gpa_threshold(&query) {
        rules.push(CandidateRule::GpaAtLeast(threshold));
    }

    rules
}

/// Extracts a GPA threshold of the form `gpa >= 3.5` (any of `>`, `<`, `=`
/// after the keyword counts). The number is always treated as a minimum.
fn parse_gpa_threshold(query: &str) -> Option<f64> {
    let idx = query.find("gpa")?;
    let rest = query[idx + 3..].trim_start();

    let comparator_len = rest
        .bytes()
        .take_while(|b| matches!(b, b'>' | b'<' | b'='))
        .count();
    if comparator_len == 0 {
        return None;
    }

    let number = rest[comparator_len..].trim_start();
    let digits: String = number
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_university_and_major_keywords() {
        let rules = parse_query("Stanford computer science graduates");
        assert!(rules.contains(&CandidateRule::UniversityContains("stanford".into())));
        assert!(rules.contains(&CandidateRule::MajorContains("computer".into())));
    }

    #[test]
    fn test_gpa_threshold_extraction() {
        let rules = parse_query("Find CS grads with GPA > 3.5");
        assert!(rules.contains(&CandidateRule::MajorContains("computer".into())));
        assert!(rules.contains(&CandidateRule::GpaAtLeast(3.5)));
    }

    #[test]
    fn test_gpa_requires_comparator() {
        assert!(parse_gpa_threshold("students with gpa 3.5").is_none());
        assert_eq!(parse_gpa_threshold("gpa >= 3.8"), Some(3.8));
        assert_eq!(parse_gpa_threshold("gpa>3"), Some(3.0));
    }

    #[test]
    fn test_degree_keywords() {
        assert!(parse_query("master graduates")
            .contains(&CandidateRule::DegreeContains("master".into())));
        assert!(parse_query("Bachelor of Science holders")
            .contains(&CandidateRule::DegreeContains("bachelor".into())));
    }

    #[test]
    fn test_short_tokens_match_whole_words_only() {
        assert!(parse_query("physics majors").is_empty());
        assert!(parse_query("summit attendees").is_empty());
        assert!(parse_query("MIT alumni")
            .contains(&CandidateRule::UniversityContains("mit".into())));
        assert!(parse_query("top cs students")
            .contains(&CandidateRule::MajorContains("computer".into())));
    }

    #[test]
    fn test_cs_mentions_do_not_duplicate_rules() {
        let rules = parse_query("cs and computer science");
        let major_rules = rules
            .iter()
            .filter(|r| matches!(r, CandidateRule::MajorContains(_)))
            .count();
        assert_eq!(major_rules, 1);
    }

    #[test]
    fn test_unrecognized_query_yields_no_rules() {
        assert!(parse_query("anyone at all").is_empty());
    }
}
