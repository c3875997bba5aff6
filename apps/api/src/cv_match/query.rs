//! Stage-1 query building: turns raw CV text into an OR-joined keyword query
//! for the Postgres full-text job index.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens at or below this length are discarded.
const MIN_KEYWORD_LEN: usize = 3;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

/// Stopword list for CV keyword extraction. Broader than the profile
/// tokenizer's: CVs are full of organizational and regional boilerplate
/// ("Ltd", "Plc", section headings) that would otherwise dominate recall.
const CV_STOPWORDS: &[&str] = &[
    // common English
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "been", "have",
    "has", "had", "will", "would", "can", "could", "should", "may", "might", "must", "about",
    "into", "over", "under", "between", "during", "before", "after", "each", "other", "some",
    "such", "than", "then", "they", "them", "their", "there", "these", "those", "when", "where",
    "which", "while", "who", "why", "how", "all", "any", "both", "more", "most", "own", "same",
    "you", "your", "our", "his", "her", "she", "him", "its", "not", "but", "also", "per", "via",
    // organizational / regional boilerplate
    "ltd", "plc", "inc", "llc", "gmbh", "limited", "company", "group",
    // CV section boilerplate
    "curriculum", "vitae", "resume", "references", "available", "request", "email", "phone",
    "address", "profile", "summary", "objective", "present", "current", "date", "page",
];

/// Extracts unique searchable keywords from CV text, preserving first-seen
/// order: word-boundary tokens, lowercased, stopwords and short tokens
/// dropped, duplicates removed.
pub fn extract_keywords(cv_text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keywords = Vec::new();

    for token in WORD_RE.find_iter(cv_text) {
        let word = token.as_str().to_lowercase();
        if word.len() < MIN_KEYWORD_LEN || CV_STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }

    keywords
}

/// Builds the `to_tsquery` input: keywords OR-joined with `|`.
///
/// OR rather than AND is deliberate: stage 1 optimizes recall, and precision
/// comes from the AI re-rank in stage 2. Returns `None` when the CV yields
/// no keywords at all, so callers can short-circuit before any search.
pub fn build_search_query(cv_text: &str) -> Option<String> {
    let keywords = extract_keywords(cv_text);
    if keywords.is_empty() {
        return None;
    }
    Some(keywords.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords_filters_and_lowercases() {
        let keywords = extract_keywords("Senior Rust Engineer at Acme Ltd, building gRPC APIs");
        assert_eq!(
            keywords,
            vec!["senior", "rust", "engineer", "acme", "building", "grpc", "apis"]
        );
    }

    #[test]
    fn test_extract_keywords_deduplicates_preserving_order() {
        let keywords = extract_keywords("Rust rust RUST kubernetes Rust");
        assert_eq!(keywords, vec!["rust", "kubernetes"]);
    }

    #[test]
    fn test_extract_keywords_drops_short_tokens() {
        let keywords = extract_keywords("Go C++ at R2 sql");
        // "go", "c", "at", "r2" all fall below the length floor
        assert_eq!(keywords, vec!["sql"]);
    }

    #[test]
    fn test_build_search_query_joins_with_or() {
        let query = build_search_query("Rust engineer, distributed systems").unwrap();
        assert_eq!(query, "rust | engineer | distributed | systems");
    }

    #[test]
    fn test_build_search_query_empty_cv_is_none() {
        assert_eq!(build_search_query(""), None);
        assert_eq!(build_search_query("   \n\t  "), None);
    }

    #[test]
    fn test_build_search_query_stopword_only_cv_is_none() {
        assert_eq!(build_search_query("the and with ltd plc"), None);
    }
}
