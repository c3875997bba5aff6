//! Set and statistical similarity primitives shared by the matching factors.
//!
//! Pure functions, no side effects. Every function returns a value in [0, 1].

use std::collections::HashSet;

/// Tokens at or below this length carry no signal and are dropped.
const MIN_TOKEN_LEN: usize = 3;
/// Upper bound on tokens per side for free-text comparison. A performance
/// guard for pathological inputs, not a correctness constraint.
const MAX_TOKENS: usize = 50;

/// Stopwords discarded during free-text tokenization.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "been", "have",
    "has", "had", "will", "would", "can", "could", "should", "into", "using", "used", "also",
    "about", "which", "their", "they", "them", "when", "where", "while", "other", "more", "most",
    "some", "such", "than", "then", "these", "those", "its", "his", "her", "our", "your", "not",
    "but", "all", "any", "each", "per", "via",
];

/// Normalizes a list of labels into a set: lowercase, trimmed, empties dropped.
fn normalize_labels(labels: &[String]) -> HashSet<String> {
    labels
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Jaccard index over two label lists: |intersection| / |union|.
///
/// Labels are lowercased and trimmed before set construction, so "Go" and
/// "go " compare equal. Returns 0.0 when either side is empty: an empty
/// union must never read as a perfect match.
pub fn jaccard_similarity(a: &[String], b: &[String]) -> f64 {
    let set_a = normalize_labels(a);
    let set_b = normalize_labels(b);

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();

    intersection as f64 / union as f64
}

/// Similarity between two language-percentage distributions.
///
/// Over the union of language keys: `1 − Σ|pa − pb| / Σ(pa + pb)`.
/// Symmetric and bounded to [0, 1]; penalizes both a missing language and
/// a differing emphasis on a shared one. Identical distributions score 1.0,
/// fully disjoint ones 0.0. Two empty distributions score 0.0; no shared
/// evidence is not a match.
pub fn language_distribution_similarity(
    a: &std::collections::HashMap<String, f64>,
    b: &std::collections::HashMap<String, f64>,
) -> f64 {
    let keys: HashSet<&String> = a.keys().chain(b.keys()).collect();

    let mut total_diff = 0.0;
    let mut total_mass = 0.0;
    for key in keys {
        let pa = a.get(key).copied().unwrap_or(0.0);
        let pb = b.get(key).copied().unwrap_or(0.0);
        total_diff += (pa - pb).abs();
        total_mass += pa + pb;
    }

    if total_mass == 0.0 {
        return 0.0;
    }

    (1.0 - total_diff / total_mass).clamp(0.0, 1.0)
}

/// Maps a free-text experience descriptor onto an ordinal level.
/// Substring match against a fixed vocabulary; unrecognized text is `None`.
fn experience_level(text: &str) -> Option<u8> {
    const VOCABULARY: &[(&[&str], u8)] = &[
        (&["entry", "junior"], 1),
        (&["mid", "intermediate"], 2),
        (&["senior"], 3),
        (&["lead", "principal", "staff"], 4),
        (&["expert"], 5),
    ];

    let text = text.to_lowercase();
    VOCABULARY
        .iter()
        .find(|(terms, _)| terms.iter().any(|t| text.contains(t)))
        .map(|(_, level)| *level)
}

/// Similarity between two experience descriptors.
///
/// Levels span 1–5, so the maximum distance is 4. If either side does not
/// map onto the vocabulary the result is a neutral 0.5, so ambiguous text
/// does not penalize a candidate.
pub fn experience_level_similarity(a: &str, b: &str) -> f64 {
    match (experience_level(a), experience_level(b)) {
        (Some(la), Some(lb)) => 1.0 - (la as f64 - lb as f64).abs() / 4.0,
        _ => 0.5,
    }
}

/// Repository-activity similarity: `min / max` of the two counts.
/// Two idle accounts are alike (1.0); one idle against one active is not (0.0).
pub fn repo_activity_similarity(a: u32, b: u32) -> f64 {
    if a == 0 && b == 0 {
        return 1.0;
    }
    if a == 0 || b == 0 {
        return 0.0;
    }
    a.min(b) as f64 / a.max(b) as f64
}

/// Tokenizes free text: punctuation stripped, lowercased, split on
/// whitespace, stopwords and short tokens dropped, capped at `MAX_TOKENS`.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(t))
        .take(MAX_TOKENS)
        .map(str::to_string)
        .collect()
}

/// Free-text keyword similarity: Jaccard index over the filtered token sets.
pub fn keyword_similarity(a: &str, b: &str) -> f64 {
    jaccard_similarity(&tokenize(a), &tokenize(b))
}
