use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z0-9]+\b").expect("word pattern is valid"));

/// Distinct lowercase alphanumeric words longer than two characters.
///
/// Digits are kept so course codes such as `CS101` stay searchable.
pub fn tokenize_text(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|word| word.len() > 2)
        .collect()
}

/// Query words in order, split exactly like indexed text.
///
/// Duplicates are kept; callers that score by distinct tokens dedupe themselves.
pub fn tokenize_query(query: &str) -> Vec<String> {
    WORD.find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|word| word.len() > 2)
        .collect()
}
