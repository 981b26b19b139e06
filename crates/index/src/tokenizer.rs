//! Text tokenization for lexical ranking
//!
//! Indexed text and query text go through the same normalization:
//! - Lowercase
//! - Split on non-alphanumeric characters
//! - Drop tokens shorter than 2 characters
//!
//! Query terms match indexed tokens by prefix, so `"dead"` matches
//! `"deadlock"`.

use std::collections::HashSet;

/// Tokenize text into searchable terms
///
/// # Example
///
/// ```
/// use rankfuse_index::tokenizer::tokenize;
///
/// let tokens = tokenize("Segfault in C++ parser!");
/// assert_eq!(tokens, vec!["segfault", "in", "parser"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() >= 2)
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, keeping first-seen order
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Whether `token` is matched by any of `query_terms` (prefix semantics)
pub fn matches_any(token: &str, query_terms: &[String]) -> bool {
    query_terms.iter().any(|q| token.starts_with(q.as_str()))
}
