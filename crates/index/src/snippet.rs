//! Snippet extraction with `<mark>` highlighting

use crate::tokenizer::{matches_any, tokenize};

/// Words of context kept in a snippet
pub const SNIPPET_WORDS: usize = 50;

/// Words shown before the first match
const LEAD_WORDS: usize = 10;

/// Characters kept when content stands in for a missing title
pub const TITLE_CHARS: usize = 100;

/// Build a snippet of `text` centred on the first query match
///
/// Words containing a token matched by any query term are wrapped in
/// `<mark>…</mark>`. With no match the snippet is the leading window.
/// Elided text on either side is marked with `...`.
pub fn highlight(text: &str, query_terms: &[String]) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }

    let is_hit = |word: &str| {
        !query_terms.is_empty() && tokenize(word).iter().any(|t| matches_any(t, query_terms))
    };

    let first_hit = words.iter().position(|w| is_hit(w)).unwrap_or(0);
    let start = first_hit.saturating_sub(LEAD_WORDS);
    let end = (start + SNIPPET_WORDS).min(words.len());

    let mut out = String::new();
    if start > 0 {
        out.push_str("...");
    }
    for (i, word) in words[start..end].iter().enumerate() {
        if i > 0 || start > 0 {
            out.push(' ');
        }
        if is_hit(word) {
            out.push_str("<mark>");
            out.push_str(word);
            out.push_str("</mark>");
        } else {
            out.push_str(word);
        }
    }
    if end < words.len() {
        out.push_str(" ...");
    }
    out
}

/// Shorten `text` to at most `max_chars` characters, appending `...` when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
