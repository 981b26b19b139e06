//! Query text sanitization
//!
//! Characters with meaning to full-text query syntaxes are stripped from
//! every word before the text reaches a lexical index. Apostrophes split
//! words, matching how documents are tokenized.

/// Characters removed from each query word
const STRIPPED: &[char] = &['\\', ':', '(', ')', '&', '|', '!'];

/// Strip operator characters and collapse whitespace
///
/// `'` separates words like whitespace does, so "it's" searches "it" and
/// "s". Words left empty are dropped. The result is empty when nothing
/// searchable remains, in which case the lexical branch is skipped.
///
/// # Example
///
/// ```
/// use rankfuse_search::query::sanitize_query;
///
/// assert_eq!(sanitize_query("  foo:bar (baz) | !"), "foobar baz");
/// ```
pub fn sanitize_query(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\'')
        .map(|word| word.replace(STRIPPED, ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether `text` has anything worth sending to an embedding provider
pub fn is_embeddable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}
