//! SearchResponse → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): numbered results with class, score and snippet
//! - **JSON** (`--json`): `serde_json::to_string_pretty` of the full response
//! - **Raw** (`--raw`): one `id<TAB>class<TAB>score` line per result

use rankfuse_core::SearchResponse;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful search.
pub fn format_response(response: &SearchResponse, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(response)
            .unwrap_or_else(|e| format!("{{\"error\": \"failed to encode response: {}\"}}", e)),
        OutputMode::Raw => response
            .results
            .iter()
            .map(|r| format!("{}\t{}\t{}", r.id, r.source, r.score))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => format_human(response),
    }
}

/// Format an error.
pub fn format_error(err: &dyn std::fmt::Display, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string()
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn format_human(response: &SearchResponse) -> String {
    let mut lines: Vec<String> = if response.results.is_empty() {
        vec!["(empty list)".to_string()]
    } else {
        let offset = (response.page.saturating_sub(1) as usize) * response.per_page as usize;
        response
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let snippet = if r.snippet.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", r.snippet)
                };
                format!(
                    "{}) \"{}\" [{}:{}] (score: {:.4}){}",
                    offset + i + 1,
                    r.title,
                    r.source,
                    r.id,
                    r.score,
                    snippet
                )
            })
            .collect()
    };
    lines.push(format!(
        "(page {}, {} of {} results, {}, {} ms{})",
        response.page,
        response.results.len(),
        response.total,
        response.method.as_str(),
        response.took_ms,
        if response.has_more { ", more" } else { "" }
    ));
    lines.join("\n")
}
