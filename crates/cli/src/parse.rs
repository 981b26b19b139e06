//! ArgMatches → CliAction conversion.

use std::path::PathBuf;

use clap::ArgMatches;
use rankfuse_core::{AuthorType, ContentClass, SearchFilters};

/// What the invocation asks for.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    Search(SearchArgs),
    PrintConfig,
}

/// Parsed `search` arguments.
#[derive(Debug, Default, PartialEq)]
pub struct SearchArgs {
    pub query: String,
    pub corpus: PathBuf,
    pub config: Option<PathBuf>,
    pub classes: Option<Vec<ContentClass>>,
    pub page: u32,
    pub per_page: u32,
    pub fts_weight: Option<f64>,
    pub vec_weight: Option<f64>,
    pub rrf_k: Option<u32>,
    pub match_count: Option<usize>,
    pub hash_embed: Option<usize>,
    pub filters: SearchFilters,
}

/// Convert top-level matches into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("search", sub)) => parse_search(sub).map(CliAction::Search),
        Some(("config", _)) => Ok(CliAction::PrintConfig),
        Some((other, _)) => Err(format!("Unknown command: {}", other)),
        None => Err("No command given".to_string()),
    }
}

fn parse_search(matches: &ArgMatches) -> Result<SearchArgs, String> {
    let query = matches
        .get_one::<String>("query")
        .cloned()
        .ok_or("Missing query")?;
    let corpus = matches
        .get_one::<String>("corpus")
        .map(PathBuf::from)
        .ok_or("Missing --corpus")?;

    let classes = match matches.get_one::<String>("classes") {
        Some(list) => Some(parse_classes(list)?),
        None => None,
    };

    let author_type = match matches.get_one::<String>("author-type") {
        Some(s) => Some(s.parse::<AuthorType>()?),
        None => None,
    };

    let filters = SearchFilters {
        post_type: matches.get_one::<String>("post-type").cloned(),
        tags: matches
            .get_many::<String>("tag")
            .map(|tags| tags.cloned().collect())
            .unwrap_or_default(),
        status: matches.get_one::<String>("status").cloned(),
        author_type,
        ..SearchFilters::default()
    };

    Ok(SearchArgs {
        query,
        corpus,
        config: matches.get_one::<String>("config").map(PathBuf::from),
        classes,
        page: parse_opt(matches, "page")?.unwrap_or(1),
        per_page: parse_opt(matches, "per-page")?.unwrap_or(0),
        fts_weight: parse_opt(matches, "fts-weight")?,
        vec_weight: parse_opt(matches, "vec-weight")?,
        rrf_k: parse_opt(matches, "rrf-k")?,
        match_count: parse_opt(matches, "match-count")?,
        hash_embed: parse_opt(matches, "hash-embed")?,
        filters,
    })
}

/// Parse a comma-separated class list; an empty list is kept empty so the
/// engine can reject it.
fn parse_classes(list: &str) -> Result<Vec<ContentClass>, String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ContentClass>())
        .collect()
}

fn parse_opt<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, String> {
    match matches.get_one::<String>(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("Invalid value for --{}: {}", name, raw)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        let mut argv = vec!["rankfuse"];
        argv.extend_from_slice(args);
        let matches = build_cli()
            .try_get_matches_from(argv)
            .map_err(|e| e.to_string())?;
        matches_to_action(&matches)
    }

    fn search(args: &[&str]) -> SearchArgs {
        match parse(args).unwrap() {
            CliAction::Search(s) => s,
            other => panic!("expected search, got {:?}", other),
        }
    }

    #[test]
    fn test_search_defaults() {
        let s = search(&["search", "pool deadlock", "--corpus", "docs.json"]);
        assert_eq!(s.query, "pool deadlock");
        assert_eq!(s.corpus, PathBuf::from("docs.json"));
        assert_eq!(s.page, 1);
        assert_eq!(s.per_page, 0);
        assert!(s.classes.is_none());
        assert!(s.hash_embed.is_none());
        assert!(s.filters.is_empty());
    }

    #[test]
    fn test_search_overrides() {
        let s = search(&[
            "search", "q", "--corpus", "c.json", "--page", "2", "--per-page", "5",
            "--fts-weight", "1.5", "--vec-weight", "0.5", "--rrf-k", "30",
            "--match-count", "10", "--hash-embed", "64",
        ]);
        assert_eq!(s.page, 2);
        assert_eq!(s.per_page, 5);
        assert_eq!(s.fts_weight, Some(1.5));
        assert_eq!(s.vec_weight, Some(0.5));
        assert_eq!(s.rrf_k, Some(30));
        assert_eq!(s.match_count, Some(10));
        assert_eq!(s.hash_embed, Some(64));
    }

    #[test]
    fn test_classes_accept_plurals() {
        let s = search(&["search", "q", "--corpus", "c", "--classes", "posts, Answer"]);
        assert_eq!(s.classes, Some(vec![ContentClass::Post, ContentClass::Answer]));
    }

    #[test]
    fn test_unknown_class_rejected() {
        assert!(parse(&["search", "q", "--corpus", "c", "--classes", "comments"]).is_err());
    }

    #[test]
    fn test_filters() {
        let s = search(&[
            "search", "q", "--corpus", "c", "--tag", "rust", "--tag", "tokio",
            "--status", "open", "--post-type", "problem", "--author-type", "agent",
        ]);
        assert_eq!(s.filters.tags, vec!["rust".to_string(), "tokio".to_string()]);
        assert_eq!(s.filters.status.as_deref(), Some("open"));
        assert_eq!(s.filters.post_type.as_deref(), Some("problem"));
        assert_eq!(s.filters.author_type, Some(AuthorType::Agent));
    }

    #[test]
    fn test_bad_number_rejected() {
        let err = parse(&["search", "q", "--corpus", "c", "--rrf-k", "sixty"]).unwrap_err();
        assert!(err.contains("--rrf-k"));
    }

    #[test]
    fn test_corpus_required() {
        assert!(parse(&["search", "q"]).is_err());
    }

    #[test]
    fn test_config_command() {
        assert_eq!(parse(&["config"]).unwrap(), CliAction::PrintConfig);
    }
}
