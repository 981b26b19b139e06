//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("rankfuse")
        .about("Hybrid lexical + semantic search over a JSON corpus")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (tab-separated, no decoration)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_search())
        .subcommand(build_config())
}

// =========================================================================
// Search
// =========================================================================

fn build_search() -> Command {
    Command::new("search")
        .about("Run one query and print the ranked page")
        .arg(Arg::new("query").required(true).help("Search query text"))
        .arg(
            Arg::new("corpus")
                .long("corpus")
                .required(true)
                .help("JSON array of documents to search"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to rankfuse.toml (default: ./rankfuse.toml if present)"),
        )
        .arg(
            Arg::new("classes")
                .long("classes")
                .help("Comma-separated classes: post,answer,approach (default: all)"),
        )
        .arg(Arg::new("page").long("page").help("Page number, 1-based (default: 1)"))
        .arg(
            Arg::new("per-page")
                .long("per-page")
                .help("Results per page (default from config)"),
        )
        .arg(Arg::new("fts-weight").long("fts-weight").help("Lexical weight override"))
        .arg(Arg::new("vec-weight").long("vec-weight").help("Semantic weight override"))
        .arg(Arg::new("rrf-k").long("rrf-k").help("RRF constant override"))
        .arg(
            Arg::new("match-count")
                .long("match-count")
                .help("Per-class candidate cap override"),
        )
        .arg(
            Arg::new("hash-embed")
                .long("hash-embed")
                .value_name("DIM")
                .help("Embed corpus and query offline with DIM-wide feature hashing"),
        )
        .arg(
            Arg::new("tag")
                .long("tag")
                .action(ArgAction::Append)
                .help("Only documents carrying this tag (repeatable, any matches)"),
        )
        .arg(Arg::new("status").long("status").help("Only documents with this status"))
        .arg(
            Arg::new("post-type")
                .long("post-type")
                .help("Only posts of this type (other classes unaffected)"),
        )
        .arg(
            Arg::new("author-type")
                .long("author-type")
                .help("Only documents by this author type: human, agent"),
        )
}

// =========================================================================
// Config
// =========================================================================

fn build_config() -> Command {
    Command::new("config").about("Print the default rankfuse.toml")
}
