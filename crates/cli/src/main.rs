//! rankfuse CLI: run one hybrid query over a JSON corpus.
//!
//! - `rankfuse search <QUERY> --corpus docs.json [flags]`
//! - `rankfuse config` prints the default `rankfuse.toml`
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

mod commands;
mod corpus;
mod format;
mod parse;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use rankfuse_core::{FusionWeights, SearchConfig, SearchRequest};
use rankfuse_embed::HashEmbedder;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_response, OutputMode};
use parse::{matches_to_action, CliAction, SearchArgs};

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let exit_code = match matches_to_action(&matches) {
        Ok(CliAction::PrintConfig) => {
            print!("{}", SearchConfig::default_toml());
            0
        }
        Ok(CliAction::Search(args)) => match run_search(args) {
            Ok(response) => {
                let formatted = format_response(&response, output_mode);
                if !formatted.is_empty() {
                    println!("{}", formatted);
                }
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&format!("{:#}", e), output_mode));
                1
            }
        },
        Err(e) => {
            eprintln!("(error) {}", e);
            2
        }
    };
    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run_search(args: SearchArgs) -> Result<rankfuse_core::SearchResponse> {
    let config = SearchConfig::load(args.config.as_deref(), Path::new("."))
        .context("failed to load configuration")?;
    let request = build_request(&args, &config);

    let hasher = args.hash_embed.map(HashEmbedder::new);
    let docs = corpus::load_corpus(&args.corpus)?;
    let store = corpus::build_store(docs, hasher.as_ref())?;
    let engine = corpus::build_engine(config, store, hasher);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let response = runtime.block_on(engine.search(&request))?;
    Ok(response)
}

/// Translate CLI overrides into a request; a single weight flag keeps the
/// other weight at its configured value.
fn build_request(args: &SearchArgs, config: &SearchConfig) -> SearchRequest {
    let mut request = SearchRequest::new(args.query.clone())
        .with_page(args.page, args.per_page)
        .with_filters(args.filters.clone());
    if let Some(classes) = &args.classes {
        request = request.with_classes(classes.clone());
    }
    if args.fts_weight.is_some() || args.vec_weight.is_some() {
        request.weights = Some(FusionWeights::new(
            args.fts_weight.unwrap_or(config.fts_weight),
            args.vec_weight.unwrap_or(config.vec_weight),
        ));
    }
    request.rrf_k = args.rrf_k;
    request.match_count = args.match_count;
    request
}
