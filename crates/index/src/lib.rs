//! In-memory reference indexes for rankfuse
//!
//! Provides a [`DocumentStore`] implementing every collaborator seam the
//! engine reads through: lexical ranking (BM25 with prefix matching), vector
//! ranking (brute-force cosine) and hydration (projection with `<mark>`
//! snippets). Suitable for tests, the CLI and small corpora.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod scorer;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use scorer::{BM25LiteScorer, Scorer, ScorerContext, SearchDoc};
pub use store::DocumentStore;
pub use tokenizer::{tokenize, tokenize_unique};
