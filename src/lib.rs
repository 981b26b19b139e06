//! rankfuse - hybrid search ranking for a technical Q&A corpus
//!
//! Combines a lexical index and a vector index per content class (posts,
//! answers, approaches) with Reciprocal Rank Fusion, merges the classes into
//! one global ranking and hydrates the requested page.
//!
//! # Quick Start
//!
//! ```ignore
//! use rankfuse::{DocumentStore, HybridSearch, SearchConfig, SearchRequest, SearchableDocument};
//! use std::sync::Arc;
//!
//! let store = DocumentStore::from_documents(None, vec![
//!     SearchableDocument::post("p1", "Worker pool deadlock", "threads hang on shutdown"),
//! ])?;
//! let engine = HybridSearch::from_store(SearchConfig::default(), Arc::new(store));
//! let response = engine.search(&SearchRequest::new("pool deadlock")).await?;
//! ```
//!
//! # Architecture
//!
//! - [`rankfuse_core`]: data model, errors, configuration, collaborator traits
//! - [`rankfuse_index`]: in-memory reference store implementing those traits
//! - [`rankfuse_search`]: retrievers, fusion, aggregation, merge, orchestration
//! - [`rankfuse_embed`]: query embedding providers

pub use rankfuse_core::*;
pub use rankfuse_embed::HashEmbedder;
#[cfg(feature = "http")]
pub use rankfuse_embed::HttpEmbedder;
pub use rankfuse_index::DocumentStore;
pub use rankfuse_search::*;
