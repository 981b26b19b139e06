//! Hybrid search ranking for rankfuse
//!
//! This crate provides:
//! - LexicalRetriever / SemanticRetriever: per-class retrieval with deadlines
//! - Fuser trait and RankFuser: weighted Reciprocal Rank Fusion
//! - ClassAggregator: concurrent retrieval + fusion for one class
//! - CrossClassMerger: global ordering, pagination and the method flag
//! - HybridSearch: the request-scoped orchestrator
//!
//! # Usage
//!
//! ```ignore
//! use rankfuse_search::HybridSearch;
//!
//! let engine = HybridSearch::from_store(config, store).with_embedder(embedder);
//! let response = engine.search(&SearchRequest::new("deadlock")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod fuser;
pub mod hybrid;
pub mod merger;
pub mod query;
pub mod retriever;

// Re-export commonly used types
pub use aggregator::{BranchOutcome, ClassAggregator, ClassOutcome};
pub use fuser::{compare_candidates, rrf_term, Fuser, RankFuser};
pub use hybrid::HybridSearch;
pub use merger::{CrossClassMerger, MergedPage};
pub use query::sanitize_query;
pub use retriever::{Branch, LexicalRetriever, SemanticRetriever};
