//! Collaborator traits for the search engine
//!
//! The engine never touches storage directly. It calls four seams:
//!
//! - [`LexicalIndex`]: ranked full-text retrieval per class
//! - [`VectorIndex`]: ranked nearest-neighbour retrieval per class
//! - [`EmbeddingProvider`]: query text to vector
//! - [`Hydrator`]: document ids to display records
//!
//! All are async and object-safe so the engine can hold them as
//! `Arc<dyn Trait>`. Implementations must be `Send + Sync`; one engine
//! serves concurrent searches.
//!
//! # Contract
//!
//! Index implementations return ids in rank order (best first), at most
//! `limit` of them, with no duplicates, and never return soft-deleted
//! documents. The engine assigns 1-based ranks from list position.

use crate::error::{EmbedError, IndexError};
use crate::search_types::{ProjectedResult, SearchFilters};
use crate::types::{ContentClass, DocumentId};
use async_trait::async_trait;

/// Full-text retrieval over one class's lexical field set
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    /// Return up to `limit` ids matching `query`, best first
    ///
    /// `query` is already sanitized and non-empty.
    async fn lexical_search(
        &self,
        class: ContentClass,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError>;
}

/// Nearest-neighbour retrieval over one class's embeddings
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `limit` ids closest to `embedding`, best first
    ///
    /// Documents without an embedding are never returned.
    async fn semantic_search(
        &self,
        class: ContentClass,
        embedding: &[f32],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError>;

    /// Embedding width the index compares against, if fixed
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Turns query text into a vector comparable with indexed embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one query string
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Projects ranked ids into display records
#[async_trait]
pub trait Hydrator: Send + Sync {
    /// Fetch display records for `ids` of one class
    ///
    /// Output order is unspecified; the engine restores rank order. Ids that
    /// no longer exist are simply absent from the output. `query` is the
    /// sanitized query text, used for snippet highlighting.
    async fn fetch(
        &self,
        class: ContentClass,
        ids: &[DocumentId],
        query: &str,
    ) -> Result<Vec<ProjectedResult>, IndexError>;
}
