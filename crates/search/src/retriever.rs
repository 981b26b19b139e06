//! Per-class retrieval adapters
//!
//! [`LexicalRetriever`] and [`SemanticRetriever`] wrap the index seams with
//! the engine's contract: a per-call deadline, a `2 × match_count` depth,
//! and output that is truncated and free of duplicates even if the index
//! misbehaves.

use rankfuse_core::{
    ContentClass, DocumentId, FusionParams, IndexError, LexicalIndex, SearchFilters, VectorIndex,
};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Retrieval branch, for logs and failure accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    /// Full-text retrieval
    Lexical,
    /// Embedding retrieval
    Semantic,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Branch::Lexical => "lexical",
            Branch::Semantic => "semantic",
        })
    }
}

/// Run `call` under `deadline`, mapping expiry to [`IndexError::Timeout`]
pub(crate) async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, IndexError>
where
    F: Future<Output = Result<T, IndexError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| IndexError::Timeout { after: deadline })?
}

/// Keep the first occurrence of each id and at most `limit` ids
fn normalize_ranked(ids: Vec<DocumentId>, limit: usize) -> Vec<DocumentId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .take(limit)
        .collect()
}

// ============================================================================
// LexicalRetriever
// ============================================================================

/// Ranked full-text candidates for one class
#[derive(Clone)]
pub struct LexicalRetriever {
    index: Arc<dyn LexicalIndex>,
    timeout: Duration,
}

impl LexicalRetriever {
    /// Create a retriever over `index` with a per-call deadline
    pub fn new(index: Arc<dyn LexicalIndex>, timeout: Duration) -> Self {
        LexicalRetriever { index, timeout }
    }

    /// Retrieve up to `2 × match_count` ids, best first
    ///
    /// `query` must already be sanitized. Empty text yields an empty list
    /// without calling the index.
    pub async fn retrieve(
        &self,
        class: ContentClass,
        query: &str,
        params: &FusionParams,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let limit = params.branch_limit();
        let ids = with_deadline(
            self.timeout,
            self.index.lexical_search(class, query, limit, filters),
        )
        .await?;
        Ok(normalize_ranked(ids, limit))
    }
}

// ============================================================================
// SemanticRetriever
// ============================================================================

/// Ranked nearest-neighbour candidates for one class
#[derive(Clone)]
pub struct SemanticRetriever {
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl SemanticRetriever {
    /// Create a retriever over `index` with a per-call deadline
    pub fn new(index: Arc<dyn VectorIndex>, timeout: Duration) -> Self {
        SemanticRetriever { index, timeout }
    }

    /// Retrieve up to `2 × match_count` ids, nearest first
    ///
    /// Callers must not invoke this without a query embedding; there is no
    /// fallback vector.
    pub async fn retrieve(
        &self,
        class: ContentClass,
        embedding: &[f32],
        params: &FusionParams,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        let limit = params.branch_limit();
        let ids = with_deadline(
            self.timeout,
            self.index.semantic_search(class, embedding, limit, filters),
        )
        .await?;
        Ok(normalize_ranked(ids, limit))
    }
}
