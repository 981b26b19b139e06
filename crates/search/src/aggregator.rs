//! Per-class retrieval and fusion
//!
//! [`ClassAggregator`] runs both branches of one class concurrently, fuses
//! whatever came back, and reports how each branch fared so the engine can
//! tell partial failure from total failure and hybrid from fulltext.

use crate::fuser::{Fuser, RankFuser};
use crate::retriever::{Branch, LexicalRetriever, SemanticRetriever};
use rankfuse_core::{
    ContentClass, DocumentId, FusionParams, IndexError, LexicalIndex, RankedCandidate,
    SearchFilters, VectorIndex,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// How one retrieval branch ended
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome {
    /// Not invoked (empty query text, or no query embedding)
    Skipped,
    /// Completed with this many candidates
    Succeeded(usize),
    /// Errored or timed out; contributed nothing
    Failed(IndexError),
}

impl BranchOutcome {
    /// Whether the branch was invoked at all
    pub fn was_invoked(&self) -> bool {
        !matches!(self, BranchOutcome::Skipped)
    }

    /// Whether the branch was invoked and completed
    pub fn succeeded(&self) -> bool {
        matches!(self, BranchOutcome::Succeeded(_))
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&IndexError> {
        match self {
            BranchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Fused candidates of one class plus branch bookkeeping
#[derive(Debug, Clone)]
pub struct ClassOutcome {
    /// Class searched
    pub class: ContentClass,
    /// Up to `match_count` candidates, sorted
    pub candidates: Vec<RankedCandidate>,
    /// Lexical branch result
    pub lexical: BranchOutcome,
    /// Semantic branch result
    pub semantic: BranchOutcome,
}

impl ClassOutcome {
    /// Branches of this class in (lexical, semantic) order
    pub fn branches(&self) -> [(Branch, &BranchOutcome); 2] {
        [
            (Branch::Lexical, &self.lexical),
            (Branch::Semantic, &self.semantic),
        ]
    }
}

/// Runs lexical + semantic retrieval and fusion for one class
#[derive(Clone)]
pub struct ClassAggregator {
    lexical: LexicalRetriever,
    semantic: SemanticRetriever,
    fuser: Arc<dyn Fuser>,
}

impl ClassAggregator {
    /// Create an aggregator with the default RRF fuser
    pub fn new(
        lexical_index: Arc<dyn LexicalIndex>,
        vector_index: Arc<dyn VectorIndex>,
        branch_timeout: Duration,
    ) -> Self {
        ClassAggregator {
            lexical: LexicalRetriever::new(lexical_index, branch_timeout),
            semantic: SemanticRetriever::new(vector_index, branch_timeout),
            fuser: Arc::new(RankFuser),
        }
    }

    /// Builder: set custom fuser
    pub fn with_fuser(mut self, fuser: Arc<dyn Fuser>) -> Self {
        self.fuser = fuser;
        self
    }

    /// Retrieve and fuse one class
    ///
    /// Never fails: a failing branch contributes an empty list and is
    /// recorded in the outcome. `query` is sanitized text; empty text skips
    /// the lexical branch and a missing embedding skips the semantic one.
    pub async fn aggregate(
        &self,
        class: ContentClass,
        query: &str,
        embedding: Option<&[f32]>,
        params: &FusionParams,
        filters: &SearchFilters,
    ) -> ClassOutcome {
        let lexical = async {
            if query.is_empty() {
                None
            } else {
                Some(self.lexical.retrieve(class, query, params, filters).await)
            }
        };
        let semantic = async {
            match embedding {
                Some(e) => Some(self.semantic.retrieve(class, e, params, filters).await),
                None => None,
            }
        };

        let (lexical, semantic) = tokio::join!(lexical, semantic);
        let (lexical_ids, lexical_outcome) = settle(class, Branch::Lexical, lexical);
        let (semantic_ids, semantic_outcome) = settle(class, Branch::Semantic, semantic);

        let candidates = self
            .fuser
            .fuse(class, &lexical_ids, &semantic_ids, params);

        ClassOutcome {
            class,
            candidates,
            lexical: lexical_outcome,
            semantic: semantic_outcome,
        }
    }
}

/// Turn a branch result into (ids, outcome), logging failures
fn settle(
    class: ContentClass,
    branch: Branch,
    result: Option<Result<Vec<DocumentId>, IndexError>>,
) -> (Vec<DocumentId>, BranchOutcome) {
    match result {
        None => (Vec::new(), BranchOutcome::Skipped),
        Some(Ok(ids)) => {
            let n = ids.len();
            (ids, BranchOutcome::Succeeded(n))
        }
        Some(Err(e)) => {
            warn!(
                target: "rankfuse::search",
                class = %class,
                branch = %branch,
                error = %e,
                "Retrieval branch failed, treating as empty"
            );
            (Vec::new(), BranchOutcome::Failed(e))
        }
    }
}
