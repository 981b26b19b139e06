//! Hybrid search orchestrator
//!
//! This module provides:
//! - HybridSearch: the request-scoped pipeline from query to hydrated page
//! - Query embedding lookup with graceful fallback to fulltext
//! - Partial / total failure accounting across branches
//! - Page hydration, one collaborator call per class on the page
//!
//! HybridSearch is STATELESS. It holds only `Arc` references to its
//! collaborators and an immutable configuration; every search call owns its
//! own intermediate state.

use crate::aggregator::{ClassAggregator, ClassOutcome};
use crate::fuser::Fuser;
use crate::merger::CrossClassMerger;
use crate::query::{is_embeddable, sanitize_query};
use crate::retriever::with_deadline;
use futures::future::join_all;
use rankfuse_core::{
    ContentClass, DocumentId, EmbedError, EmbeddingProvider, Hydrator, LexicalIndex,
    ProjectedResult, RankedCandidate, Result, SearchConfig, SearchError, SearchRequest,
    SearchResponse, VectorIndex,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

// ============================================================================
// HybridSearch
// ============================================================================

/// Hybrid lexical + semantic search engine
///
/// # Architecture
///
/// ```text
/// SearchRequest
///      │
///      ▼
/// ┌──────────────────────────────────────────────────┐
/// │                  HybridSearch                     │
/// │   sanitize text ──┐        ┌── embed (optional)   │
/// │                   ▼        ▼                      │
/// │  ┌────────────────────────────────────────────┐  │
/// │  │        ClassAggregator, per class          │  │
/// │  │   ┌─────────┐          ┌──────────┐        │  │
/// │  │   │ lexical │  join!   │ semantic │        │  │
/// │  │   └────┬────┘          └────┬─────┘        │  │
/// │  │        └──── RankFuser ─────┘              │  │
/// │  └──────────────────┬─────────────────────────┘  │
/// │        post │ answer │ approach   (join_all)      │
/// │                     ▼                             │
/// │             CrossClassMerger                      │
/// │                     ▼                             │
/// │          Hydrator (once per class)                │
/// └─────────────────────┼────────────────────────────┘
///                       ▼
///                SearchResponse
/// ```
///
/// # Cancellation
///
/// All retrieval runs inside the future returned by [`HybridSearch::search`];
/// nothing is spawned. Dropping that future abandons every in-flight index
/// call for the query.
#[derive(Clone)]
pub struct HybridSearch {
    config: Arc<SearchConfig>,
    aggregator: ClassAggregator,
    merger: CrossClassMerger,
    hydrator: Arc<dyn Hydrator>,
    vector: Arc<dyn VectorIndex>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl HybridSearch {
    /// Create an engine over separate collaborators
    pub fn new(
        config: SearchConfig,
        lexical: Arc<dyn LexicalIndex>,
        vector: Arc<dyn VectorIndex>,
        hydrator: Arc<dyn Hydrator>,
    ) -> Self {
        let aggregator = ClassAggregator::new(lexical, vector.clone(), config.branch_timeout());
        HybridSearch {
            config: Arc::new(config),
            aggregator,
            merger: CrossClassMerger,
            hydrator,
            vector,
            embedder: None,
        }
    }

    /// Create an engine over one store that serves all three read seams
    pub fn from_store<S>(config: SearchConfig, store: Arc<S>) -> Self
    where
        S: LexicalIndex + VectorIndex + Hydrator + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    /// Builder: attach a query embedding provider
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Builder: set custom per-class fuser
    pub fn with_fuser(mut self, fuser: Arc<dyn Fuser>) -> Self {
        self.aggregator = self.aggregator.with_fuser(fuser);
        self
    }

    /// Engine configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // ========================================================================
    // Search Orchestration
    // ========================================================================

    /// Answer one query
    ///
    /// # Flow
    ///
    /// 1. Resolve classes, ranking parameters and pagination
    /// 2. Sanitize text; obtain a query embedding unless one was supplied
    /// 3. Retrieve and fuse every class concurrently
    /// 4. Fail with [`SearchError::TotalFailure`] if every invoked branch failed
    /// 5. Merge classes and cut the requested page
    /// 6. Hydrate the page and restore rank order
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidQuery`]: empty class list, bad overrides, or
    ///   nothing to search with (no text and no embedding)
    /// - [`SearchError::TotalFailure`]: no branch produced a usable list
    /// - [`SearchError::Hydration`]: the page could not be projected
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();

        // 1. Resolve request
        let classes = req.resolve_classes()?;
        let params = req.fusion_params(&self.config)?;
        let (page, per_page) = req.pagination(&self.config);

        // 2. Query inputs
        let query = sanitize_query(&req.text);
        let embedding = match &req.embedding {
            Some(e) if !e.is_empty() => Some(e.clone()),
            Some(_) => None,
            None => self.query_embedding(&req.text).await,
        };
        let embedding = self.usable_embedding(embedding);

        if query.is_empty() && embedding.is_none() {
            return Err(SearchError::invalid_query(
                "query has no searchable text and no embedding",
            ));
        }

        // 3. Per-class retrieval + fusion
        let outcomes: Vec<ClassOutcome> = join_all(classes.iter().map(|&class| {
            self.aggregator.aggregate(
                class,
                &query,
                embedding.as_deref(),
                &params,
                &req.filters,
            )
        }))
        .await;

        // 4. Total failure check
        check_total_failure(&outcomes)?;

        // 5. Merge + paginate
        let merged = self.merger.merge(outcomes, page, per_page);

        // 6. Hydrate
        let results = self.hydrate(&merged.items, &query).await?;

        let took_ms = start.elapsed().as_millis() as u64;
        info!(
            target: "rankfuse::search",
            query = %req.text,
            took_ms,
            results = results.len(),
            total = merged.total,
            method = merged.method.as_str(),
            "Search completed"
        );

        Ok(SearchResponse {
            results,
            total: merged.total,
            page: merged.page,
            per_page: merged.per_page,
            has_more: merged.has_more,
            took_ms,
            method: merged.method,
        })
    }

    // ========================================================================
    // Query Embedding
    // ========================================================================

    /// Embed the raw query text, or `None` to run fulltext
    ///
    /// Every failure (provider error, timeout, empty vector) degrades to
    /// `None`; none of them fail the search.
    async fn query_embedding(&self, text: &str) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;
        if !is_embeddable(text) {
            return None;
        }

        let start = Instant::now();
        let deadline = self.config.embed_timeout();
        let result = match tokio::time::timeout(deadline, embedder.embed(text)).await {
            Ok(r) => r,
            Err(_) => Err(EmbedError::Timeout),
        };

        match result {
            Ok(v) if !v.is_empty() => {
                debug!(
                    target: "rankfuse::search",
                    provider = embedder.name(),
                    dimensions = v.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Query embedding generated"
                );
                Some(v)
            }
            Ok(_) => {
                warn!(
                    target: "rankfuse::search",
                    provider = embedder.name(),
                    "Embedding provider returned an empty vector, using fulltext"
                );
                None
            }
            Err(e) => {
                warn!(
                    target: "rankfuse::search",
                    provider = embedder.name(),
                    error = %e,
                    "Query embedding failed, using fulltext"
                );
                None
            }
        }
    }

    /// Drop an embedding the vector index cannot compare against
    fn usable_embedding(&self, embedding: Option<Vec<f32>>) -> Option<Vec<f32>> {
        let embedding = embedding?;
        if !embedding.iter().all(|x| x.is_finite()) {
            warn!(
                target: "rankfuse::search",
                "Query embedding has non-finite components, using fulltext"
            );
            return None;
        }
        match self.vector.dimension() {
            Some(expected) if expected != embedding.len() => {
                warn!(
                    target: "rankfuse::search",
                    expected,
                    actual = embedding.len(),
                    "Query embedding dimension mismatch, using fulltext"
                );
                None
            }
            _ => Some(embedding),
        }
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Project the page, one fetch per class present, in rank order
    ///
    /// Candidates the hydrator no longer knows are dropped and logged.
    async fn hydrate(
        &self,
        page: &[RankedCandidate],
        query: &str,
    ) -> Result<Vec<ProjectedResult>> {
        if page.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_class: BTreeMap<ContentClass, Vec<DocumentId>> = BTreeMap::new();
        for c in page {
            by_class.entry(c.class).or_default().push(c.document_id.clone());
        }

        let deadline = self.config.branch_timeout();
        let fetched = join_all(by_class.iter().map(|(&class, ids)| async move {
            let out = with_deadline(deadline, self.hydrator.fetch(class, ids, query)).await;
            (class, out)
        }))
        .await;

        let mut projected: HashMap<(ContentClass, DocumentId), ProjectedResult> =
            HashMap::with_capacity(page.len());
        for (class, out) in fetched {
            let records = out.map_err(|e| SearchError::Hydration {
                reason: format!("{} fetch failed: {}", class, e),
            })?;
            for record in records {
                projected.insert((class, record.id.clone()), record);
            }
        }

        let mut results = Vec::with_capacity(page.len());
        let mut dropped = 0usize;
        for c in page {
            match projected.remove(&(c.class, c.document_id.clone())) {
                Some(mut record) => {
                    record.score = c.fused_score;
                    results.push(record);
                }
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(
                target: "rankfuse::search",
                dropped,
                page_size = page.len(),
                "Hydration dropped candidates that no longer exist"
            );
        }
        Ok(results)
    }
}

/// Fail when branches were invoked and none of them succeeded
///
/// Skipped branches count as neither success nor failure.
fn check_total_failure(outcomes: &[ClassOutcome]) -> Result<()> {
    let mut attempted = 0usize;
    let mut last_error = None;
    for outcome in outcomes {
        for (_, branch) in outcome.branches() {
            if !branch.was_invoked() {
                continue;
            }
            attempted += 1;
            match branch.error() {
                Some(e) => last_error = Some(e),
                None => return Ok(()),
            }
        }
    }

    match last_error {
        Some(e) => Err(SearchError::TotalFailure {
            attempted,
            last_error: e.to_string(),
        }),
        None => Ok(()),
    }
}
