//! Search request and response types
//!
//! This module defines the data that crosses the engine boundary:
//! - SearchRequest: what the caller asks for
//! - FusionWeights / FusionParams: resolved ranking parameters
//! - SearchFilters: metadata predicates pushed down into both branches
//! - RankedCandidate: per-document fusion record, internal to a search call
//! - ProjectedResult / SearchResponse: what the caller gets back

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{Author, AuthorType, ContentClass, DocumentId, SearchableDocument};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// FusionWeights / FusionParams
// ============================================================================

/// Relative weights of the lexical and semantic contributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionWeights {
    /// Weight of the lexical term
    pub fts_weight: f64,
    /// Weight of the semantic term
    pub vec_weight: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        FusionWeights {
            fts_weight: 1.0,
            vec_weight: 1.0,
        }
    }
}

impl FusionWeights {
    /// Create weights
    pub fn new(fts_weight: f64, vec_weight: f64) -> Self {
        FusionWeights {
            fts_weight,
            vec_weight,
        }
    }
}

/// Ranking parameters for one search call, after applying per-request overrides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionParams {
    /// Branch weights
    pub weights: FusionWeights,
    /// RRF damping constant, added to every rank
    pub rrf_k: u32,
    /// Per-class output cap
    pub match_count: usize,
}

impl Default for FusionParams {
    fn default() -> Self {
        FusionParams {
            weights: FusionWeights::default(),
            rrf_k: 60,
            match_count: 20,
        }
    }
}

impl FusionParams {
    /// Retrieval depth for each branch: twice the per-class output cap
    pub fn branch_limit(&self) -> usize {
        self.match_count.saturating_mul(2)
    }

    /// Reject parameters that would make the fused score meaningless
    pub fn validate(&self) -> Result<(), SearchError> {
        let w = &self.weights;
        for (name, value) in [("fts_weight", w.fts_weight), ("vec_weight", w.vec_weight)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SearchError::invalid_query(format!(
                    "{} must be a finite positive number, got {}",
                    name, value
                )));
            }
        }
        if self.rrf_k == 0 {
            return Err(SearchError::invalid_query("rrf_k must be positive"));
        }
        if self.match_count == 0 {
            return Err(SearchError::invalid_query("match_count must be positive"));
        }
        Ok(())
    }
}

// ============================================================================
// SearchFilters
// ============================================================================

/// Metadata predicates applied inside both retrieval branches
///
/// Empty filters admit everything. `post_type` only constrains posts;
/// answers and approaches ignore it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Post type (problem, question, idea)
    #[serde(default)]
    pub post_type: Option<String>,
    /// Match documents carrying any of these tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Exact status
    #[serde(default)]
    pub status: Option<String>,
    /// Author id
    #[serde(default)]
    pub author_id: Option<String>,
    /// Author type
    #[serde(default)]
    pub author_type: Option<AuthorType>,
    /// Created at or after (inclusive)
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Created at or before (inclusive)
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl SearchFilters {
    /// True if no predicate is set
    pub fn is_empty(&self) -> bool {
        self == &SearchFilters::default()
    }

    /// Whether a document passes every predicate
    pub fn admits(&self, doc: &SearchableDocument) -> bool {
        let meta = &doc.meta;

        if let Some(wanted) = &self.post_type {
            if let crate::types::ClassFields::Post { post_type, .. } = &doc.fields {
                if !post_type.eq_ignore_ascii_case(wanted) {
                    return false;
                }
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| meta.tags.contains(t)) {
            return false;
        }
        if let Some(status) = &self.status {
            if !meta.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(author_id) = &self.author_id {
            if &meta.author.id != author_id {
                return false;
            }
        }
        if let Some(kind) = self.author_type {
            if meta.author.kind != kind {
                return false;
            }
        }
        if let Some(from) = self.from {
            if meta.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if meta.created_at > to {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// SearchRequest
// ============================================================================

/// A hybrid search request
///
/// Construct with [`SearchRequest::new`] and the `with_*` builders. Any
/// ranking field left `None` falls back to the engine's [`SearchConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Raw query text (may be empty when an embedding is supplied)
    pub text: String,
    /// Caller-supplied query embedding; skips the embedding provider
    pub embedding: Option<Vec<f32>>,
    /// Classes to search; `None` means all three
    pub classes: Option<Vec<ContentClass>>,
    /// Branch weight override
    pub weights: Option<FusionWeights>,
    /// RRF constant override
    pub rrf_k: Option<u32>,
    /// Per-class cap override
    pub match_count: Option<usize>,
    /// 1-based page number
    pub page: u32,
    /// Page size; 0 selects the configured default
    pub per_page: u32,
    /// Metadata filters
    pub filters: SearchFilters,
}

impl SearchRequest {
    /// Create a request for the first page with default settings
    pub fn new(text: impl Into<String>) -> Self {
        SearchRequest {
            text: text.into(),
            embedding: None,
            classes: None,
            weights: None,
            rrf_k: None,
            match_count: None,
            page: 1,
            per_page: 0,
            filters: SearchFilters::default(),
        }
    }

    /// Builder: supply a precomputed query embedding
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Builder: restrict to the given classes
    pub fn with_classes(mut self, classes: Vec<ContentClass>) -> Self {
        self.classes = Some(classes);
        self
    }

    /// Builder: override branch weights
    pub fn with_weights(mut self, fts_weight: f64, vec_weight: f64) -> Self {
        self.weights = Some(FusionWeights::new(fts_weight, vec_weight));
        self
    }

    /// Builder: override the RRF constant
    pub fn with_rrf_k(mut self, rrf_k: u32) -> Self {
        self.rrf_k = Some(rrf_k);
        self
    }

    /// Builder: override the per-class cap
    pub fn with_match_count(mut self, match_count: usize) -> Self {
        self.match_count = Some(match_count);
        self
    }

    /// Builder: select page and page size
    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Builder: set filters
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Classes to search, deduplicated and in enum order
    ///
    /// An explicitly empty list is rejected rather than read as "all".
    pub fn resolve_classes(&self) -> Result<Vec<ContentClass>, SearchError> {
        match &self.classes {
            None => Ok(ContentClass::all().to_vec()),
            Some(list) if list.is_empty() => {
                Err(SearchError::invalid_query("no content classes selected"))
            }
            Some(list) => {
                let mut classes = list.clone();
                classes.sort();
                classes.dedup();
                Ok(classes)
            }
        }
    }

    /// Resolve ranking parameters against the engine configuration
    pub fn fusion_params(&self, config: &SearchConfig) -> Result<FusionParams, SearchError> {
        let params = FusionParams {
            weights: self.weights.unwrap_or(FusionWeights {
                fts_weight: config.fts_weight,
                vec_weight: config.vec_weight,
            }),
            rrf_k: self.rrf_k.unwrap_or(config.rrf_k),
            match_count: self.match_count.unwrap_or(config.match_count),
        };
        params.validate()?;
        Ok(params)
    }

    /// Normalized (page, per_page)
    ///
    /// Page 0 becomes 1; per_page 0 selects the default; oversize pages are
    /// clamped to the configured maximum.
    pub fn pagination(&self, config: &SearchConfig) -> (u32, u32) {
        let page = self.page.max(1);
        let per_page = match self.per_page {
            0 => config.default_per_page,
            n => n.min(config.max_per_page),
        };
        (page, per_page.max(1))
    }
}

// ============================================================================
// RankedCandidate
// ============================================================================

/// A document's standing after fusion
///
/// At least one of `lexical_rank` / `semantic_rank` is always present.
/// Ranks are 1-based positions in the branch output.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// Document identifier
    pub document_id: DocumentId,
    /// Class the document belongs to
    pub class: ContentClass,
    /// Position in the lexical list, if present
    pub lexical_rank: Option<u32>,
    /// Position in the semantic list, if present
    pub semantic_rank: Option<u32>,
    /// Weighted RRF score
    pub fused_score: f64,
}

// ============================================================================
// SearchMethod
// ============================================================================

/// Which retrieval mode actually contributed to the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    /// At least one semantic branch ran and succeeded
    Hybrid,
    /// Only lexical retrieval contributed
    Fulltext,
}

impl SearchMethod {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Hybrid => "hybrid",
            SearchMethod::Fulltext => "fulltext",
        }
    }
}

// ============================================================================
// ProjectedResult / SearchResponse
// ============================================================================

/// A hydrated, display-ready search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedResult {
    /// Document identifier
    pub id: DocumentId,
    /// Class the result came from
    pub source: ContentClass,
    /// Post type for posts, class name otherwise
    #[serde(rename = "type")]
    pub kind: String,
    /// Title (or shortened content for answers)
    pub title: String,
    /// Excerpt with query terms wrapped in `<mark>`
    pub snippet: String,
    /// Tags
    pub tags: Vec<String>,
    /// Status
    pub status: String,
    /// Author
    pub author: Author,
    /// Fused score, filled in by the engine
    pub score: f64,
    /// Upvotes minus downvotes
    pub vote_score: i64,
    /// Number of answers
    pub answers_count: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Resolution time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A page of ranked results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Results in rank order
    pub results: Vec<ProjectedResult>,
    /// Number of candidates across all classes before pagination
    pub total: usize,
    /// Page served (1-based)
    pub page: u32,
    /// Page size used
    pub per_page: u32,
    /// Whether a later page has results
    pub has_more: bool,
    /// Wall-clock time spent in the engine
    pub took_ms: u64,
    /// Retrieval mode that contributed
    pub method: SearchMethod,
}
