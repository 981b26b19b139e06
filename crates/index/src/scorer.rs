//! BM25 text relevance over pre-tokenized documents
//!
//! This module provides:
//! - SearchDoc: tokenized view of one document's lexical fields
//! - ScorerContext: corpus statistics for IDF and length normalization
//! - Scorer trait with the BM25LiteScorer default
//!
//! Query terms match document tokens by prefix. A document matches a query
//! when any term matches (OR semantics); a document with no matching term
//! scores 0 and is not a candidate.

use crate::tokenizer::matches_any;

// ============================================================================
// SearchDoc
// ============================================================================

/// Tokenized document, built once per ranking call
#[derive(Debug, Clone, Default)]
pub struct SearchDoc {
    /// Tokens of the full lexical text
    pub body: Vec<String>,
    /// Tokens of the title, if the class has one
    pub title: Vec<String>,
}

impl SearchDoc {
    /// Create from body tokens
    pub fn new(body: Vec<String>) -> Self {
        SearchDoc {
            body,
            title: Vec::new(),
        }
    }

    /// Builder: set title tokens
    pub fn with_title(mut self, title: Vec<String>) -> Self {
        self.title = title;
        self
    }

    /// Number of body tokens matched by `term` (prefix)
    pub fn term_freq(&self, term: &str) -> usize {
        self.body.iter().filter(|t| t.starts_with(term)).count()
    }

    /// Whether any body token is matched by `term`
    pub fn contains_prefix(&self, term: &str) -> bool {
        self.body.iter().any(|t| t.starts_with(term))
    }
}

// ============================================================================
// ScorerContext
// ============================================================================

/// Corpus-level statistics for one ranking call
#[derive(Debug, Clone, Default)]
pub struct ScorerContext {
    /// Number of documents in the ranked corpus
    pub total_docs: usize,
    /// Document frequency per query term, aligned with the query terms
    pub doc_freqs: Vec<usize>,
    /// Average body length in tokens
    pub avg_doc_len: f32,
}

impl ScorerContext {
    /// Compute statistics for `query_terms` over `docs`
    pub fn build(docs: &[SearchDoc], query_terms: &[String]) -> Self {
        let total_docs = docs.len();
        let total_len: usize = docs.iter().map(|d| d.body.len()).sum();
        let avg_doc_len = if total_docs == 0 {
            0.0
        } else {
            total_len as f32 / total_docs as f32
        };
        let doc_freqs = query_terms
            .iter()
            .map(|term| docs.iter().filter(|d| d.contains_prefix(term)).count())
            .collect();

        ScorerContext {
            total_docs,
            doc_freqs,
            avg_doc_len,
        }
    }

    /// IDF(t) = ln((N - df + 0.5) / (df + 0.5) + 1)
    pub fn idf(&self, term_index: usize) -> f32 {
        let df = self.doc_freqs.get(term_index).copied().unwrap_or(0) as f32;
        let n = self.total_docs as f32;
        ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
    }
}

// ============================================================================
// Scorer Trait
// ============================================================================

/// Pluggable text scoring
///
/// Higher scores are more relevant. Scores are only compared within one
/// ranking call; fusion works on ranks, never on these magnitudes.
pub trait Scorer: Send + Sync {
    /// Score one document against the query terms
    fn score(&self, doc: &SearchDoc, query_terms: &[String], ctx: &ScorerContext) -> f32;

    /// Name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// BM25LiteScorer
// ============================================================================

/// BM25 with a flat title boost
///
/// For each query term t:
/// score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
///
/// The total is multiplied by 1.2 when any query term matches the title.
#[derive(Debug, Clone)]
pub struct BM25LiteScorer {
    k1: f32,
    b: f32,
    title_boost: f32,
}

impl Default for BM25LiteScorer {
    fn default() -> Self {
        BM25LiteScorer {
            k1: 1.2,
            b: 0.75,
            title_boost: 1.2,
        }
    }
}

impl BM25LiteScorer {
    /// Create with custom saturation and length normalization
    pub fn new(k1: f32, b: f32) -> Self {
        BM25LiteScorer {
            k1,
            b,
            ..Default::default()
        }
    }
}

impl Scorer for BM25LiteScorer {
    fn score(&self, doc: &SearchDoc, query_terms: &[String], ctx: &ScorerContext) -> f32 {
        if query_terms.is_empty() || doc.body.is_empty() {
            return 0.0;
        }

        let doc_len = doc.body.len() as f32;
        let avg_len = ctx.avg_doc_len.max(1.0);
        let mut score = 0.0;

        for (i, term) in query_terms.iter().enumerate() {
            let tf = doc.term_freq(term) as f32;
            if tf == 0.0 {
                continue;
            }
            let tf_component =
                (tf * (self.k1 + 1.0)) / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len));
            score += ctx.idf(i) * tf_component;
        }

        if score > 0.0 && doc.title.iter().any(|t| matches_any(t, query_terms)) {
            score *= self.title_boost;
        }

        score
    }

    fn name(&self) -> &str {
        "bm25-lite"
    }
}
