//! Shared collaborators for engine integration tests
//!
//! `Scripted` plays all three read seams with canned per-class answers so
//! tests can pin exact ranks. Embedders cover the provider outcomes.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rankfuse_core::{
    Author, ContentClass, DocumentId, EmbedError, EmbeddingProvider, Hydrator, IndexError,
    LexicalIndex, ProjectedResult, SearchConfig, SearchFilters, VectorIndex,
};
use rankfuse_search::HybridSearch;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Scripted index
// ============================================================================

type Answer = Result<Vec<DocumentId>, IndexError>;

/// Canned lexical / semantic / hydration answers
#[derive(Default)]
pub struct Scripted {
    lexical: HashMap<ContentClass, Answer>,
    semantic: HashMap<ContentClass, Answer>,
    vanished: HashSet<DocumentId>,
    hydration_error: Option<IndexError>,
    delay: Option<Duration>,
    pub lexical_calls: AtomicUsize,
    pub semantic_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

pub fn ids(v: &[&str]) -> Vec<DocumentId> {
    v.iter().map(|s| DocumentId::from(*s)).collect()
}

impl Scripted {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lexical(mut self, class: ContentClass, list: &[&str]) -> Self {
        self.lexical.insert(class, Ok(ids(list)));
        self
    }

    pub fn semantic(mut self, class: ContentClass, list: &[&str]) -> Self {
        self.semantic.insert(class, Ok(ids(list)));
        self
    }

    pub fn lexical_ids(mut self, class: ContentClass, list: Vec<DocumentId>) -> Self {
        self.lexical.insert(class, Ok(list));
        self
    }

    pub fn lexical_err(mut self, class: ContentClass, err: IndexError) -> Self {
        self.lexical.insert(class, Err(err));
        self
    }

    pub fn semantic_err(mut self, class: ContentClass, err: IndexError) -> Self {
        self.semantic.insert(class, Err(err));
        self
    }

    /// Fail every branch of every class
    pub fn all_failing(mut self) -> Self {
        for class in ContentClass::all() {
            self.lexical
                .insert(class, Err(IndexError::Unavailable(format!("{} text index down", class))));
            self.semantic
                .insert(class, Err(IndexError::Unavailable(format!("{} vector index down", class))));
        }
        self
    }

    pub fn vanish(mut self, id: &str) -> Self {
        self.vanished.insert(DocumentId::from(id));
        self
    }

    pub fn hydration_fails(mut self, err: IndexError) -> Self {
        self.hydration_error = Some(err);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn answer(&self, map: &HashMap<ContentClass, Answer>, class: ContentClass, limit: usize) -> Answer {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match map.get(&class) {
            Some(Ok(list)) => Ok(list.iter().take(limit).cloned().collect()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl LexicalIndex for Scripted {
    async fn lexical_search(
        &self,
        class: ContentClass,
        _query: &str,
        limit: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        self.lexical_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.lexical, class, limit).await
    }
}

#[async_trait]
impl VectorIndex for Scripted {
    async fn semantic_search(
        &self,
        class: ContentClass,
        _embedding: &[f32],
        limit: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        self.semantic_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(&self.semantic, class, limit).await
    }
}

#[async_trait]
impl Hydrator for Scripted {
    async fn fetch(
        &self,
        class: ContentClass,
        ids: &[DocumentId],
        _query: &str,
    ) -> Result<Vec<ProjectedResult>, IndexError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.hydration_error {
            return Err(e.clone());
        }
        // Reverse to prove the engine restores rank order itself
        Ok(ids
            .iter()
            .rev()
            .filter(|id| !self.vanished.contains(*id))
            .map(|id| projected(class, id))
            .collect())
    }
}

pub fn projected(class: ContentClass, id: &DocumentId) -> ProjectedResult {
    ProjectedResult {
        id: id.clone(),
        source: class,
        kind: class.as_str().to_string(),
        title: format!("title of {}", id),
        snippet: String::new(),
        tags: vec![],
        status: "open".into(),
        author: Author {
            id: "u1".into(),
            display_name: "u1".into(),
            ..Default::default()
        },
        score: 0.0,
        vote_score: 0,
        answers_count: 0,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        resolved_at: None,
    }
}

// ============================================================================
// Embedders
// ============================================================================

/// Always returns the same vector
pub struct StaticEmbedder(pub Vec<f32>);

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Always fails
pub struct FailingEmbedder(pub EmbedError);

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        Err(self.0.clone())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Never answers within any reasonable deadline
pub struct HangingEmbedder;

#[async_trait]
impl EmbeddingProvider for HangingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![1.0])
    }

    fn name(&self) -> &str {
        "hanging"
    }
}

/// Counts calls; used to prove the provider is bypassed
#[derive(Default)]
pub struct CountingEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for CountingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0])
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ============================================================================
// Cancellation tracking
// ============================================================================

/// Sets a flag when dropped
pub struct DropFlag(pub Arc<AtomicUsize>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lexical index whose calls hang until cancelled
#[derive(Default)]
pub struct Hanging {
    pub started: Arc<AtomicUsize>,
    pub abandoned: Arc<AtomicUsize>,
    pub finished: Arc<AtomicBool>,
}

#[async_trait]
impl LexicalIndex for Hanging {
    async fn lexical_search(
        &self,
        _class: ContentClass,
        _query: &str,
        _limit: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let _guard = DropFlag(self.abandoned.clone());
        tokio::time::sleep(Duration::from_secs(3600)).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[async_trait]
impl VectorIndex for Hanging {
    async fn semantic_search(
        &self,
        _class: ContentClass,
        _embedding: &[f32],
        _limit: usize,
        _filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl Hydrator for Hanging {
    async fn fetch(
        &self,
        class: ContentClass,
        ids: &[DocumentId],
        _query: &str,
    ) -> Result<Vec<ProjectedResult>, IndexError> {
        Ok(ids.iter().map(|id| projected(class, id)).collect())
    }
}

// ============================================================================
// Engine helpers
// ============================================================================

pub fn engine(index: Arc<Scripted>) -> HybridSearch {
    HybridSearch::from_store(SearchConfig::default(), index)
}

pub fn engine_with(config: SearchConfig, index: Arc<Scripted>) -> HybridSearch {
    HybridSearch::from_store(config, index)
}

pub fn result_ids(response: &rankfuse_core::SearchResponse) -> Vec<(ContentClass, String)> {
    response
        .results
        .iter()
        .map(|r| (r.source, r.id.as_str().to_string()))
        .collect()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
