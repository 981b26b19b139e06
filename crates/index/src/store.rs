//! In-memory document store
//!
//! `DocumentStore` keeps one `BTreeMap` per content class and serves all
//! three read seams of the engine from it:
//!
//! - [`LexicalIndex`]: BM25 over each class's lexical fields
//! - [`VectorIndex`]: brute-force cosine over stored embeddings
//! - [`Hydrator`]: projection with highlighted snippets
//!
//! Iteration is in `DocumentId` order, and every ranking sorts by
//! (score desc, id asc), so identical data always yields identical order.
//! Soft-deleted documents stay in the map but are invisible to all three seams.

use crate::distance::cosine_similarity;
use crate::scorer::{BM25LiteScorer, Scorer, ScorerContext, SearchDoc};
use crate::snippet::{highlight, truncate_chars, TITLE_CHARS};
use crate::tokenizer::{tokenize, tokenize_unique};
use async_trait::async_trait;
use parking_lot::RwLock;
use rankfuse_core::{
    ClassFields, ContentClass, DocumentId, Hydrator, IndexError, LexicalIndex, ProjectedResult,
    SearchFilters, SearchableDocument, VectorIndex,
};
use std::collections::BTreeMap;
use tracing::debug;

type ClassMap = BTreeMap<DocumentId, SearchableDocument>;

/// Thread-safe in-memory store for all content classes
pub struct DocumentStore {
    posts: RwLock<ClassMap>,
    answers: RwLock<ClassMap>,
    approaches: RwLock<ClassMap>,
    /// Required embedding dimension, if fixed
    dimension: Option<usize>,
    scorer: BM25LiteScorer,
}

impl DocumentStore {
    /// Create an empty store
    ///
    /// With `Some(dim)`, embeddings of any other length are rejected on
    /// insert and queries of any other length fail with
    /// [`IndexError::DimensionMismatch`].
    pub fn new(dimension: Option<usize>) -> Self {
        DocumentStore {
            posts: RwLock::new(BTreeMap::new()),
            answers: RwLock::new(BTreeMap::new()),
            approaches: RwLock::new(BTreeMap::new()),
            dimension,
            scorer: BM25LiteScorer::default(),
        }
    }

    /// Create a store pre-populated with `docs`
    pub fn from_documents(
        dimension: Option<usize>,
        docs: impl IntoIterator<Item = SearchableDocument>,
    ) -> Result<Self, IndexError> {
        let store = Self::new(dimension);
        for doc in docs {
            store.upsert(doc)?;
        }
        Ok(store)
    }

    fn shard(&self, class: ContentClass) -> &RwLock<ClassMap> {
        match class {
            ContentClass::Post => &self.posts,
            ContentClass::Answer => &self.answers,
            ContentClass::Approach => &self.approaches,
        }
    }

    fn check_embedding(&self, embedding: &[f32]) -> Result<(), IndexError> {
        let actual = embedding.len();
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(IndexError::DimensionMismatch { expected, actual })
            }
            _ if embedding.iter().any(|x| !x.is_finite()) => Err(IndexError::Backend(
                "embedding has non-finite components".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Embedding dimension enforced by this store
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Insert or replace a document, returning the previous version
    pub fn upsert(
        &self,
        doc: SearchableDocument,
    ) -> Result<Option<SearchableDocument>, IndexError> {
        if let Some(embedding) = &doc.embedding {
            self.check_embedding(embedding)?;
        }
        let class = doc.class();
        debug!(target: "rankfuse::index", class = %class, id = %doc.id, "upsert");
        Ok(self.shard(class).write().insert(doc.id.clone(), doc))
    }

    /// Attach or replace the embedding of an existing document
    ///
    /// Returns false if the document does not exist.
    pub fn set_embedding(
        &self,
        class: ContentClass,
        id: &DocumentId,
        embedding: Vec<f32>,
    ) -> Result<bool, IndexError> {
        self.check_embedding(&embedding)?;
        let mut map = self.shard(class).write();
        match map.get_mut(id) {
            Some(doc) => {
                doc.embedding = Some(embedding);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Flag a document deleted; returns false if it was absent or already deleted
    pub fn soft_delete(&self, class: ContentClass, id: &DocumentId) -> bool {
        let mut map = self.shard(class).write();
        match map.get_mut(id) {
            Some(doc) if !doc.deleted => {
                doc.deleted = true;
                debug!(target: "rankfuse::index", class = %class, id = %id, "soft delete");
                true
            }
            _ => false,
        }
    }

    /// Remove a document entirely (hard delete)
    pub fn remove(&self, class: ContentClass, id: &DocumentId) -> Option<SearchableDocument> {
        self.shard(class).write().remove(id)
    }

    /// Clone of a stored document, deleted or not
    pub fn get(&self, class: ContentClass, id: &DocumentId) -> Option<SearchableDocument> {
        self.shard(class).read().get(id).cloned()
    }

    /// Number of live (not deleted) documents in a class
    pub fn live_count(&self, class: ContentClass) -> usize {
        self.shard(class).read().values().filter(|d| !d.deleted).count()
    }

    /// Fill missing embeddings using `embed`; returns how many were set
    ///
    /// Documents that already carry an embedding are left alone.
    pub fn backfill_embeddings<F>(&self, mut embed: F) -> Result<usize, IndexError>
    where
        F: FnMut(&str) -> Vec<f32>,
    {
        let mut filled = 0;
        for class in ContentClass::all() {
            let mut map = self.shard(class).write();
            for doc in map.values_mut().filter(|d| d.embedding.is_none()) {
                let embedding = embed(&doc.fields.lexical_text());
                self.check_embedding(&embedding)?;
                doc.embedding = Some(embedding);
                filled += 1;
            }
        }
        Ok(filled)
    }

    // ========================================================================
    // Ranking (synchronous, lock held only for the scan)
    // ========================================================================

    fn rank_lexical(
        &self,
        class: ContentClass,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Vec<DocumentId> {
        let query_terms = tokenize_unique(query);
        if query_terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let map = self.shard(class).read();
        let live: Vec<&SearchableDocument> = map.values().filter(|d| !d.deleted).collect();
        let search_docs: Vec<SearchDoc> = live
            .iter()
            .map(|d| {
                let doc = SearchDoc::new(tokenize(&d.fields.lexical_text()));
                match &d.fields {
                    ClassFields::Post { title, .. } => doc.with_title(tokenize(title)),
                    _ => doc,
                }
            })
            .collect();

        // Corpus statistics cover every live document of the class so a
        // filter does not shift IDF.
        let ctx = ScorerContext::build(&search_docs, &query_terms);

        let mut scored: Vec<(&DocumentId, f32)> = live
            .iter()
            .zip(search_docs.iter())
            .filter(|(d, _)| filters.admits(d))
            .map(|(d, doc)| (&d.id, self.scorer.score(doc, &query_terms, &ctx)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        sort_scored(&mut scored);
        scored
            .into_iter()
            .take(limit)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn rank_semantic(
        &self,
        class: ContentClass,
        embedding: &[f32],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        self.check_embedding(embedding)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let map = self.shard(class).read();
        let mut scored: Vec<(&DocumentId, f32)> = map
            .values()
            .filter(|d| !d.deleted && filters.admits(d))
            .filter_map(|d| {
                let stored = d.embedding.as_deref()?;
                (stored.len() == embedding.len())
                    .then(|| (&d.id, cosine_similarity(embedding, stored)))
            })
            .filter(|(_, score)| !score.is_nan())
            .collect();

        sort_scored(&mut scored);
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn project(
        &self,
        class: ContentClass,
        ids: &[DocumentId],
        query: &str,
    ) -> Vec<ProjectedResult> {
        let query_terms = tokenize_unique(query);
        let map = self.shard(class).read();
        ids.iter()
            .filter_map(|id| map.get(id))
            .filter(|d| !d.deleted)
            .map(|d| project_document(d, &query_terms))
            .collect()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Sort by score descending, then id ascending
fn sort_scored(scored: &mut [(&DocumentId, f32)]) {
    scored.sort_by(|(id_a, a), (id_b, b)| {
        b.total_cmp(a).then_with(|| id_a.cmp(id_b))
    });
}

fn project_document(doc: &SearchableDocument, query_terms: &[String]) -> ProjectedResult {
    let title = match &doc.fields {
        ClassFields::Post { .. } => doc.fields.title_text(),
        _ => truncate_chars(&doc.fields.title_text(), TITLE_CHARS),
    };
    let mut author = doc.meta.author.clone();
    if author.display_name.is_empty() {
        author.display_name = author.id.clone();
    }

    ProjectedResult {
        id: doc.id.clone(),
        source: doc.class(),
        kind: doc.fields.kind(),
        title,
        snippet: highlight(&doc.fields.lexical_text(), query_terms),
        tags: doc.meta.tags.clone(),
        status: doc.meta.status.clone(),
        author,
        score: 0.0,
        vote_score: doc.meta.vote_score,
        answers_count: doc.meta.answers_count,
        created_at: doc.meta.created_at,
        resolved_at: doc.meta.resolved_at,
    }
}

// ============================================================================
// Collaborator seams
// ============================================================================

#[async_trait]
impl LexicalIndex for DocumentStore {
    async fn lexical_search(
        &self,
        class: ContentClass,
        query: &str,
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        Ok(self.rank_lexical(class, query, limit, filters))
    }
}

#[async_trait]
impl VectorIndex for DocumentStore {
    async fn semantic_search(
        &self,
        class: ContentClass,
        embedding: &[f32],
        limit: usize,
        filters: &SearchFilters,
    ) -> Result<Vec<DocumentId>, IndexError> {
        self.rank_semantic(class, embedding, limit, filters)
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

#[async_trait]
impl Hydrator for DocumentStore {
    async fn fetch(
        &self,
        class: ContentClass,
        ids: &[DocumentId],
        query: &str,
    ) -> Result<Vec<ProjectedResult>, IndexError> {
        Ok(self.project(class, ids, query))
    }
}
