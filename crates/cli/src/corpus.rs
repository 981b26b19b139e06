//! Corpus loading and engine assembly.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rankfuse_core::{SearchConfig, SearchableDocument};
use rankfuse_embed::HashEmbedder;
use rankfuse_index::DocumentStore;
use rankfuse_search::HybridSearch;
use tracing::info;

/// Read a JSON array of documents.
pub fn load_corpus(path: &Path) -> Result<Vec<SearchableDocument>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus {}", path.display()))?;
    let docs: Vec<SearchableDocument> = serde_json::from_str(&text)
        .with_context(|| format!("invalid corpus {}", path.display()))?;
    Ok(docs)
}

/// Build the in-memory store, backfilling embeddings when hashing is on.
///
/// Without a hash embedder the dimension is taken from the first document
/// that carries an embedding.
pub fn build_store(
    docs: Vec<SearchableDocument>,
    hasher: Option<&HashEmbedder>,
) -> Result<DocumentStore> {
    let dimension = match hasher {
        Some(h) => Some(h.dimension()),
        None => docs
            .iter()
            .find_map(|d| d.embedding.as_ref().map(|e| e.len())),
    };
    let store = DocumentStore::from_documents(dimension, docs)
        .context("corpus embeddings disagree on dimension")?;

    if let Some(h) = hasher {
        let filled = store
            .backfill_embeddings(|text| h.embed_sync(text))
            .context("failed to backfill embeddings")?;
        info!(target: "rankfuse::index", filled, dimension = h.dimension(), "Backfilled embeddings");
    }
    Ok(store)
}

/// Wire the engine over `store` with whichever embedder is configured.
pub fn build_engine(
    config: SearchConfig,
    store: DocumentStore,
    hasher: Option<HashEmbedder>,
) -> HybridSearch {
    let remote = config.embedding.clone();
    let engine = HybridSearch::from_store(config, Arc::new(store));
    match (hasher, remote) {
        (Some(h), _) => engine.with_embedder(Arc::new(h)),
        #[cfg(feature = "http")]
        (None, Some(remote)) => {
            engine.with_embedder(Arc::new(rankfuse_embed::HttpEmbedder::new(&remote)))
        }
        _ => engine,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankfuse_core::ContentClass;
    use std::io::Write;

    const CORPUS: &str = r#"[
        {"id": "p1", "class": "post", "title": "Worker pool deadlock",
         "description": "threads hang on shutdown", "post_type": "problem",
         "tags": ["rust"], "status": "open"},
        {"id": "a1", "class": "answer", "content": "Drop the sender first",
         "question_id": "p1"},
        {"id": "ap1", "class": "approach", "angle": "bisect", "method": "git bisect",
         "outcome": "found commit", "solution": "revert", "problem_id": "p1"}
    ]"#;

    fn corpus_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_load_corpus() {
        let f = corpus_file(CORPUS);
        let docs = load_corpus(f.path()).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].class(), ContentClass::Post);
        assert_eq!(docs[1].class(), ContentClass::Answer);
        assert_eq!(docs[2].class(), ContentClass::Approach);
    }

    #[test]
    fn test_load_corpus_reports_path() {
        let f = corpus_file("{not json");
        let err = load_corpus(f.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid corpus"));
    }

    #[test]
    fn test_hash_backfill() {
        let f = corpus_file(CORPUS);
        let hasher = HashEmbedder::new(32);
        let store = build_store(load_corpus(f.path()).unwrap(), Some(&hasher)).unwrap();
        assert_eq!(store.dimension(), Some(32));
        let doc = store.get(ContentClass::Answer, &"a1".into()).unwrap();
        assert_eq!(doc.embedding.map(|e| e.len()), Some(32));
    }

    #[test]
    fn test_dimension_inferred_from_corpus() {
        let docs = vec![
            SearchableDocument::answer("a1", "x").with_embedding(vec![1.0, 0.0]),
            SearchableDocument::answer("a2", "y"),
        ];
        let store = build_store(docs, None).unwrap();
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_inconsistent_dimensions_rejected() {
        let docs = vec![
            SearchableDocument::answer("a1", "x").with_embedding(vec![1.0, 0.0]),
            SearchableDocument::answer("a2", "y").with_embedding(vec![1.0]),
        ];
        assert!(build_store(docs, None).is_err());
    }
}
