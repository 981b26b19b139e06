//! Core types and traits for rankfuse
//!
//! This crate defines the foundational types shared by every other crate:
//! - ContentClass, DocumentId, SearchableDocument: what gets ranked
//! - SearchRequest, SearchResponse, ProjectedResult: the engine boundary
//! - SearchConfig: `rankfuse.toml` configuration
//! - SearchError, IndexError, EmbedError: error taxonomy
//! - LexicalIndex, VectorIndex, EmbeddingProvider, Hydrator: collaborator seams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod search_types;
pub mod traits;
pub mod types;

pub use config::{EmbeddingConfig, SearchConfig, CONFIG_FILE_NAME};
pub use error::{EmbedError, IndexError, Result, SearchError};
pub use search_types::{
    FusionParams, FusionWeights, ProjectedResult, RankedCandidate, SearchFilters, SearchMethod,
    SearchRequest, SearchResponse,
};
pub use traits::{EmbeddingProvider, Hydrator, LexicalIndex, VectorIndex};
pub use types::{
    Author, AuthorType, ClassFields, ContentClass, DocumentId, DocumentMeta, SearchableDocument,
};
