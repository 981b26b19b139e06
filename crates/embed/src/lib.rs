//! Query embedding providers for rankfuse
//!
//! Two implementations of [`EmbeddingProvider`](rankfuse_core::EmbeddingProvider):
//!
//! - [`HashEmbedder`]: deterministic xxh3 feature hashing, offline, no model
//! - [`HttpEmbedder`]: OpenAI-compatible `/embeddings` endpoint (feature `http`)
//!
//! Provider failures never fail a search; the engine treats any
//! [`EmbedError`](rankfuse_core::EmbedError) as "no embedding" and ranks
//! lexically.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod hash;
#[cfg(feature = "http")]
pub mod http;

pub use hash::{HashEmbedder, DEFAULT_HASH_DIMENSION};
#[cfg(feature = "http")]
pub use http::{HttpEmbedder, MAX_INPUT_CHARS};
