//! Error types for rankfuse
//!
//! Three layers of failure, matching how far each one is allowed to travel:
//!
//! | Type | Raised by | Reaches the caller? |
//! |------|-----------|---------------------|
//! | [`IndexError`] | text index, vector index, hydration store | Only as [`SearchError::TotalFailure`] / [`SearchError::Hydration`] |
//! | [`EmbedError`] | embedding providers | Never; the query degrades to fulltext |
//! | [`SearchError`] | the engine | Yes |
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SearchError>;

// ============================================================================
// SearchError
// ============================================================================

/// Errors surfaced to callers of the search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request cannot be answered as stated (client error, not retryable)
    #[error("invalid query: {reason}")]
    InvalidQuery {
        /// What was wrong with the request
        reason: String,
    },

    /// Every retrieval branch that was invoked failed
    ///
    /// The underlying indexes are unreachable, so no partial answer exists.
    #[error("all {attempted} retrieval branches failed (last error: {last_error})")]
    TotalFailure {
        /// Number of branches that were invoked (and failed)
        attempted: usize,
        /// Display form of the last recorded branch error
        last_error: String,
    },

    /// The hydration layer could not project the page
    #[error("hydration failed: {reason}")]
    Hydration {
        /// Underlying failure
        reason: String,
    },

    /// Configuration could not be parsed or is out of range
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong with the configuration
        reason: String,
    },

    /// I/O error (reading configuration or corpus files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SearchError {
    /// Create an InvalidQuery error
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        SearchError::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(reason: impl Into<String>) -> Self {
        SearchError::Config {
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request later could succeed
    ///
    /// Index outages are transient; malformed requests and configuration
    /// are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::TotalFailure { .. } | SearchError::Hydration { .. }
        )
    }
}

impl From<toml::de::Error> for SearchError {
    fn from(e: toml::de::Error) -> Self {
        SearchError::Config {
            reason: e.to_string(),
        }
    }
}

// ============================================================================
// IndexError
// ============================================================================

/// Failure of one call into a text index, vector index or hydration store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// The index could not be reached
    #[error("index unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within its deadline
    #[error("index call timed out after {after:?}")]
    Timeout {
        /// Deadline that was exceeded
        after: Duration,
    },

    /// Query embedding does not match the indexed dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the indexed vectors
        expected: usize,
        /// Dimension of the query vector
        actual: usize,
    },

    /// Any other backend failure
    #[error("index backend error: {0}")]
    Backend(String),
}

// ============================================================================
// EmbedError
// ============================================================================

/// Failure to produce a query embedding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmbedError {
    /// Input text was empty (or had nothing worth embedding)
    #[error("embedding input must not be empty")]
    EmptyInput,

    /// HTTP request failed (network unreachable, connection refused, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status
    #[error("provider returned status {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// Provider did not answer in time
    #[error("embedding request timed out")]
    Timeout,

    /// Response could not be decoded
    #[error("parse error: {0}")]
    Parse(String),

    /// Response decoded but carried no vector
    #[error("provider returned empty embedding data")]
    EmptyResponse,
}
