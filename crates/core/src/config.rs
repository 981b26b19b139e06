//! Engine configuration via `rankfuse.toml`
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Per-request overrides are applied on top of these values
//! by [`SearchRequest::fusion_params`](crate::SearchRequest::fusion_params).

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "rankfuse.toml";

/// Configuration for an OpenAI-compatible embeddings endpoint.
///
/// Persisted in `rankfuse.toml` under the `[embedding]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// API base URL (e.g. "https://api.voyageai.com/v1")
    pub endpoint: String,
    /// Model name (e.g. "voyage-code-3")
    pub model: String,
    /// Optional bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Optional `input_type` hint sent with every request (e.g. "query")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    /// Request timeout in milliseconds (default: 5000)
    #[serde(default = "default_embed_timeout_ms")]
    pub timeout_ms: u64,
    /// Retries after the first attempt on transport errors and 429 (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_embed_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_rrf_k() -> u32 {
    60
}

fn default_weight() -> f64 {
    1.0
}

fn default_match_count() -> usize {
    20
}

fn default_per_page() -> u32 {
    20
}

fn default_max_per_page() -> u32 {
    50
}

fn default_branch_timeout_ms() -> u64 {
    2000
}

/// Engine configuration loaded from `rankfuse.toml`.
///
/// # Example
///
/// ```toml
/// rrf_k = 60
/// fts_weight = 1.0
/// vec_weight = 1.0
/// match_count = 20
///
/// # [embedding]
/// # endpoint = "https://api.voyageai.com/v1"
/// # model = "voyage-code-3"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// RRF damping constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    /// Default weight of the lexical contribution.
    #[serde(default = "default_weight")]
    pub fts_weight: f64,
    /// Default weight of the semantic contribution.
    #[serde(default = "default_weight")]
    pub vec_weight: f64,
    /// Per-class output cap (each branch retrieves twice this).
    #[serde(default = "default_match_count")]
    pub match_count: usize,
    /// Page size when the request leaves it unset.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
    /// Upper bound on page size.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,
    /// Deadline for each retrieval and hydration call.
    #[serde(default = "default_branch_timeout_ms")]
    pub branch_timeout_ms: u64,
    /// Deadline for generating the query embedding.
    #[serde(default = "default_embed_timeout_ms")]
    pub embed_timeout_ms: u64,
    /// Optional remote embedding provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingConfig>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            fts_weight: default_weight(),
            vec_weight: default_weight(),
            match_count: default_match_count(),
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            branch_timeout_ms: default_branch_timeout_ms(),
            embed_timeout_ms: default_embed_timeout_ms(),
            embedding: None,
        }
    }
}

impl SearchConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# rankfuse search configuration
#
# Reciprocal Rank Fusion constant. Larger values flatten the
# difference between top and lower ranks.
rrf_k = 60

# Relative weight of the lexical and semantic contributions.
fts_weight = 1.0
vec_weight = 1.0

# Results kept per content class (each retriever fetches twice this).
match_count = 20

# Pagination
default_per_page = 20
max_per_page = 50

# Deadlines in milliseconds
branch_timeout_ms = 2000
embed_timeout_ms = 5000

# Remote embedding provider (OpenAI-compatible /embeddings endpoint).
# Leave commented out to run fulltext-only.
# [embedding]
# endpoint = "https://api.voyageai.com/v1"
# model = "voyage-code-3"
# api_key = "your-api-key"      # optional
# input_type = "query"          # optional
# timeout_ms = 5000             # optional, default 5000
# max_retries = 3               # optional, default 3
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Io`] if the file cannot be read and
    /// [`SearchError::Config`] if it cannot be parsed or is out of range.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SearchError::Config { reason } => SearchError::config(format!(
                "{}: {}",
                path.display(),
                reason
            )),
            other => other,
        })
    }

    /// Load `path` if given, else `rankfuse.toml` in `dir` if present, else defaults.
    pub fn load(path: Option<&Path>, dir: &Path) -> Result<Self, SearchError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.rrf_k == 0 {
            return Err(SearchError::config("rrf_k must be positive"));
        }
        for (name, w) in [("fts_weight", self.fts_weight), ("vec_weight", self.vec_weight)] {
            if !w.is_finite() || w <= 0.0 {
                return Err(SearchError::config(format!(
                    "{} must be a finite positive number, got {}",
                    name, w
                )));
            }
        }
        if self.match_count == 0 {
            return Err(SearchError::config("match_count must be positive"));
        }
        if self.max_per_page == 0 {
            return Err(SearchError::config("max_per_page must be positive"));
        }
        if self.default_per_page == 0 || self.default_per_page > self.max_per_page {
            return Err(SearchError::config(format!(
                "default_per_page must be in 1..={}, got {}",
                self.max_per_page, self.default_per_page
            )));
        }
        if self.branch_timeout_ms == 0 || self.embed_timeout_ms == 0 {
            return Err(SearchError::config("timeouts must be positive"));
        }
        if let Some(embedding) = &self.embedding {
            if embedding.endpoint.trim().is_empty() || embedding.model.trim().is_empty() {
                return Err(SearchError::config(
                    "[embedding] requires both endpoint and model",
                ));
            }
        }
        Ok(())
    }

    /// Deadline for each index call.
    pub fn branch_timeout(&self) -> Duration {
        Duration::from_millis(self.branch_timeout_ms)
    }

    /// Deadline for the query embedding.
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, SearchError> {
        toml::to_string_pretty(self)
            .map_err(|e| SearchError::config(format!("failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_toml_parses_to_defaults() {
        let config = SearchConfig::from_toml_str(SearchConfig::default_toml()).unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = SearchConfig::from_toml_str("").unwrap();
        assert_eq!(config.rrf_k, 60);
        assert_eq!(config.match_count, 20);
        assert!(config.embedding.is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = SearchConfig::from_toml_str("rrf_k = 10\nvec_weight = 0.5\n").unwrap();
        assert_eq!(config.rrf_k, 10);
        assert_eq!(config.vec_weight, 0.5);
        assert_eq!(config.fts_weight, 1.0);
    }

    #[test]
    fn test_embedding_section_defaults() {
        let config = SearchConfig::from_toml_str(
            "[embedding]\nendpoint = \"http://localhost:8080/v1\"\nmodel = \"m\"\n",
        )
        .unwrap();
        let embedding = config.embedding.unwrap();
        assert_eq!(embedding.timeout_ms, 5000);
        assert_eq!(embedding.max_retries, 3);
        assert!(embedding.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_rrf_k() {
        let err = SearchConfig::from_toml_str("rrf_k = 0").unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_weight() {
        let err = SearchConfig::from_toml_str("fts_weight = 0.0").unwrap_err();
        assert!(err.to_string().contains("fts_weight"));
    }

    #[test]
    fn test_validate_rejects_default_page_over_max() {
        let err =
            SearchConfig::from_toml_str("default_per_page = 80\nmax_per_page = 50").unwrap_err();
        assert!(err.to_string().contains("default_per_page"));
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = SearchConfig::from_toml_str("rrf_k = \"sixty\"").unwrap_err();
        assert!(matches!(err, SearchError::Config { .. }));
    }

    #[test]
    fn test_from_file_missing_is_io() {
        let dir = TempDir::new().unwrap();
        let err = SearchConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SearchError::Io(_)));
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let config = SearchConfig::load(None, dir.path()).unwrap();
        assert_eq!(config, SearchConfig::default());

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "match_count = 3").unwrap();
        let config = SearchConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.match_count, 3);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = SearchConfig::default();
        config.rrf_k = 7;
        let text = config.to_toml().unwrap();
        assert_eq!(SearchConfig::from_toml_str(&text).unwrap(), config);
    }
}
