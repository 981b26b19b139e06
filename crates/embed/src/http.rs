//! OpenAI-compatible embeddings client
//!
//! POSTs `{"input", "model", "input_type"?}` to `{endpoint}/embeddings` and
//! reads `data[0].embedding`. Works with Voyage, OpenAI, Ollama's `/v1`
//! shim and other compatible servers.
//!
//! Transport errors, HTTP 429 and 5xx are retried with exponential backoff
//! (base 500ms). Other 4xx answers fail immediately. The blocking HTTP call
//! runs on tokio's blocking pool; if the engine's deadline fires first the
//! result is discarded and the request finishes under the agent's own
//! timeout.

use async_trait::async_trait;
use rankfuse_core::{EmbedError, EmbeddingConfig, EmbeddingProvider};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest input sent to the provider (8000 tokens at ~4 chars each)
pub const MAX_INPUT_CHARS: usize = 32_000;

/// First retry delay; doubles per attempt
const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(500);

/// Longest error body kept in [`EmbedError::Status`]
const ERROR_BODY_CHARS: usize = 200;

/// Embedding provider backed by an HTTP endpoint
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
}

#[derive(Clone)]
struct Client {
    url: String,
    model: String,
    api_key: Option<String>,
    input_type: Option<String>,
    max_retries: u32,
    retry_base: Duration,
    agent: ureq::Agent,
}

impl HttpEmbedder {
    /// Build a client from the `[embedding]` config section.
    ///
    /// `endpoint` is the API base URL; `/embeddings` is appended.
    pub fn new(config: &EmbeddingConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(config.timeout_ms)))
            .http_status_as_error(false)
            .build();
        Self {
            client: Client {
                url: format!("{}/embeddings", config.endpoint.trim_end_matches('/')),
                model: config.model.clone(),
                api_key: config.api_key.clone(),
                input_type: config.input_type.clone(),
                max_retries: config.max_retries,
                retry_base: DEFAULT_RETRY_BASE,
                agent: ureq::Agent::new_with_config(agent_config),
            },
        }
    }

    /// Override the first backoff delay.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.client.retry_base = retry_base;
        self
    }

    /// Full request URL
    pub fn url(&self) -> &str {
        &self.client.url
    }
}

impl Client {
    fn request_body(&self, input: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "input": input,
            "model": self.model,
        });
        if let Some(input_type) = &self.input_type {
            body["input_type"] = serde_json::Value::String(input_type.clone());
        }
        body
    }

    fn embed_blocking(&self, input: &str) -> Result<Vec<f32>, EmbedError> {
        let body = serde_json::to_vec(&self.request_body(input))
            .map_err(|e| EmbedError::Parse(format!("failed to serialize request: {}", e)))?;

        let mut attempt = 0;
        loop {
            match self.post_once(&body) {
                Ok(embedding) => return Ok(embedding),
                Err(e) if attempt < self.max_retries && should_retry(&e) => {
                    let delay = backoff_delay(self.retry_base, attempt);
                    warn!(
                        target: "rankfuse::embed",
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Embedding request failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn post_once(&self, body: &[u8]) -> Result<Vec<f32>, EmbedError> {
        let mut request = self
            .agent
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", &format!("Bearer {}", key));
        }

        let mut response = request.send(body).map_err(|e| match e {
            ureq::Error::Timeout(_) => EmbedError::Timeout,
            other => EmbedError::Network(other.to_string()),
        })?;

        let code = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| EmbedError::Network(format!("failed to read response: {}", e)))?;

        if !(200..300).contains(&code) {
            return Err(EmbedError::Status {
                code,
                body: text.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }
        parse_embedding(&text)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        let client = self.client.clone();
        let input = truncate_input(text).to_string();
        let start = Instant::now();

        let embedding = tokio::task::spawn_blocking(move || client.embed_blocking(&input))
            .await
            .map_err(|e| EmbedError::Network(format!("embedding task failed: {}", e)))??;

        debug!(
            target: "rankfuse::embed",
            model = %self.client.model,
            dimension = embedding.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Embedding generated"
        );
        Ok(embedding)
    }

    fn name(&self) -> &str {
        &self.client.model
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Cut `text` to at most [`MAX_INPUT_CHARS`] characters
pub(crate) fn truncate_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Delay before retry number `attempt + 1`
pub(crate) fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

fn should_retry(err: &EmbedError) -> bool {
    match err {
        EmbedError::Network(_) | EmbedError::Timeout => true,
        EmbedError::Status { code, .. } => *code == 429 || *code >= 500,
        _ => false,
    }
}

/// Extract `data[0].embedding` from a response body
pub(crate) fn parse_embedding(text: &str) -> Result<Vec<f32>, EmbedError> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| EmbedError::Parse(format!("invalid JSON response: {}", e)))?;

    let values = match json
        .get("data")
        .and_then(|d| d.get(0))
        .and_then(|d| d.get("embedding"))
    {
        Some(serde_json::Value::Array(values)) => values,
        Some(_) => return Err(EmbedError::Parse("embedding is not an array".to_string())),
        None => return Err(EmbedError::EmptyResponse),
    };
    if values.is_empty() {
        return Err(EmbedError::EmptyResponse);
    }

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| EmbedError::Parse(format!("non-numeric embedding value: {}", v)))
        })
        .collect()
}
