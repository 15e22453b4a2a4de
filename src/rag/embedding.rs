//! Embedding providers.
//!
//! | Provider   | Use                                                        |
//! |------------|------------------------------------------------------------|
//! | `disabled` | Default. Ingestion stores chunks without vectors, search is unavailable |
//! | `hash`     | Deterministic local feature hashing, for development and tests |
//! | `openai`   | OpenAI-compatible `POST <base_url>/embeddings` API         |

use crate::{config::RagConfig, errors::ServiceError};
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider kind as named in configuration
    fn kind(&self) -> &'static str;
    fn model_name(&self) -> &str;
    fn dims(&self) -> usize;

    fn is_enabled(&self) -> bool {
        true
    }

    /// Embeds `texts`, returning one vector per input in input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError>;
}

/// Builds the provider named by `rag.embedding_provider`
pub fn create_provider(config: &RagConfig) -> Result<Arc<dyn EmbeddingProvider>, ServiceError> {
    match config.embedding_provider.trim().to_ascii_lowercase().as_str() {
        "disabled" => Ok(Arc::new(DisabledProvider)),
        "hash" => Ok(Arc::new(HashProvider::new(config.embedding_dims))),
        "openai" => Ok(Arc::new(OpenAiProvider::from_env(config)?)),
        other => Err(ServiceError::ValidationError(format!(
            "unknown embedding provider '{}'",
            other
        ))),
    }
}

pub struct DisabledProvider;

#[async_trait]
impl EmbeddingProvider for DisabledProvider {
    fn kind(&self) -> &'static str {
        "disabled"
    }
    fn model_name(&self) -> &str {
        "none"
    }
    fn dims(&self) -> usize {
        0
    }
    fn is_enabled(&self) -> bool {
        false
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        Err(ServiceError::ServiceUnavailable(
            "embedding provider is disabled; set APP__RAG__EMBEDDING_PROVIDER".into(),
        ))
    }
}

/// Signed feature hashing of lower-cased alphanumeric tokens.
pub struct HashProvider {
    dims: usize,
}

impl HashProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let digest = Sha256::digest(token.to_lowercase().as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let slot = (u64::from_le_bytes(bucket) % self.dims as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }
        normalize_l2(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashProvider {
    fn kind(&self) -> &'static str {
        "hash"
    }
    fn model_name(&self) -> &str {
        "feature-hash"
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

/// Client for an OpenAI-compatible embeddings endpoint.
///
/// Batches inputs by `embedding_batch_size`. HTTP 429, 5xx and transport
/// errors are retried with exponential backoff (1s, 2s, 4s, ... capped at
/// 32s); any other non-success status fails immediately.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dims: usize,
    batch_size: usize,
    max_retries: u32,
    backoff_base: Duration,
}

impl OpenAiProvider {
    /// Reads the bearer token from `OPENAI_API_KEY`
    pub fn from_env(config: &RagConfig) -> Result<Self, ServiceError> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV).map_err(|_| {
            ServiceError::ValidationError(format!(
                "{} must be set for the openai embedding provider",
                OPENAI_API_KEY_ENV
            ))
        })?;
        Self::new(config, api_key)
    }

    pub fn new(config: &RagConfig, api_key: impl Into<String>) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.embedding_timeout_secs))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("http client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.embedding_base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config
                .embedding_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            dims: config.embedding_dims,
            batch_size: config.embedding_batch_size.max(1),
            max_retries: config.embedding_max_retries,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Overrides the first retry delay
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "input": texts,
        });
        // ada-002 is fixed-width and rejects the parameter
        if !self.model.starts_with("text-embedding-ada") {
            body["dimensions"] = serde_json::json!(self.dims);
        }

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_base * (1u32 << (attempt - 1).min(5));
                debug!(attempt, ?delay, "retrying embedding request");
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let json: Value = response.json().await.map_err(|e| {
                            ServiceError::ExternalServiceError(format!(
                                "invalid embeddings response: {}",
                                e
                            ))
                        })?;
                        let vectors = parse_embeddings_response(&json)?;
                        if vectors.len() != texts.len() {
                            return Err(ServiceError::ExternalServiceError(format!(
                                "expected {} embeddings, received {}",
                                texts.len(),
                                vectors.len()
                            )));
                        }
                        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dims) {
                            return Err(ServiceError::ExternalServiceError(format!(
                                "expected {}-dimensional embeddings, received {}",
                                self.dims,
                                bad.len()
                            )));
                        }
                        return Ok(vectors);
                    }

                    let text = response.text().await.unwrap_or_default();
                    let err = ServiceError::ExternalServiceError(format!(
                        "embeddings API returned {}: {}",
                        status, text
                    ));
                    if status.as_u16() == 429 || status.is_server_error() {
                        warn!(status = status.as_u16(), attempt, "embedding request failed");
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    warn!(error = %e, attempt, "embedding request failed");
                    last_err = Some(ServiceError::ExternalServiceError(format!(
                        "embeddings request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ServiceError::ExternalServiceError("embedding failed after retries".into())
        }))
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    fn kind(&self) -> &'static str {
        "openai"
    }
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ServiceError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

/// Extracts `data[].embedding`, ordered by `data[].index` when present
pub fn parse_embeddings_response(json: &Value) -> Result<Vec<Vec<f32>>, ServiceError> {
    let data = json
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ServiceError::ExternalServiceError("embeddings response has no data array".into())
        })?;

    let mut indexed = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let embedding = item
            .get("embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ServiceError::ExternalServiceError("embeddings response item has no vector".into())
            })?;
        let index = item
            .get("index")
            .and_then(Value::as_u64)
            .map(|i| i as usize)
            .unwrap_or(position);
        let vector: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity in `[-1, 1]`; `0.0` for empty or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }
    dot / denom
}
