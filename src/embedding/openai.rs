//! OpenAI embeddings API client

use super::{default_dimension, EmbeddingBatch, EmbeddingProvider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default API endpoint
const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Attempts per batch before giving up
const MAX_RETRIES: usize = 3;

/// Embedding provider backed by the OpenAI embeddings API
pub struct OpenAIEmbedding {
    /// API endpoint URL
    endpoint: String,
    /// Model name
    model: String,
    /// API key
    api_key: String,
    /// HTTP client
    client: reqwest::Client,
    /// Embedding dimension
    dimension: usize,
}

impl OpenAIEmbedding {
    /// Create a new provider for a model
    pub fn new(model: &str, api_key: &str) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
            dimension: default_dimension(model),
        }
    }

    /// Point the provider at a compatible endpoint
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    /// Set the embedding dimension
    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }

    /// Send one request against the embeddings endpoint
    async fn request_batch(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        let url = format!("{}/v1/embeddings", self.endpoint);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("Failed to send embedding request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding request failed: {} - {}", status, body);
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .context("Failed to parse embedding response")?;

        collect_batch(result, texts.len())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAIEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.request_batch(texts).await {
                Ok(batch) => return Ok(batch),
                Err(e) => {
                    tracing::warn!("Embedding request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(e);

                    // Wait before retry
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        500 * (attempt as u64 + 1),
                    ))
                    .await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Reorder response rows into input order and pick up the billed tokens.
///
/// Rejects a response whose row count does not match the input count.
fn collect_batch(response: EmbeddingResponse, expected: usize) -> Result<EmbeddingBatch> {
    if response.data.len() != expected {
        anyhow::bail!(
            "Embedding response returned {} rows for {} inputs",
            response.data.len(),
            expected
        );
    }

    let total_tokens = response
        .usage
        .map(|u| u.total_tokens as usize)
        .unwrap_or(0);

    let mut rows: Vec<_> = response
        .data
        .into_iter()
        .map(|d| (d.index, d.embedding))
        .collect();

    // Sort by index to maintain input order
    rows.sort_by_key(|(idx, _)| *idx);

    Ok(EmbeddingBatch {
        embeddings: rows.into_iter().map(|(_, e)| e).collect(),
        total_tokens,
    })
}

// Wire types

/// Embedding request body
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

/// Embedding response body
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: Option<EmbeddingUsage>,
}

/// One embedding row in the response
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

/// Token usage reported by the API
#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: i32,
}
