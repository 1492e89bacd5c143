//! Embedding generation for repository chunks
//!
//! Providers turn batches of text into vectors and report how many
//! tokens the service billed for them.

pub mod openai;

pub use openai::OpenAIEmbedding;

use anyhow::Result;

/// Embeddings for one batch of texts, in input order
#[derive(Debug, Clone)]
pub struct EmbeddingBatch {
    /// One vector per input text
    pub embeddings: Vec<Vec<f32>>,
    /// Tokens billed for the batch
    pub total_tokens: usize,
}

/// Trait for embedding providers
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts, one vector per input
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch>;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned"))
    }

    /// Get the model name the provider requests
    fn model(&self) -> &str;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// Price in dollars per 1000 tokens for known embedding models
pub fn price_per_thousand_tokens(model: &str) -> Option<f64> {
    match model {
        "text-embedding-ada-002" => Some(0.0004),
        "text-embedding-3-small" => Some(0.000_02),
        "text-embedding-3-large" => Some(0.000_13),
        _ => None,
    }
}

/// Estimate the dollar cost of a token count, when the model is known
pub fn estimate_cost(model: &str, tokens: usize) -> Option<f64> {
    price_per_thousand_tokens(model).map(|price| (tokens as f64 / 1000.0) * price)
}

/// Default vector dimension for known embedding models
pub fn default_dimension(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Mock embedding provider for testing
pub struct MockEmbedding {
    dimension: usize,
}

impl MockEmbedding {
    /// Create a new mock embedding provider
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed_batch(&self, texts: &[String]) -> Result<EmbeddingBatch> {
        // Deterministic vectors derived from the text hash, so equal text
        // always lands on the same point.
        let embeddings = texts
            .iter()
            .map(|text| {
                let hash = crate::chunk::content_hash(text);
                let bytes = hash.as_bytes();

                (0..self.dimension)
                    .map(|i| {
                        let byte = bytes[i % bytes.len()] as f32;
                        (byte / 255.0) * 2.0 - 1.0
                    })
                    .collect()
            })
            .collect();

        // Rough token accounting mirroring typical tokenizer density.
        let total_tokens = texts.iter().map(|t| t.len().div_ceil(4)).sum();

        Ok(EmbeddingBatch {
            embeddings,
            total_tokens,
        })
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedding_is_deterministic() {
        let provider = MockEmbedding::new(384);

        let first = provider.embed("Hello, world!").await.unwrap();
        assert_eq!(first.len(), 384);

        let second = provider.embed("Hello, world!").await.unwrap();
        assert_eq!(first, second);

        let other = provider.embed("Goodbye, world!").await.unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_mock_batch_order_and_tokens() {
        let provider = MockEmbedding::new(8);
        let texts = vec!["alpha".to_string(), "beta".to_string()];

        let batch = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.embeddings.len(), 2);
        assert_eq!(batch.embeddings[0], provider.embed("alpha").await.unwrap());
        assert_eq!(batch.embeddings[1], provider.embed("beta").await.unwrap());
        assert!(batch.total_tokens > 0);
    }

    #[test]
    fn test_cost_for_known_models() {
        assert_eq!(estimate_cost("text-embedding-ada-002", 2500), Some(0.001));
        assert_eq!(estimate_cost("text-embedding-3-small", 0), Some(0.0));
        assert_eq!(estimate_cost("some-private-model", 1000), None);
    }

    #[test]
    fn test_default_dimensions() {
        assert_eq!(default_dimension("text-embedding-ada-002"), 1536);
        assert_eq!(default_dimension("text-embedding-3-large"), 3072);
    }
}
