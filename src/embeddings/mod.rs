//! Text embedding generation.
//!
//! The OpenAI-backed implementation batches inputs to respect upstream
//! rate limits. When the provider is unconfigured or a call fails, each
//! affected text gets a pseudo-random stand-in vector instead: the
//! pipeline stays live, but similarity scores for those vectors carry
//! no meaning.

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;

/// Dimensionality contract shared with the vector store.
pub const EMBEDDING_DIM: usize = 1536;

const EMBED_BATCH_SIZE: usize = 10;
const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub text: String,
    pub embedding: Vec<f32>,
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text, preserving input order 1:1.
    async fn embed_batch(&self, texts: &[String]) -> Vec<EmbeddingVector>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Vec<f32>;
}

pub struct OpenAiEmbedder {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            model: config.embedding_model.clone(),
        }
    }

    async fn request_batch(&self, api_key: &str, batch: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let body = json!({
            "model": self.model,
            "input": batch,
        });

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Embedding error: {}", text)));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(values) = item["embedding"].as_array() {
                    let vector: Vec<f32> = values
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vector);
                }
            }
        }

        if embeddings.len() != batch.len() {
            return Err(ApiError::Internal(format!(
                "Embedding count mismatch: {} != {}",
                embeddings.len(),
                batch.len()
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Vec<EmbeddingVector> {
        let Some(api_key) = self.api_key.clone() else {
            return texts.iter().map(|text| degraded_embedding(text)).collect();
        };

        let mut results = Vec::with_capacity(texts.len());
        // Batches run one at a time to stay under provider rate limits.
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            match self.request_batch(&api_key, batch).await {
                Ok(vectors) => {
                    results.extend(
                        batch
                            .iter()
                            .zip(vectors)
                            .map(|(text, embedding)| EmbeddingVector {
                                text: text.clone(),
                                embedding,
                            }),
                    );
                }
                Err(err) => {
                    tracing::warn!("Embedding generation failed, using fallback vectors: {}", err);
                    results.extend(batch.iter().map(|text| degraded_embedding(text)));
                }
            }
        }

        results
    }

    async fn embed_query(&self, text: &str) -> Vec<f32> {
        let Some(api_key) = self.api_key.clone() else {
            return degraded_vector();
        };

        let input = vec![text.to_string()];
        match self.request_batch(&api_key, &input).await {
            Ok(mut vectors) => vectors.pop().unwrap_or_else(degraded_vector),
            Err(err) => {
                tracing::warn!("Query embedding failed, using fallback vector: {}", err);
                degraded_vector()
            }
        }
    }
}

/// Stand-in vector with components drawn uniformly from [-0.5, 0.5).
pub fn degraded_vector() -> Vec<f32> {
    let mut rng = rand::rng();
    (0..EMBEDDING_DIM)
        .map(|_| rng.random_range(-0.5f32..0.5f32))
        .collect()
}

fn degraded_embedding(text: &str) -> EmbeddingVector {
    EmbeddingVector {
        text: text.to_string(),
        embedding: degraded_vector(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    #[test]
    fn degraded_vectors_have_the_contract_dimension() {
        let vector = degraded_vector();
        assert_eq!(vector.len(), EMBEDDING_DIM);
        assert!(vector.iter().all(|v| (-0.5..0.5).contains(v)));
    }

    #[tokio::test]
    async fn unconfigured_embedder_falls_back_per_text() {
        let embedder = OpenAiEmbedder::new(&AppConfig::default());
        let texts = vec!["first".to_string(), "second".to_string()];

        let results = embedder.embed_batch(&texts).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "first");
        assert_eq!(results[1].text, "second");
        assert!(results.iter().all(|r| r.embedding.len() == EMBEDDING_DIM));
    }

    #[tokio::test]
    async fn unconfigured_query_embedding_is_degraded() {
        let embedder = OpenAiEmbedder::new(&AppConfig::default());
        let vector = embedder.embed_query("what is rust").await;
        assert_eq!(vector.len(), EMBEDDING_DIM);
    }
}
