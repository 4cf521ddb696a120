//! Pinecone-backed persistent vector store.
//!
//! Talks to a serverless index over its REST endpoint. Requires both
//! the API key and index host to be configured; otherwise the caller
//! routes everything to the in-memory backend.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::embeddings::{Embedder, EmbeddingVector};
use crate::vector_store::{RankedPassage, SourceMeta, VectorStore};

pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_host: String,
    embedder: Arc<dyn Embedder>,
}

impl PineconeStore {
    /// Built only when both the API key and index host are present.
    pub fn from_config(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Option<Self> {
        let api_key = config.pinecone_api_key.clone()?;
        let index_host = config.pinecone_index_host.clone()?;
        Some(Self {
            client: Client::new(),
            api_key,
            index_host: normalize_host(&index_host),
            embedder,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.index_host, path);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "Pinecone request failed ({}): {}",
                status, text
            )));
        }

        response.json().await.map_err(ApiError::internal)
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(
        &self,
        embeddings: &[EmbeddingVector],
        meta: &[SourceMeta],
    ) -> Result<(), ApiError> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        let vectors: Vec<Value> = embeddings
            .iter()
            .enumerate()
            .map(|(index, embedding)| {
                let source = meta.get(index);
                json!({
                    "id": format!("doc-{}", Uuid::new_v4()),
                    "values": embedding.embedding,
                    "metadata": {
                        "text": embedding.text,
                        "url": source.map(|m| m.url.as_str()).unwrap_or(""),
                        "title": source.map(|m| m.title.as_str()).unwrap_or(""),
                        "timestamp": now_ms,
                    }
                })
            })
            .collect();

        self.post("/vectors/upsert", json!({ "vectors": vectors }))
            .await?;
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedPassage>, ApiError> {
        let query_embedding = self.embedder.embed_query(query).await;

        let payload = self
            .post(
                "/query",
                json!({
                    "vector": query_embedding,
                    "topK": top_k,
                    "includeMetadata": true,
                }),
            )
            .await?;

        Ok(parse_matches(&payload))
    }

    async fn size(&self) -> usize {
        match self.post("/describe_index_stats", json!({})).await {
            Ok(payload) => payload
                .get("totalVectorCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as usize,
            Err(err) => {
                tracing::debug!("Pinecone stats unavailable: {}", err);
                0
            }
        }
    }
}

fn normalize_host(host: &str) -> String {
    let trimmed = host.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn parse_matches(payload: &Value) -> Vec<RankedPassage> {
    let Some(matches) = payload.get("matches").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    matches
        .iter()
        .map(|item| {
            let metadata = item.get("metadata");
            let field = |name: &str| {
                metadata
                    .and_then(|m| m.get(name))
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            RankedPassage {
                content: field("text"),
                url: field("url"),
                title: field("title"),
                score: item.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_normalized_to_https() {
        assert_eq!(
            normalize_host("my-index.svc.pinecone.io/"),
            "https://my-index.svc.pinecone.io"
        );
        assert_eq!(
            normalize_host("https://my-index.svc.pinecone.io"),
            "https://my-index.svc.pinecone.io"
        );
    }

    #[test]
    fn matches_are_parsed_with_metadata() {
        let payload = json!({
            "matches": [
                {
                    "id": "doc-1",
                    "score": 0.92,
                    "metadata": { "text": "passage", "url": "https://a.example", "title": "A" }
                },
                { "id": "doc-2", "score": 0.5 }
            ]
        });

        let passages = parse_matches(&payload);

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].content, "passage");
        assert_eq!(passages[0].title, "A");
        assert!((passages[0].score - 0.92).abs() < 1e-6);
        assert_eq!(passages[1].content, "");
    }

    #[test]
    fn missing_matches_field_is_empty() {
        assert!(parse_matches(&json!({})).is_empty());
    }
}
