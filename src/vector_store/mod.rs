//! Vector storage backends behind a single trait.
//!
//! Two interchangeable implementations exist: a Pinecone-backed
//! persistent index and a capacity-bounded in-process store. The
//! `FallbackVectorStore` wrapper prefers the persistent backend when
//! configured and silently degrades to the in-memory one on any error,
//! trading durability for availability.

pub mod memory;
pub mod pinecone;

pub use memory::InMemoryStore;
pub use pinecone::PineconeStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::embeddings::{Embedder, EmbeddingVector};

/// Provenance attached to a stored vector.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    pub url: String,
    pub title: String,
}

/// A vector plus its text and provenance, as held by a backend.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub embedding: Vec<f32>,
    pub text: String,
    pub url: String,
    pub title: String,
    pub stored_at_ms: i64,
}

/// A search hit: extracted text plus provenance and similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPassage {
    pub content: String,
    pub url: String,
    pub title: String,
    pub score: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store one document per (embedding, meta) pair; the two slices
    /// are parallel.
    async fn upsert(
        &self,
        embeddings: &[EmbeddingVector],
        meta: &[SourceMeta],
    ) -> Result<(), ApiError>;

    /// Top-K passages most similar to the query text, sorted by
    /// descending score.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedPassage>, ApiError>;

    /// Best-effort document count.
    async fn size(&self) -> usize;
}

pub struct FallbackVectorStore {
    persistent: Option<PineconeStore>,
    memory: InMemoryStore,
}

impl FallbackVectorStore {
    pub fn new(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Self {
        let persistent = PineconeStore::from_config(config, embedder.clone());
        if persistent.is_none() {
            tracing::info!("Pinecone not configured, using in-memory vector store");
        }
        Self {
            persistent,
            memory: InMemoryStore::new(embedder),
        }
    }
}

#[async_trait]
impl VectorStore for FallbackVectorStore {
    async fn upsert(
        &self,
        embeddings: &[EmbeddingVector],
        meta: &[SourceMeta],
    ) -> Result<(), ApiError> {
        if let Some(persistent) = &self.persistent {
            match persistent.upsert(embeddings, meta).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!("Vector DB storage error, falling back to memory: {}", err);
                }
            }
        }
        self.memory.upsert(embeddings, meta).await
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedPassage>, ApiError> {
        if let Some(persistent) = &self.persistent {
            match persistent.search(query, top_k).await {
                Ok(results) => return Ok(results),
                Err(err) => {
                    tracing::warn!("Vector DB search error, falling back to memory: {}", err);
                }
            }
        }
        self.memory.search(query, top_k).await
    }

    async fn size(&self) -> usize {
        if let Some(persistent) = &self.persistent {
            let size = persistent.size().await;
            if size > 0 {
                return size;
            }
        }
        self.memory.size().await
    }
}
