//! Bounded in-process vector store.
//!
//! An append-only list capped at `CAPACITY` documents. Eviction keeps
//! the most recently stored entries and runs inside the same critical
//! section as the append, so concurrent upserts are serialized and a
//! reader never observes a partially applied batch. Search is a linear
//! cosine scan, acceptable because the store never exceeds 1000
//! entries.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::embeddings::{Embedder, EmbeddingVector};
use crate::vector_math;
use crate::vector_store::{RankedPassage, SourceMeta, StoredDocument, VectorStore};

pub const CAPACITY: usize = 1000;

pub struct InMemoryStore {
    embedder: Arc<dyn Embedder>,
    documents: Mutex<Vec<StoredDocument>>,
}

impl InMemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            documents: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn upsert(
        &self,
        embeddings: &[EmbeddingVector],
        meta: &[SourceMeta],
    ) -> Result<(), ApiError> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        let mut documents = self
            .documents
            .lock()
            .map_err(|_| ApiError::Internal("vector store lock poisoned".to_string()))?;

        for (index, embedding) in embeddings.iter().enumerate() {
            let source = meta.get(index);
            documents.push(StoredDocument {
                id: format!("doc-{}", Uuid::new_v4()),
                embedding: embedding.embedding.clone(),
                text: embedding.text.clone(),
                url: source.map(|m| m.url.clone()).unwrap_or_default(),
                title: source.map(|m| m.title.clone()).unwrap_or_default(),
                stored_at_ms: now_ms,
            });
        }

        if documents.len() > CAPACITY {
            // Stable sort, so equal timestamps keep insertion order and
            // the tail is always the most recently stored slice.
            documents.sort_by_key(|doc| doc.stored_at_ms);
            let split_at = documents.len() - CAPACITY;
            let keep = documents.split_off(split_at);
            *documents = keep;
        }

        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RankedPassage>, ApiError> {
        let query_embedding = self.embedder.embed_query(query).await;

        let documents = self
            .documents
            .lock()
            .map_err(|_| ApiError::Internal("vector store lock poisoned".to_string()))?;

        let mut results: Vec<RankedPassage> = documents
            .iter()
            .map(|doc| {
                let score = vector_math::cosine_similarity(&query_embedding, &doc.embedding)
                    .unwrap_or(f32::NAN);
                RankedPassage {
                    content: doc.text.clone(),
                    url: doc.url.clone(),
                    title: doc.title.clone(),
                    score,
                }
            })
            .collect();

        results.sort_by(|left, right| {
            vector_math::rank_score(right.score)
                .partial_cmp(&vector_math::rank_score(left.score))
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn size(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Vec<EmbeddingVector> {
            texts
                .iter()
                .map(|text| EmbeddingVector {
                    text: text.clone(),
                    embedding: self.vector.clone(),
                })
                .collect()
        }

        async fn embed_query(&self, _text: &str) -> Vec<f32> {
            self.vector.clone()
        }
    }

    fn store_with_query_vector(vector: Vec<f32>) -> InMemoryStore {
        InMemoryStore::new(Arc::new(FixedEmbedder { vector }))
    }

    fn embedding(text: &str, vector: Vec<f32>) -> EmbeddingVector {
        EmbeddingVector {
            text: text.to_string(),
            embedding: vector,
        }
    }

    fn meta(title: &str) -> SourceMeta {
        SourceMeta {
            url: format!("https://example.com/{title}"),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn eviction_keeps_the_most_recent_thousand() {
        let store = store_with_query_vector(vec![1.0, 0.0]);

        for i in 0..1200 {
            let docs = vec![embedding(&format!("doc-{i}"), vec![1.0, 0.0])];
            store.upsert(&docs, &[meta("page")]).await.expect("upsert");
        }

        assert_eq!(store.size().await, CAPACITY);

        let documents = store.documents.lock().expect("lock");
        assert!(documents.iter().all(|doc| {
            let index: usize = doc.text.trim_start_matches("doc-").parse().expect("index");
            index >= 200
        }));
    }

    #[tokio::test]
    async fn search_is_sorted_descending_and_bounded() {
        let store = store_with_query_vector(vec![1.0, 0.0]);
        let docs = vec![
            embedding("middle", vec![0.8, 0.2]),
            embedding("worst", vec![0.1, 0.9]),
            embedding("best", vec![1.0, 0.0]),
        ];
        let metas = vec![meta("a"), meta("b"), meta("c")];
        store.upsert(&docs, &metas).await.expect("upsert");

        let results = store.search("anything", 2).await.expect("search");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "best");
        assert_eq!(results[1].content, "middle");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn zero_vectors_rank_last() {
        let store = store_with_query_vector(vec![1.0, 0.0]);
        let docs = vec![
            embedding("empty", vec![0.0, 0.0]),
            embedding("aligned", vec![0.5, 0.5]),
        ];
        let metas = vec![meta("a"), meta("b")];
        store.upsert(&docs, &metas).await.expect("upsert");

        let results = store.search("anything", 10).await.expect("search");

        assert_eq!(results[0].content, "aligned");
        assert_eq!(results[1].content, "empty");
    }
}
