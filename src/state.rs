use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::crawler::{HttpFetcher, PageFetcher};
use crate::embeddings::{Embedder, OpenAiEmbedder};
use crate::llm::AnswerGenerator;
use crate::tools::search::{SearchProvider, WebSearchProvider};
use crate::vector_store::{FallbackVectorStore, VectorStore};

/// Shared application state handed to every route.
///
/// All components are constructed once from the startup configuration;
/// the vector store is the only long-lived mutable piece.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub search: Arc<dyn SearchProvider>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
    pub generator: Arc<AnswerGenerator>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let config = Arc::new(config);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(&config));
        let vector_store: Arc<dyn VectorStore> =
            Arc::new(FallbackVectorStore::new(&config, embedder.clone()));

        Arc::new(Self {
            search: Arc::new(WebSearchProvider::new(&config)),
            fetcher: Arc::new(HttpFetcher::new()),
            generator: Arc::new(AnswerGenerator::from_config(&config)),
            embedder,
            vector_store,
            config,
        })
    }
}
