//! The search-to-answer pipeline.
//!
//! Sequences web search, page fetching, embedding, vector storage and
//! ranking, context optimization, and answer generation. A cancellation
//! token is observed at every stage boundary; a cancelled request stops
//! immediately with a distinct status instead of running the remaining
//! stages.

use std::future::Future;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::context::optimize;
use crate::core::errors::ApiError;
use crate::crawler::FetchResult;
use crate::state::AppState;
use crate::tools::search::Source;
use crate::vector_store::{RankedPassage, SourceMeta};

/// Outer budget for answer generation, above the generator's own
/// global timeout.
pub const PIPELINE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(40);

const TOP_K: usize = 3;
const MIN_PASSAGE_LEN: usize = 50;
const OVERLOAD_EXCERPT_LEN: usize = 500;
const MAX_LISTED_SOURCES: usize = 3;

const ROUTE_GREETINGS: [&str; 6] = [
    "hi",
    "hello",
    "hey",
    "good morning",
    "good afternoon",
    "good evening",
];

#[derive(Debug, Clone, Serialize)]
pub struct SearchAnswer {
    pub response: String,
    pub sources: Vec<Source>,
}

pub async fn run_search_pipeline(
    state: &AppState,
    query: &str,
    max_results: usize,
    cancel: &CancellationToken,
) -> Result<SearchAnswer, ApiError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Query is required".to_string()));
    }

    if let Some(response) = simple_greeting(query) {
        return Ok(SearchAnswer {
            response,
            sources: Vec::new(),
        });
    }

    let search_results = match stage(cancel, state.search.search(query, max_results)).await? {
        Ok(results) => results,
        Err(err) => {
            tracing::warn!("Web search failed: {}", err);
            Vec::new()
        }
    };

    if search_results.is_empty() {
        return Ok(SearchAnswer {
            response: "I couldn't find any relevant information for your query. Please try rephrasing your question.".to_string(),
            sources: Vec::new(),
        });
    }

    let urls: Vec<String> = search_results.iter().map(|s| s.url.clone()).collect();
    let fetched = stage(cancel, state.fetcher.fetch_all(&urls)).await?;

    let valid: Vec<&FetchResult> = fetched.iter().filter(|f| f.is_ok()).collect();
    if valid.is_empty() {
        return Ok(SearchAnswer {
            response: "I found some relevant sources but couldn't access their content. Please try a different query.".to_string(),
            sources: search_results,
        });
    }

    let texts: Vec<String> = valid.iter().map(|f| f.content.clone()).collect();
    let embeddings = stage(cancel, state.embedder.embed_batch(&texts)).await?;

    let meta: Vec<SourceMeta> = valid
        .iter()
        .map(|f| SourceMeta {
            url: f.url.clone(),
            title: f.title.clone(),
        })
        .collect();
    if let Err(err) = state.vector_store.upsert(&embeddings, &meta).await {
        tracing::warn!("Vector store upsert failed: {}", err);
    }

    let passages = match state.vector_store.search(query, TOP_K).await {
        Ok(passages) => passages,
        Err(err) => {
            tracing::warn!("Vector search failed: {}", err);
            Vec::new()
        }
    };

    let relevant: Vec<RankedPassage> = passages
        .into_iter()
        .filter(|p| p.content.chars().count() > MIN_PASSAGE_LEN)
        .map(|p| {
            let optimized = optimize(&p.content, query);
            RankedPassage {
                content: optimized,
                url: p.url,
                title: p.title,
                score: p.score,
            }
        })
        .collect();

    let context = relevant
        .iter()
        .map(|p| format!("**{}**\n{}", p.title, p.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");
    let cited: Vec<Source> = relevant
        .iter()
        .map(|p| Source {
            title: p.title.clone(),
            url: p.url.clone(),
            snippet: String::new(),
            favicon: None,
        })
        .collect();

    let generation = tokio::time::timeout(
        PIPELINE_TIMEOUT,
        state.generator.generate(query, &context, &cited),
    );
    let response = match stage(cancel, generation).await? {
        Ok(response) => response,
        Err(_) => {
            tracing::error!("Answer generation exceeded the request budget");
            overloaded_answer(query, &context, &cited)
        }
    };

    Ok(SearchAnswer {
        response,
        sources: search_results,
    })
}

/// Run one stage unless the request has been cancelled; cancellation
/// during the stage aborts it immediately.
async fn stage<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = T>,
) -> Result<T, ApiError> {
    if cancel.is_cancelled() {
        return Err(ApiError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        output = fut => Ok(output),
    }
}

fn simple_greeting(query: &str) -> Option<String> {
    let lower = query.to_lowercase();
    if ROUTE_GREETINGS.contains(&lower.as_str()) {
        Some(
            "Hello! I'm Verixa AI, your intelligent search assistant. How can I help you today? 🤖✨"
                .to_string(),
        )
    } else {
        None
    }
}

fn overloaded_answer(query: &str, context: &str, sources: &[Source]) -> String {
    let excerpt: String = context.chars().take(OVERLOAD_EXCERPT_LEN).collect();
    let titles = sources
        .iter()
        .take(MAX_LISTED_SOURCES)
        .map(|source| format!("• {}", source.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "I found relevant information about \"{}\" but couldn't generate a complete response due to high server load. Here's what I found:\n\n{}...\n\n**Sources:**\n{}\n\nPlease try again in a moment.",
        query, excerpt, titles
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::core::config::AppConfig;
    use crate::crawler::PageFetcher;
    use crate::embeddings::{Embedder, EmbeddingVector};
    use crate::llm::{AnswerGenerator, LlmProvider};
    use crate::tools::search::SearchProvider;
    use crate::vector_store::InMemoryStore;

    struct MockSearch {
        results: Vec<Source>,
        calls: AtomicUsize,
    }

    impl MockSearch {
        fn with_results(results: Vec<Source>) -> Arc<Self> {
            Arc::new(Self {
                results,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchProvider for MockSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Source>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    struct MockFetcher {
        title: String,
        content: String,
        calls: AtomicUsize,
        cancel_after: Option<CancellationToken>,
    }

    impl MockFetcher {
        fn serving(title: &str, content: &str) -> Arc<Self> {
            Arc::new(Self {
                title: title.to_string(),
                content: content.to_string(),
                calls: AtomicUsize::new(0),
                cancel_after: None,
            })
        }

        fn cancelling(token: CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                title: "page".to_string(),
                content: "Plenty of page content that easily clears the passage length filter."
                    .to_string(),
                calls: AtomicUsize::new(0),
                cancel_after: Some(token),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch_all(&self, urls: &[String]) -> Vec<FetchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let results = urls
                .iter()
                .map(|url| FetchResult {
                    url: url.clone(),
                    title: self.title.clone(),
                    content: self.content.clone(),
                    error: None,
                })
                .collect();
            if let Some(token) = &self.cancel_after {
                token.cancel();
            }
            results
        }
    }

    struct CountingEmbedder {
        vector: Vec<f32>,
        batch_calls: AtomicUsize,
    }

    impl CountingEmbedder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                vector: vec![1.0, 0.0, 0.5, 0.25],
                batch_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Vec<EmbeddingVector> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
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

    struct FailingProvider(&'static str);

    #[async_trait]
    impl LlmProvider for FailingProvider {
        fn name(&self) -> &'static str {
            self.0
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }

        async fn attempt(
            &self,
            _query: &str,
            _context: &str,
            _sources: &[Source],
        ) -> Result<String, ApiError> {
            Err(ApiError::Internal("connection refused".to_string()))
        }
    }

    fn source(title: &str, url: &str) -> Source {
        Source {
            title: title.to_string(),
            url: url.to_string(),
            snippet: String::new(),
            favicon: None,
        }
    }

    fn test_state(
        search: Arc<MockSearch>,
        fetcher: Arc<MockFetcher>,
        embedder: Arc<CountingEmbedder>,
        providers: Vec<Arc<dyn LlmProvider>>,
    ) -> AppState {
        let search_dyn: Arc<dyn SearchProvider> = search;
        let fetcher_dyn: Arc<dyn PageFetcher> = fetcher;
        let embedder_dyn: Arc<dyn Embedder> = embedder;
        let vector_store: Arc<dyn crate::vector_store::VectorStore> =
            Arc::new(InMemoryStore::new(embedder_dyn.clone()));
        AppState {
            config: Arc::new(AppConfig::default()),
            search: search_dyn,
            fetcher: fetcher_dyn,
            vector_store,
            embedder: embedder_dyn,
            generator: Arc::new(AnswerGenerator::with_providers(providers)),
        }
    }

    #[tokio::test]
    async fn empty_queries_are_rejected() {
        let state = test_state(
            MockSearch::with_results(vec![]),
            MockFetcher::serving("t", "c"),
            CountingEmbedder::new(),
            vec![],
        );

        let result =
            run_search_pipeline(&state, "   ", 5, &CancellationToken::new()).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn greetings_short_circuit_before_search() {
        let search = MockSearch::with_results(vec![]);
        let state = test_state(
            search.clone(),
            MockFetcher::serving("t", "c"),
            CountingEmbedder::new(),
            vec![],
        );

        let answer = run_search_pipeline(&state, "hello", 5, &CancellationToken::new())
            .await
            .expect("pipeline");

        assert!(answer.response.contains("Verixa AI"));
        assert!(answer.sources.is_empty());
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_search_results_short_circuit_the_pipeline() {
        let search = MockSearch::with_results(vec![]);
        let fetcher = MockFetcher::serving("t", "c");
        let embedder = CountingEmbedder::new();
        let state = test_state(search.clone(), fetcher.clone(), embedder.clone(), vec![]);

        let answer = run_search_pipeline(
            &state,
            "something nobody ever wrote about",
            5,
            &CancellationToken::new(),
        )
        .await
        .expect("pipeline");

        assert!(answer
            .response
            .starts_with("I couldn't find any relevant information"));
        assert!(answer.sources.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn weather_answers_carry_structured_fields() {
        let search = MockSearch::with_results(vec![source(
            "Delhi Weather Today",
            "https://weather.example/delhi",
        )]);
        let fetcher = MockFetcher::serving(
            "Delhi Weather Today",
            "Temperature: 32°C, Humidity: 60%, sunny skies, wind 10 km/h, feels like 35°C in Delhi",
        );
        let state = test_state(search, fetcher, CountingEmbedder::new(), vec![]);

        let answer = run_search_pipeline(&state, "weather in Delhi", 5, &CancellationToken::new())
            .await
            .expect("pipeline");

        assert!(answer.response.contains("Weather in Delhi"));
        assert!(answer.response.contains("Temperature: 32"));
        assert!(answer.response.contains("Humidity: 60%"));
        assert_eq!(answer.sources.len(), 1);
    }

    #[tokio::test]
    async fn exhausted_providers_still_yield_an_answer_citing_sources() {
        let search = MockSearch::with_results(vec![source(
            "Rust Language Overview",
            "https://docs.example/rust",
        )]);
        let fetcher = MockFetcher::serving(
            "Rust Language Overview",
            "Rust is a systems programming language focused on safety, speed, and concurrency. \
             It achieves memory safety without a garbage collector through ownership rules.",
        );
        let providers: Vec<Arc<dyn LlmProvider>> = vec![
            Arc::new(FailingProvider("openai")),
            Arc::new(FailingProvider("gemini")),
            Arc::new(FailingProvider("huggingface")),
        ];
        let state = test_state(search, fetcher, CountingEmbedder::new(), providers);

        let answer = run_search_pipeline(&state, "what is rust", 5, &CancellationToken::new())
            .await
            .expect("pipeline");

        assert!(!answer.response.trim().is_empty());
        assert!(answer.response.contains("Rust Language Overview"));
    }

    #[tokio::test]
    async fn cancellation_between_fetch_and_embed_stops_the_pipeline() {
        let token = CancellationToken::new();
        let search = MockSearch::with_results(vec![source("Page", "https://a.example")]);
        let fetcher = MockFetcher::cancelling(token.clone());
        let embedder = CountingEmbedder::new();
        let state = test_state(search, fetcher.clone(), embedder.clone(), vec![]);

        let result = run_search_pipeline(&state, "what is rust", 5, &token).await;

        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 0);
    }
}
