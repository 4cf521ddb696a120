//! Multi-provider answer generation.
//!
//! Providers are tried in configuration order, each under its own
//! timeout, and the first non-empty response wins. When every provider
//! fails (or none is configured) the generator still produces a
//! non-empty answer assembled from the gathered context and source
//! titles. The whole attempt runs under a global timeout so a wedged
//! provider can never hang the caller.

use std::sync::Arc;
use std::time::Duration;

use crate::core::config::AppConfig;
use crate::llm::gemini::GeminiProvider;
use crate::llm::huggingface::HuggingFaceProvider;
use crate::llm::openai::OpenAiProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::quick;
use crate::tools::search::Source;

pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

const MIN_CONTEXT_LEN: usize = 100;
const CONTEXT_EXCERPT_LEN: usize = 400;
const TIMEOUT_EXCERPT_LEN: usize = 300;
const MAX_LISTED_SOURCES: usize = 3;

pub struct AnswerGenerator {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl AnswerGenerator {
    /// Build the provider chain from whatever credentials are present.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

        if let Some(api_key) = &config.openai_api_key {
            providers.push(Arc::new(OpenAiProvider::new(
                api_key.clone(),
                config.chat_model.clone(),
                config.max_tokens,
                config.temperature,
            )));
        }
        if let Some(api_key) = &config.gemini_api_key {
            providers.push(Arc::new(GeminiProvider::new(
                api_key.clone(),
                config.gemini_model.clone(),
            )));
        }
        if let Some(api_token) = &config.huggingface_api_token {
            providers.push(Arc::new(HuggingFaceProvider::new(api_token.clone())));
        }

        if providers.is_empty() {
            tracing::info!("No LLM providers configured, fallback answers only");
        }

        Self { providers }
    }

    pub fn with_providers(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    pub async fn generate(&self, query: &str, context: &str, sources: &[Source]) -> String {
        match tokio::time::timeout(
            GENERATION_TIMEOUT,
            self.generate_inner(query, context, sources),
        )
        .await
        {
            Ok(answer) => answer,
            Err(_) => {
                tracing::error!(
                    "Response generation timed out after {:?}",
                    GENERATION_TIMEOUT
                );
                format!(
                    "I apologize, but I'm experiencing some technical difficulties right now. Here's what I found from the search results:\n\n{}...\n\nPlease try asking your question again, or check the sources below for more information.",
                    excerpt(context, TIMEOUT_EXCERPT_LEN)
                )
            }
        }
    }

    async fn generate_inner(&self, query: &str, context: &str, sources: &[Source]) -> String {
        if let Some(answer) = quick::quick_answer(query) {
            return answer;
        }

        let mut last_error: Option<String> = None;

        for provider in &self.providers {
            match tokio::time::timeout(
                provider.timeout(),
                provider.attempt(query, context, sources),
            )
            .await
            {
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    tracing::info!("{} response generated successfully", provider.name());
                    return text;
                }
                Ok(Ok(_)) => {
                    tracing::warn!("{} returned an empty response", provider.name());
                }
                Ok(Err(err)) => {
                    tracing::warn!("{} failed: {}", provider.name(), err);
                    last_error = Some(err.to_string());
                }
                Err(_) => {
                    tracing::warn!(
                        "{} timed out after {:?}",
                        provider.name(),
                        provider.timeout()
                    );
                    last_error = Some(format!("{} request timed out", provider.name()));
                }
            }
        }

        self.fallback_answer(query, context, sources, last_error)
    }

    /// Deterministic answer used when every provider is exhausted.
    fn fallback_answer(
        &self,
        query: &str,
        context: &str,
        sources: &[Source],
        last_error: Option<String>,
    ) -> String {
        if let Some(error) = &last_error {
            let lower = error.to_lowercase();
            if lower.contains("quota") || lower.contains("exceeded") {
                return format!(
                    "I'm currently experiencing high demand. Please try again in a few moments. Here's what I found from the search results:\n\n{}...\n\nPlease check the sources below for more detailed information.",
                    excerpt(context, CONTEXT_EXCERPT_LEN)
                );
            }
            if lower.contains("rate limit") {
                return "I'm currently experiencing high demand. Please try again in a few moments, or consider upgrading your API plan for better availability.".to_string();
            }
            if lower.contains("invalid") || lower.contains("credential") {
                return format!(
                    "I'm having some technical difficulties. Here's what I found from the search results:\n\n{}...\n\nPlease check the sources below for more information.",
                    excerpt(context, CONTEXT_EXCERPT_LEN)
                );
            }
        }

        if context.chars().count() > MIN_CONTEXT_LEN {
            let titles = sources
                .iter()
                .take(MAX_LISTED_SOURCES)
                .map(|source| format!("• {}", source.title))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "I found relevant information about \"{}\" from {} sources:\n\n{}...\n\n**Sources:**\n{}\n\nWould you like me to search for more specific information?",
                query,
                sources.len(),
                excerpt(context, CONTEXT_EXCERPT_LEN),
                titles
            )
        } else {
            format!(
                "I searched for \"{}\" but couldn't generate a detailed response right now. However, I found {} relevant sources that might help answer your question. Please try rephrasing your query or ask something more specific.",
                query,
                sources.len()
            )
        }
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ApiError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        name: &'static str,
        response: Result<String, String>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn ok(name: &'static str, text: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, message: &str) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Err(message.to_string()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for FixedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(200)
        }

        async fn attempt(
            &self,
            _query: &str,
            _context: &str,
            _sources: &[Source],
        ) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(ApiError::Internal(message.clone())),
            }
        }
    }

    struct SleepyProvider;

    #[async_trait]
    impl LlmProvider for SleepyProvider {
        fn name(&self) -> &'static str {
            "sleepy"
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(20)
        }

        async fn attempt(
            &self,
            _query: &str,
            _context: &str,
            _sources: &[Source],
        ) -> Result<String, ApiError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("too late".to_string())
        }
    }

    fn source(title: &str) -> Source {
        Source {
            title: title.to_string(),
            url: format!("https://example.com/{title}"),
            snippet: String::new(),
            favicon: None,
        }
    }

    fn long_context() -> String {
        "Rust is a systems programming language that runs blazingly fast and prevents segfaults. "
            .repeat(3)
    }

    #[tokio::test]
    async fn greetings_bypass_the_provider_chain() {
        let provider = FixedProvider::ok("openai", "should not be used");
        let providers: Vec<Arc<dyn LlmProvider>> = vec![provider.clone()];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator.generate("hello", "", &[]).await;

        assert!(answer.contains("Verixa AI"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn first_successful_provider_wins() {
        let first = FixedProvider::failing("openai", "connection refused");
        let second = FixedProvider::ok("gemini", "Rust is a language.");
        let providers: Vec<Arc<dyn LlmProvider>> = vec![first.clone(), second.clone()];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator
            .generate("what is rust", &long_context(), &[source("Rust Book")])
            .await;

        assert_eq!(answer, "Rust is a language.");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_responses_fall_through() {
        let empty = FixedProvider::ok("openai", "   ");
        let real = FixedProvider::ok("gemini", "An actual answer.");
        let providers: Vec<Arc<dyn LlmProvider>> = vec![empty, real];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator
            .generate("what is rust", &long_context(), &[source("Rust Book")])
            .await;

        assert_eq!(answer, "An actual answer.");
    }

    #[tokio::test]
    async fn slow_providers_are_timed_out_and_skipped() {
        let fallback = FixedProvider::ok("gemini", "Answer from the fast one.");
        let providers: Vec<Arc<dyn LlmProvider>> = vec![Arc::new(SleepyProvider), fallback];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator
            .generate("what is rust", &long_context(), &[source("Rust Book")])
            .await;

        assert_eq!(answer, "Answer from the fast one.");
    }

    #[tokio::test]
    async fn exhausted_chain_cites_sources() {
        let providers: Vec<Arc<dyn LlmProvider>> = vec![
            FixedProvider::failing("openai", "connection refused"),
            FixedProvider::failing("gemini", "connection refused"),
            FixedProvider::failing("huggingface", "connection refused"),
        ];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator
            .generate(
                "what is rust",
                &long_context(),
                &[source("Rust Book"), source("Rustonomicon")],
            )
            .await;

        assert!(!answer.trim().is_empty());
        assert!(answer.contains("Rust Book"));
    }

    #[tokio::test]
    async fn quota_errors_get_a_tailored_message() {
        let providers: Vec<Arc<dyn LlmProvider>> =
            vec![FixedProvider::failing("openai", "quota exceeded for this billing period")];
        let generator = AnswerGenerator::with_providers(providers);

        let answer = generator
            .generate("what is rust", &long_context(), &[source("Rust Book")])
            .await;

        assert!(answer.contains("high demand"));
    }

    #[tokio::test]
    async fn short_context_without_providers_gets_generic_fallback() {
        let generator = AnswerGenerator::with_providers(vec![]);

        let answer = generator
            .generate("obscure topic nobody wrote about", "tiny", &[source("A")])
            .await;

        assert!(answer.contains("couldn't generate a detailed response"));
    }
}
