//! Process configuration assembled once at startup.
//!
//! Every provider credential is optional: a missing key selects the
//! corresponding degraded path (mock search results, pseudo-random
//! embeddings, in-memory vector store, deterministic fallback answers)
//! instead of failing startup. Components receive this struct through
//! their constructors and never read the environment themselves.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SerpAPI key for Google web search.
    pub serpapi_key: Option<String>,
    /// Google Custom Search fallback credentials.
    pub google_search_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,

    /// OpenAI key, shared by the chat and embedding clients.
    pub openai_api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
    pub temperature: f32,

    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    pub huggingface_api_token: Option<String>,

    /// Pinecone index endpoint; both must be present to enable the
    /// persistent vector store backend.
    pub pinecone_api_key: Option<String>,
    pub pinecone_index_host: Option<String>,

    pub port: u16,
    pub log_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            serpapi_key: env_opt("SERPAPI_KEY"),
            google_search_api_key: env_opt("GOOGLE_SEARCH_API_KEY"),
            google_search_engine_id: env_opt("GOOGLE_SEARCH_ENGINE_ID"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            chat_model: env_or("CHAT_MODEL", "gpt-4o-mini"),
            embedding_model: env_or("EMBEDDING_MODEL", "text-embedding-ada-002"),
            max_tokens: env_parsed("MAX_TOKENS", 1500),
            temperature: env_parsed("TEMPERATURE", 0.3),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-flash"),
            huggingface_api_token: env_opt("HUGGINGFACE_API_TOKEN"),
            pinecone_api_key: env_opt("PINECONE_API_KEY"),
            pinecone_index_host: env_opt("PINECONE_INDEX_HOST"),
            port: env_parsed("PORT", 0),
            log_dir: env_opt("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            google_search_api_key: None,
            google_search_engine_id: None,
            openai_api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            max_tokens: 1500,
            temperature: 0.3,
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            huggingface_api_token: None,
            pinecone_api_key: None,
            pinecone_index_host: None,
            port: 0,
            log_dir: PathBuf::from("logs"),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}
