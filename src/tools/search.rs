use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;

const SERPAPI_TIMEOUT: Duration = Duration::from_secs(10);
const GOOGLE_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

/// Web search collaborator: returns candidate pages for a query.
///
/// May return fewer results than requested; an empty list is a valid
/// outcome and short-circuits the answer pipeline.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Source>, ApiError>;
}

pub struct WebSearchProvider {
    client: Client,
    serpapi_key: Option<String>,
    google_api_key: Option<String>,
    google_engine_id: Option<String>,
}

impl WebSearchProvider {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            serpapi_key: config.serpapi_key.clone(),
            google_api_key: config.google_search_api_key.clone(),
            google_engine_id: config.google_search_engine_id.clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for WebSearchProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Source>, ApiError> {
        if let Some(api_key) = &self.serpapi_key {
            match serpapi_search(&self.client, api_key, query, limit).await {
                Ok(results) if !results.is_empty() => return Ok(results),
                Ok(_) => tracing::info!("SerpAPI returned no results, trying fallback"),
                Err(err) => tracing::warn!("SerpAPI search failed: {}", err),
            }
        }

        if let (Some(api_key), Some(engine_id)) = (&self.google_api_key, &self.google_engine_id) {
            match google_search(&self.client, api_key, engine_id, query, limit).await {
                Ok(results) if !results.is_empty() => return Ok(results),
                Ok(_) => tracing::info!("Google search returned no results"),
                Err(err) => tracing::warn!("Google search failed: {}", err),
            }
        }

        Ok(mock_results(query, limit))
    }
}

async fn serpapi_search(
    client: &Client,
    api_key: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<Source>, ApiError> {
    let url = format!(
        "https://serpapi.com/search.json?q={}&num={}&hl=en&gl=us&api_key={}",
        urlencoding::encode(query),
        limit,
        api_key
    );

    let response = client
        .get(url)
        .timeout(SERPAPI_TIMEOUT)
        .send()
        .await
        .map_err(ApiError::internal)?;

    if !response.status().is_success() {
        return Err(ApiError::Internal(format!(
            "SerpAPI search failed: {}",
            response.status()
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::internal)?;
    if let Some(message) = payload.get("error").and_then(|v| v.as_str()) {
        return Err(ApiError::Internal(format!("SerpAPI error: {}", message)));
    }

    let items = payload
        .get("organic_results")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut results = Vec::new();
    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("link").and_then(|v| v.as_str()).unwrap_or("");
        let snippet = item.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
        if !title.is_empty() && !url.is_empty() {
            results.push(Source {
                title: title.to_string(),
                url: url.to_string(),
                snippet: snippet.to_string(),
                favicon: favicon_for(url),
            });
        }
    }

    Ok(results)
}

async fn google_search(
    client: &Client,
    api_key: &str,
    engine_id: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<Source>, ApiError> {
    let url = format!(
        "https://www.googleapis.com/customsearch/v1?key={}&cx={}&q={}&num={}",
        api_key,
        engine_id,
        urlencoding::encode(query),
        limit
    );

    let response = client
        .get(url)
        .timeout(GOOGLE_TIMEOUT)
        .send()
        .await
        .map_err(ApiError::internal)?;

    if !response.status().is_success() {
        return Err(ApiError::Internal(format!(
            "Google search failed: {}",
            response.status()
        )));
    }

    let payload: Value = response.json().await.map_err(ApiError::internal)?;
    let items = payload
        .get("items")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut results = Vec::new();
    for item in items {
        let title = item.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("link").and_then(|v| v.as_str()).unwrap_or("");
        let snippet = item.get("snippet").and_then(|v| v.as_str()).unwrap_or("");
        if !title.is_empty() && !url.is_empty() {
            results.push(Source {
                title: title.to_string(),
                url: url.to_string(),
                snippet: snippet.to_string(),
                favicon: favicon_for(url),
            });
        }
    }

    Ok(results)
}

// Demo results shown when no search credentials are configured.
fn mock_results(query: &str, limit: usize) -> Vec<Source> {
    let mut results = vec![
        Source {
            title: format!("Search Results for \"{}\"", query),
            url: "https://example.com".to_string(),
            snippet: format!(
                "This is a demo result for your search query: \"{}\". Please configure your API keys to get real search results.",
                query
            ),
            favicon: favicon_for("https://example.com"),
        },
        Source {
            title: "Configure API Keys".to_string(),
            url: "https://docs.example.com/setup".to_string(),
            snippet: "To get real search results, please add your SERPAPI_KEY, OPENAI_API_KEY, and other required API keys to the environment.".to_string(),
            favicon: favicon_for("https://docs.example.com/setup"),
        },
    ];
    results.truncate(limit);
    results
}

fn favicon_for(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(format!(
        "https://www.google.com/s2/favicons?domain={}",
        host
    ))
}
