//! Page fetching with per-URL isolation.
//!
//! Every URL in a batch is fetched concurrently under its own timeout;
//! a failing or slow page never delays or aborts the others. Failures
//! are folded into the result as a per-URL error message instead of
//! propagating.

pub mod extract;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const NO_CONTENT_PLACEHOLDER: &str = "No content extracted";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Outcome of fetching a single URL. Exactly one of `content` and
/// `error` is populated: failures carry an error message and empty
/// content, successes carry extracted content (or the "No content
/// extracted" placeholder) and no error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub url: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    fn failure(url: &str, message: String) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            content: String::new(),
            error: Some(message),
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch every URL; the result list has the same length and order
    /// as the input.
    async fn fetch_all(&self, urls: &[String]) -> Vec<FetchResult>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn fetch_single(&self, url: &str) -> FetchResult {
        let html = match tokio::time::timeout(FETCH_TIMEOUT, self.request_html(url)).await {
            Ok(Ok(html)) => html,
            Ok(Err(err)) => {
                tracing::warn!("Error fetching {}: {}", url, err);
                return FetchResult::failure(url, format!("Failed to fetch {}: {}", url, err));
            }
            Err(_) => {
                return FetchResult::failure(
                    url,
                    format!(
                        "Request timed out: {} took longer than 10 seconds to respond",
                        url
                    ),
                );
            }
        };

        let extracted = extract::extract(&html);
        let title = if extracted.title.is_empty() {
            host_name(url)
        } else {
            extracted.title
        };
        let content = if extracted.content.is_empty() {
            NO_CONTENT_PLACEHOLDER.to_string()
        } else {
            extracted.content
        };

        FetchResult {
            url: url.to_string(),
            title,
            content,
            error: None,
        }
    }

    async fn request_html(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            return Err(ApiError::Internal(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(ApiError::internal)
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_all(&self, urls: &[String]) -> Vec<FetchResult> {
        join_all(urls.iter().map(|url| self.fetch_single(url))).await
    }
}

fn host_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| host.to_string()))
        .unwrap_or_else(|| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_urls_yield_error_results_in_order() {
        let fetcher = HttpFetcher::new();
        let urls = vec![
            "not a url at all".to_string(),
            "definitely::/broken".to_string(),
        ];

        let results = fetcher.fetch_all(&urls).await;

        assert_eq!(results.len(), urls.len());
        for (result, url) in results.iter().zip(&urls) {
            assert_eq!(&result.url, url);
            assert!(!result.is_ok());
            assert!(result.content.is_empty());
            assert!(!result.error.as_deref().unwrap_or("").is_empty());
        }
    }

    #[test]
    fn host_name_falls_back_to_the_raw_url() {
        assert_eq!(host_name("https://weather.example.com/delhi"), "weather.example.com");
        assert_eq!(host_name("garbage"), "garbage");
    }
}
