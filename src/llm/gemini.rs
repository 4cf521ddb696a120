use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::llm::prompts;
use crate::llm::provider::LlmProvider;
use crate::tools::search::Source;

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(12)
    }

    async fn attempt(
        &self,
        query: &str,
        context: &str,
        _sources: &[Source],
    ) -> Result<String, ApiError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let block_medium = |category: &str| {
            json!({ "category": category, "threshold": "BLOCK_MEDIUM_AND_ABOVE" })
        };
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompts::combined_prompt(query, context) } ] }
            ],
            "generationConfig": {
                "temperature": 0.7,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": 2048,
            },
            "safetySettings": [
                block_medium("HARM_CATEGORY_HARASSMENT"),
                block_medium("HARM_CATEGORY_HATE_SPEECH"),
                block_medium("HARM_CATEGORY_SEXUALLY_EXPLICIT"),
                block_medium("HARM_CATEGORY_DANGEROUS_CONTENT"),
            ],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Gemini error: {}", text)));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        let content = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}
