use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::llm::prompts;
use crate::llm::provider::LlmProvider;
use crate::tools::search::Source;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(15)
    }

    async fn attempt(
        &self,
        query: &str,
        context: &str,
        sources: &[Source],
    ) -> Result<String, ApiError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": prompts::system_prompt(query) },
                { "role": "user", "content": prompts::user_prompt(query, context, sources) }
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("OpenAI chat error: {}", text)));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}
