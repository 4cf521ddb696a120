use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::ApiError;
use crate::llm::provider::LlmProvider;
use crate::tools::search::Source;

const INFERENCE_MODEL: &str = "microsoft/DialoGPT-small";

/// Last-resort text generation through the hosted inference API.
pub struct HuggingFaceProvider {
    client: Client,
    api_token: String,
}

impl HuggingFaceProvider {
    pub fn new(api_token: String) -> Self {
        Self {
            client: Client::new(),
            api_token,
        }
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(10)
    }

    async fn attempt(
        &self,
        query: &str,
        context: &str,
        _sources: &[Source],
    ) -> Result<String, ApiError> {
        let url = format!(
            "https://api-inference.huggingface.co/models/{}",
            INFERENCE_MODEL
        );

        let body = json!({
            "inputs": format!("Context: {}\n\nQuestion: {}\n\nAnswer:", context, query),
            "parameters": {
                "max_new_tokens": 100,
                "temperature": 0.5,
                "do_sample": true,
                "return_full_text": false,
            }
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "Hugging Face error: {}",
                text
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::internal)?;
        let content = payload[0]["generated_text"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}
