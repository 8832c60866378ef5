use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, read_json, send_error, usable_text};
use crate::error::Result;
use crate::invoker::ModelInvoker;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    pub name: String,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("anthropic/{}", model),
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
            model,
            temperature: super::DEFAULT_TEMPERATURE,
            max_tokens: super::DEFAULT_MAX_TOKENS,
            http_client: http_client(super::DEFAULT_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = http_client(timeout);
        self
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![MessageParam {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(&self.name, e))?;

        let completion: MessagesResponse = read_json(&self.name, response).await?;

        let content = completion
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("");

        usable_text(&self.name, content)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[async_trait::async_trait]
impl ModelInvoker for AnthropicClient {
    fn label(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Anthropic");
        self.request_completion(prompt).await
    }
}
