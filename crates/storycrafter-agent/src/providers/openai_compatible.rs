use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::{http_client, read_json, send_error, usable_text};
use crate::error::Result;
use crate::invoker::ModelInvoker;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Client for OpenAI and any endpoint speaking the chat-completions protocol.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    pub name: String,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    headers: HashMap<String, String>,
    http_client: reqwest::Client,
}

impl OpenAICompatibleClient {
    pub fn new(
        name: impl Into<String>,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: super::DEFAULT_TEMPERATURE,
            max_tokens: super::DEFAULT_MAX_TOKENS,
            headers: HashMap::new(),
            http_client: http_client(super::DEFAULT_TIMEOUT),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = http_client(timeout);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let mut builder = self
            .http_client
            .post(self.endpoint())
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }

        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(&self.name, e))?;

        let completion: ChatCompletionResponse = read_json(&self.name, response).await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        usable_text(&self.name, content)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait::async_trait]
impl ModelInvoker for OpenAICompatibleClient {
    fn label(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling chat completions");
        self.request_completion(prompt).await
    }
}
