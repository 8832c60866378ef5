use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, read_json, send_error, usable_text};
use crate::error::Result;
use crate::invoker::ModelInvoker;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub name: String,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            name: format!("gemini/{}", model),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
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

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    async fn request_completion(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            }),
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(&self.name, e))?;

        let completion: GeminiResponse = read_json(&self.name, response).await?;

        let content = completion
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        usable_text(&self.name, content)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[async_trait::async_trait]
impl ModelInvoker for GeminiClient {
    fn label(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Calling Gemini");
        self.request_completion(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_joins_candidate_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "User Story:" }, { "text": " As a user" }] }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key".to_string(), "gemini-2.5-flash")
            .with_base_url(server.uri());
        let text = client.generate("prompt").await.unwrap();

        assert_eq!(text, "User Story: As a user");
    }

    #[tokio::test]
    async fn test_blocked_response_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("k".to_string(), "gemini-2.5-flash").with_base_url(server.uri());
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err, GenerationError::EmptyCompletion { .. }));
        assert!(err.is_provider_failure());
        assert!(err.to_string().contains("empty response"));
    }

    #[tokio::test]
    async fn test_http_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = GeminiClient::new("k".to_string(), "gemini-2.5-flash").with_base_url(server.uri());
        let err = client.generate("prompt").await.unwrap_err();

        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_timeout_applies_to_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(serde_json::json!({
                        "candidates": [{ "content": { "parts": [{ "text": "late" }] } }]
                    })),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new("k".to_string(), "gemini-2.5-flash")
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(100));
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err, GenerationError::ProviderError { ref message, .. } if message.contains("request failed")));
    }
}
