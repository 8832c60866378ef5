pub mod anthropic;
pub mod gemini;
pub mod openai_compatible;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai_compatible::OpenAICompatibleClient;

use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{GenerationError, Result};

pub(crate) const DEFAULT_TEMPERATURE: f64 = 0.3;
pub(crate) const DEFAULT_MAX_TOKENS: u32 = 4096;
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, ?timeout, "HTTP client build failed, falling back to defaults without timeout");
            reqwest::Client::default()
        }
    }
}

/// Checks the status and decodes the body of a provider response.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(GenerationError::provider(
            provider,
            format!("API error ({}): {}", status, error_text),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GenerationError::provider(provider, format!("failed to parse response: {}", e)))
}

/// Rejects completions with no usable text.
pub(crate) fn usable_text(provider: &str, text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(GenerationError::empty(provider));
    }
    Ok(text)
}

pub(crate) fn send_error(provider: &str, error: reqwest::Error) -> GenerationError {
    GenerationError::provider(provider, format!("request failed: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_text_rejects_whitespace() {
        assert!(matches!(
            usable_text("gemini", "  \n".to_string()),
            Err(GenerationError::EmptyCompletion { .. })
        ));
        assert_eq!(usable_text("gemini", "ok".to_string()).unwrap(), "ok");
    }
}
