//! Closed provider dispatch: provider name → concrete model invoker.
//!
//! Credentials are read once and injected into the [`ProviderFactory`];
//! nothing here consults process-global state at call time.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{GenerationError, Result};
use crate::invoker::ModelInvoker;
use crate::providers::anthropic::ANTHROPIC_BASE_URL;
use crate::providers::gemini::GEMINI_BASE_URL;
use crate::providers::openai_compatible::{OPENAI_BASE_URL, OPENROUTER_BASE_URL};
use crate::providers::{AnthropicClient, GeminiClient, OpenAICompatibleClient};
use crate::settings::ModelSelection;

/// Supported providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    OpenAI,
    OpenRouter,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAI,
        ProviderKind::OpenRouter,
        ProviderKind::Anthropic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::OpenRouter => "anthropic/claude-3.5-sonnet",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    fn api_key_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::OpenRouter => "OPENROUTER_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn base_url_var(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_BASE_URL",
            ProviderKind::OpenAI => "OPENAI_BASE_URL",
            ProviderKind::OpenRouter => "OPENROUTER_BASE_URL",
            ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => GEMINI_BASE_URL,
            ProviderKind::OpenAI => OPENAI_BASE_URL,
            ProviderKind::OpenRouter => OPENROUTER_BASE_URL,
            ProviderKind::Anthropic => ANTHROPIC_BASE_URL,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            _ => Err(GenerationError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// API keys and optional endpoint overrides, one slot per provider.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    keys: [Option<String>; 4],
    base_urls: [Option<String>; 4],
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let configured: Vec<&str> = ProviderKind::ALL
            .iter()
            .filter(|kind| self.api_key(**kind).is_some())
            .map(|kind| kind.as_str())
            .collect();
        f.debug_struct("ProviderCredentials")
            .field("configured", &configured)
            .finish()
    }
}

impl ProviderCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `*_API_KEY` and `*_BASE_URL` for every provider.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut credentials = Self::default();
        for kind in ProviderKind::ALL {
            let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
            credentials.keys[slot(kind)] = read(kind.api_key_var());
            credentials.base_urls[slot(kind)] = read(kind.base_url_var());
        }
        credentials
    }

    pub fn with_api_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        self.keys[slot(kind)] = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        self.base_urls[slot(kind)] = Some(url.into());
        self
    }

    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        self.keys[slot(kind)].as_deref()
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        self.base_urls[slot(kind)]
            .as_deref()
            .unwrap_or_else(|| kind.default_base_url())
    }

    /// Providers with a credential present.
    pub fn configured(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.api_key(*kind).is_some())
            .collect()
    }
}

fn slot(kind: ProviderKind) -> usize {
    match kind {
        ProviderKind::Gemini => 0,
        ProviderKind::OpenAI => 1,
        ProviderKind::OpenRouter => 2,
        ProviderKind::Anthropic => 3,
    }
}

/// Builds an invoker for a model selection.
///
/// Construction is where provider problems surface: an unknown provider name
/// yields `UnsupportedProvider`, a missing credential `ProviderUnavailable`.
pub trait InvokerFactory: Send + Sync + fmt::Debug {
    fn build(&self, selection: &ModelSelection) -> Result<Arc<dyn ModelInvoker>>;
}

/// Factory backed by real HTTP provider clients.
#[derive(Debug, Clone)]
pub struct ProviderFactory {
    credentials: ProviderCredentials,
}

impl ProviderFactory {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self { credentials }
    }

    pub fn credentials(&self) -> &ProviderCredentials {
        &self.credentials
    }
}

impl InvokerFactory for ProviderFactory {
    fn build(&self, selection: &ModelSelection) -> Result<Arc<dyn ModelInvoker>> {
        let kind: ProviderKind = selection.provider.parse()?;
        let api_key = self
            .credentials
            .api_key(kind)
            .ok_or_else(|| GenerationError::unavailable(kind.as_str()))?
            .to_string();
        let base_url = self.credentials.base_url(kind);
        let model = selection.model.as_str();

        tracing::debug!(provider = %kind, model, "Building model invoker");

        let invoker: Arc<dyn ModelInvoker> = match kind {
            ProviderKind::Gemini => {
                Arc::new(GeminiClient::new(api_key, model).with_base_url(base_url))
            }
            ProviderKind::OpenAI => Arc::new(OpenAICompatibleClient::new(
                format!("openai/{}", model),
                Some(api_key),
                base_url,
                model,
            )),
            ProviderKind::OpenRouter => Arc::new(
                OpenAICompatibleClient::new(
                    format!("openrouter/{}", model),
                    Some(api_key),
                    base_url,
                    model,
                )
                .with_header("HTTP-Referer", "https://github.com/storycrafter")
                .with_header("X-Title", "StoryCrafter"),
            ),
            ProviderKind::Anthropic => {
                Arc::new(AnthropicClient::new(api_key, model).with_base_url(base_url))
            }
        };

        Ok(invoker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Gemini".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!(" openrouter ".parse::<ProviderKind>().unwrap(), ProviderKind::OpenRouter);
        assert!(matches!(
            "cohere".parse::<ProviderKind>(),
            Err(GenerationError::UnsupportedProvider(name)) if name == "cohere"
        ));
    }

    #[test]
    fn test_credentials_from_lookup_skips_blank_values() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "  "),
            ("ANTHROPIC_BASE_URL", "http://localhost:9000"),
        ]
        .into_iter()
        .collect();

        let credentials = ProviderCredentials::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(credentials.api_key(ProviderKind::Gemini), Some("g-key"));
        assert_eq!(credentials.api_key(ProviderKind::OpenAI), None);
        assert_eq!(credentials.configured(), vec![ProviderKind::Gemini]);
        assert_eq!(credentials.base_url(ProviderKind::Anthropic), "http://localhost:9000");
        assert_eq!(credentials.base_url(ProviderKind::OpenRouter), OPENROUTER_BASE_URL);
    }

    #[test]
    fn test_debug_does_not_print_keys() {
        let credentials = ProviderCredentials::new().with_api_key(ProviderKind::OpenAI, "sk-secret");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("openai"));
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn test_missing_credential_is_unavailable() {
        let factory = ProviderFactory::new(ProviderCredentials::new());
        let err = factory.build(&ModelSelection::default()).unwrap_err();
        assert!(matches!(err, GenerationError::ProviderUnavailable { provider } if provider == "gemini"));
    }

    #[test]
    fn test_unknown_provider_fails_at_construction() {
        let factory = ProviderFactory::new(ProviderCredentials::new().with_api_key(ProviderKind::Gemini, "k"));
        let err = factory.build(&ModelSelection::new("mistral", "large")).unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedProvider(_)));
    }

    #[test]
    fn test_builds_labelled_invokers() {
        let credentials = ProviderKind::ALL
            .into_iter()
            .fold(ProviderCredentials::new(), |c, kind| c.with_api_key(kind, "k"));
        let factory = ProviderFactory::new(credentials);

        let invoker = factory.build(&ModelSelection::new("openrouter", "meta-llama/llama-3-70b")).unwrap();
        assert_eq!(invoker.label(), "openrouter/meta-llama/llama-3-70b");

        let invoker = factory.build(&ModelSelection::default()).unwrap();
        assert_eq!(invoker.label(), "gemini/gemini-2.5-flash");
    }
}
