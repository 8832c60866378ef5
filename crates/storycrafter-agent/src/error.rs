//! Error types for model invocation and artifact generation

use storycrafter_core::CoreError;
use thiserror::Error;

/// Generation error type
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No credential configured for the selected provider
    #[error("Provider unavailable: no credential configured for {provider}")]
    ProviderUnavailable { provider: String },

    /// The provider call failed or returned no usable text
    #[error("Provider error from {provider}: {message}")]
    ProviderError { provider: String, message: String },

    /// The provider answered but the completion held no text
    #[error("Provider error from {provider}: empty response from model")]
    EmptyCompletion { provider: String },

    /// Provider name outside the supported set
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Request rejected before any model call
    #[error("Invalid generation request: {0}")]
    InvalidRequest(String),
}

impl GenerationError {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn empty(provider: impl Into<String>) -> Self {
        GenerationError::EmptyCompletion {
            provider: provider.into(),
        }
    }

    /// Provider-side failures, including completions with no text.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            GenerationError::ProviderError { .. } | GenerationError::EmptyCompletion { .. }
        )
    }

    pub fn unavailable(provider: impl Into<String>) -> Self {
        GenerationError::ProviderUnavailable {
            provider: provider.into(),
        }
    }
}

impl From<CoreError> for GenerationError {
    fn from(e: CoreError) -> Self {
        GenerationError::InvalidRequest(e.to_string())
    }
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, GenerationError>;
