//! Model invoker: the single seam between the pipeline and a text model.

use crate::error::Result;

/// Sends one fully composed prompt to a model and returns its text.
///
/// Implementations perform no retries; transport failures and empty
/// completions surface as `GenerationError::ProviderError`.
#[async_trait::async_trait]
pub trait ModelInvoker: Send + Sync + std::fmt::Debug {
    /// Provider/model label used in logs and errors.
    fn label(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
