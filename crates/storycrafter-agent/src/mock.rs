//! Scripted model invokers for tests and offline runs.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::error::{GenerationError, Result};
use crate::factory::{InvokerFactory, ProviderKind};
use crate::invoker::ModelInvoker;
use crate::settings::ModelSelection;

/// Replies with queued responses in order and records every prompt it sees.
#[derive(Debug)]
pub struct ScriptedInvoker {
    label: String,
    script: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful completion.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Ok(text.into()));
        self
    }

    /// Queues a provider failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        let error = GenerationError::provider(self.label.clone(), message);
        self.script.lock().push_back(Err(error));
        self
    }

    /// Queues a completion that came back with no text.
    pub fn empty(self) -> Self {
        let error = GenerationError::empty(self.label.clone());
        self.script.lock().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait::async_trait]
impl ModelInvoker for ScriptedInvoker {
    fn label(&self) -> &str {
        &self.label
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::provider(&self.label, "script exhausted")))
    }
}

/// Hands out scripted invokers keyed by model name.
///
/// Provider names are still checked, so unknown providers fail the same way
/// they do with [`crate::ProviderFactory`]; a model with no registered
/// invoker reports `ProviderUnavailable`.
#[derive(Debug, Default)]
pub struct ScriptedFactory {
    invokers: HashMap<String, Arc<ScriptedInvoker>>,
    builds: Mutex<Vec<ModelSelection>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoker(mut self, model: impl Into<String>, invoker: Arc<ScriptedInvoker>) -> Self {
        self.invokers.insert(model.into(), invoker);
        self
    }

    /// Selections passed to `build`, in order.
    pub fn builds(&self) -> Vec<ModelSelection> {
        self.builds.lock().clone()
    }
}

impl InvokerFactory for ScriptedFactory {
    fn build(&self, selection: &ModelSelection) -> Result<Arc<dyn ModelInvoker>> {
        let kind: ProviderKind = selection.provider.parse()?;
        self.builds.lock().push(selection.clone());

        match self.invokers.get(&selection.model) {
            Some(invoker) => Ok(invoker.clone() as Arc<dyn ModelInvoker>),
            None => Err(GenerationError::unavailable(kind.as_str())),
        }
    }
}
