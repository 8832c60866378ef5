//! Per-kind model selection and request-level overrides.

use serde::{Deserialize, Serialize};
use storycrafter_core::ArtifactKind;

use crate::factory::ProviderKind;

pub const DEFAULT_PROVIDER: &str = "gemini";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Provider/model pair backing one artifact kind.
///
/// The provider stays a free string here so an unknown name is reported as
/// `UnsupportedProvider` when the invoker is built, not while parsing config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSelection {
    pub provider: String,
    pub model: String,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ModelSelection {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    /// Applies an override field by field.
    ///
    /// Switching provider without naming a model picks that provider's
    /// default model instead of carrying over a model it cannot serve.
    pub fn merged(&self, over: &ModelOverride) -> ModelSelection {
        let provider = over
            .provider
            .clone()
            .unwrap_or_else(|| self.provider.clone());

        let model = match (&over.model, &over.provider) {
            (Some(model), _) => model.clone(),
            (None, Some(p)) if !p.eq_ignore_ascii_case(&self.provider) => p
                .parse::<ProviderKind>()
                .map(|kind| kind.default_model().to_string())
                .unwrap_or_else(|_| self.model.clone()),
            (None, _) => self.model.clone(),
        };

        ModelSelection { provider, model }
    }
}

/// Partial selection supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverride {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// The `llm_config` object of a generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub description: Option<ModelOverride>,
    #[serde(default)]
    pub story: Option<ModelOverride>,
    #[serde(default)]
    pub test_cases: Option<ModelOverride>,
}

impl LlmConfig {
    pub fn get(&self, kind: ArtifactKind) -> Option<&ModelOverride> {
        match kind {
            ArtifactKind::Description => self.description.as_ref(),
            ArtifactKind::Story => self.story.as_ref(),
            ArtifactKind::TestCases => self.test_cases.as_ref(),
        }
    }
}

/// Service-wide generation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub description: ModelSelection,
    pub story: ModelSelection,
    pub test_cases: ModelSelection,
    /// Run the requested kinds concurrently instead of one after another
    pub concurrent: bool,
}

impl GenerationSettings {
    pub fn selection(&self, kind: ArtifactKind) -> &ModelSelection {
        match kind {
            ArtifactKind::Description => &self.description,
            ArtifactKind::Story => &self.story,
            ArtifactKind::TestCases => &self.test_cases,
        }
    }

    /// Effective selection for a kind once request overrides are applied.
    pub fn resolve(&self, kind: ArtifactKind, overrides: Option<&LlmConfig>) -> ModelSelection {
        let base = self.selection(kind);
        match overrides.and_then(|o| o.get(kind)) {
            Some(over) => base.merged(over),
            None => base.clone(),
        }
    }

    /// Uses one selection for every kind.
    pub fn with_all(selection: ModelSelection) -> Self {
        Self {
            description: selection.clone(),
            story: selection.clone(),
            test_cases: selection,
            concurrent: false,
        }
    }

    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }
}
