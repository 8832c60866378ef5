//! Generation Orchestrator - Compose -> Invoke -> Validate -> Repair once
//!
//! One run per (requirement, kind). The state machine never loops:
//!
//! ```text
//! Start ──► Generated ──► ok ──────────────► Done(text₁)
//!                  └────► invalid ─► Repairing ─► Done(text₂ or text₁)
//! ```
//!
//! At most two model calls are made. The repaired text is not validated
//! again; a still-invalid repair is returned as the best available output.

use serde::Serialize;
use storycrafter_core::validation::{self, ValidationReport};
use storycrafter_core::{ArtifactKind, Requirement, TemplateRegistry};
use tracing::{debug, error, info, warn};

use crate::error::{GenerationError, Result};
use crate::invoker::ModelInvoker;

/// Outcome of one orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub kind: ArtifactKind,
    pub text: String,
    pub first_attempt_valid: bool,
    /// True when the repair call's text replaced the first attempt
    pub repaired: bool,
    pub first_attempt_reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOrchestrator {
    templates: TemplateRegistry,
}

impl GenerationOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: TemplateRegistry) -> Self {
        Self { templates }
    }

    /// First-attempt prompt: guardrails, template, section instruction, request.
    pub fn compose_prompt(&self, kind: ArtifactKind, requirement: &Requirement) -> String {
        format!(
            "{}\n\n{}\n\n{}\n\nUser Request: {}",
            self.templates.guardrails(),
            self.templates.template(kind),
            self.templates.section_instruction(kind),
            requirement
        )
    }

    /// Corrective prompt listing the failed checks of the first attempt.
    pub fn compose_repair_prompt(
        &self,
        kind: ArtifactKind,
        requirement: &Requirement,
        report: &ValidationReport,
    ) -> String {
        format!(
            "{}\n\nYour previous output failed these checks: {}\n\n\
             Rewrite the {} so that it follows this template exactly and passes every check.\n\n\
             {}\n\n{}\n\nUser Request: {}",
            self.templates.guardrails(),
            report.joined(),
            kind.section_name(),
            self.templates.template(kind),
            self.templates.section_instruction(kind),
            requirement
        )
    }

    /// Runs the pipeline for one kind against the given invoker.
    pub async fn generate(
        &self,
        invoker: &dyn ModelInvoker,
        requirement: &Requirement,
        kind: ArtifactKind,
    ) -> Result<GenerationResult> {
        let prompt = self.compose_prompt(kind, requirement);
        debug!(%kind, model = invoker.label(), prompt_len = prompt.len(), "Invoking model");

        let raw = invoker.generate(&prompt).await.map_err(|e| {
            error!(%kind, model = invoker.label(), error = %e, "Model call failed");
            e
        })?;
        let first = validation::normalize(kind, &raw);

        let report = validation::validate(kind, &first);
        if report.ok {
            info!(%kind, "Artifact passed validation on first attempt");
            return Ok(GenerationResult {
                kind,
                text: first,
                first_attempt_valid: true,
                repaired: false,
                first_attempt_reasons: Vec::new(),
            });
        }

        warn!(
            %kind,
            failed_checks = report.reasons.len(),
            reasons = %report.joined(),
            "Artifact failed validation, requesting repair"
        );

        let repair_prompt = self.compose_repair_prompt(kind, requirement, &report);
        // An empty repair completion falls back to the first attempt below
        let repaired = match invoker.generate(&repair_prompt).await {
            Ok(text) => text,
            Err(GenerationError::EmptyCompletion { .. }) => String::new(),
            Err(e) => {
                error!(%kind, model = invoker.label(), error = %e, "Repair call failed");
                return Err(e);
            }
        };

        let (text, repaired) = if repaired.trim().is_empty() {
            warn!(%kind, "Repair returned no text, keeping first attempt");
            (first, false)
        } else {
            (validation::normalize(kind, &repaired), true)
        };

        Ok(GenerationResult {
            kind,
            text,
            first_attempt_valid: false,
            repaired,
            first_attempt_reasons: report.reasons,
        })
    }
}
