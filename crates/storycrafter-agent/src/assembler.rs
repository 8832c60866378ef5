//! Artifact Assembler: runs the orchestrator for every requested kind and
//! collects the results into one bundle.
//!
//! Invokers for all requested kinds are built before any model call, so a
//! missing credential or unknown provider fails the request without network
//! traffic. Any orchestration failure aborts the whole assembly.

use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use storycrafter_core::{ArtifactBundle, ArtifactKind, GenerationMode, Requirement};
use tracing::info;

use crate::error::Result;
use crate::factory::InvokerFactory;
use crate::invoker::ModelInvoker;
use crate::orchestrator::{GenerationOrchestrator, GenerationResult};
use crate::settings::{GenerationSettings, LlmConfig};

/// Bundle plus the per-kind orchestration details behind it.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub bundle: ArtifactBundle,
    pub results: Vec<GenerationResult>,
}

#[derive(Debug, Clone)]
pub struct ArtifactAssembler {
    factory: Arc<dyn InvokerFactory>,
    settings: GenerationSettings,
    orchestrator: GenerationOrchestrator,
}

impl ArtifactAssembler {
    pub fn new(factory: Arc<dyn InvokerFactory>, settings: GenerationSettings) -> Self {
        Self {
            factory,
            settings,
            orchestrator: GenerationOrchestrator::new(),
        }
    }

    pub fn with_orchestrator(mut self, orchestrator: GenerationOrchestrator) -> Self {
        self.orchestrator = orchestrator;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Generates the requested kinds; unrequested kinds stay `None`.
    pub async fn assemble(
        &self,
        requirement: &Requirement,
        kinds: &[ArtifactKind],
        overrides: Option<&LlmConfig>,
    ) -> Result<ArtifactBundle> {
        Ok(self.assemble_detailed(requirement, kinds, overrides).await?.bundle)
    }

    pub async fn assemble_mode(
        &self,
        requirement: &Requirement,
        mode: GenerationMode,
        overrides: Option<&LlmConfig>,
    ) -> Result<ArtifactBundle> {
        self.assemble(requirement, &mode.kinds(), overrides).await
    }

    pub async fn assemble_detailed(
        &self,
        requirement: &Requirement,
        kinds: &[ArtifactKind],
        overrides: Option<&LlmConfig>,
    ) -> Result<Assembly> {
        // Dedupe and fix the order: Description, Story, TestCases.
        let kinds: BTreeSet<ArtifactKind> = kinds.iter().copied().collect();

        let mut plan: Vec<(ArtifactKind, Arc<dyn ModelInvoker>)> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let selection = self.settings.resolve(kind, overrides);
            plan.push((kind, self.factory.build(&selection)?));
        }

        info!(
            kinds = ?plan.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            concurrent = self.settings.concurrent,
            "Assembling artifacts"
        );

        let results = if self.settings.concurrent {
            try_join_all(plan.iter().map(|(kind, invoker)| {
                self.orchestrator.generate(invoker.as_ref(), requirement, *kind)
            }))
            .await?
        } else {
            let mut results = Vec::with_capacity(plan.len());
            for (kind, invoker) in &plan {
                results.push(
                    self.orchestrator
                        .generate(invoker.as_ref(), requirement, *kind)
                        .await?,
                );
            }
            results
        };

        let mut bundle = ArtifactBundle::new();
        for result in &results {
            bundle.set(result.kind, result.text.clone());
        }

        let repaired = results.iter().filter(|r| r.repaired).count();
        info!(generated = results.len(), repaired, "Assembly complete");

        Ok(Assembly { bundle, results })
    }
}
