//! StoryCrafter Agent - model invocation and artifact generation
//!
//! Turns a [`Requirement`](storycrafter_core::Requirement) into an
//! [`ArtifactBundle`](storycrafter_core::ArtifactBundle):
//!
//! - [`ModelInvoker`]: one prompt in, one text out (Gemini, OpenAI, OpenRouter, Anthropic)
//! - [`ProviderFactory`]: closed dispatch from a provider/model selection to an invoker
//! - [`GenerationOrchestrator`]: compose, invoke, validate and repair at most once
//! - [`ArtifactAssembler`]: one orchestration per requested kind, fail-fast
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storycrafter_agent::{ArtifactAssembler, GenerationSettings, ProviderCredentials, ProviderFactory};
//! use storycrafter_core::{GenerationMode, Requirement};
//!
//! # async fn run() -> storycrafter_agent::Result<()> {
//! let factory = ProviderFactory::new(ProviderCredentials::from_env());
//! let assembler = ArtifactAssembler::new(Arc::new(factory), GenerationSettings::default());
//!
//! let requirement = Requirement::new("Add a logout button to the dashboard")?;
//! let bundle = assembler.assemble_mode(&requirement, GenerationMode::Story, None).await?;
//! println!("{}", bundle.story.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod assembler;
pub mod error;
pub mod factory;
pub mod invoker;
pub mod mock;
pub mod orchestrator;
pub mod providers;
pub mod settings;

pub use assembler::{ArtifactAssembler, Assembly};
pub use error::{GenerationError, Result};
pub use factory::{InvokerFactory, ProviderCredentials, ProviderFactory, ProviderKind};
pub use invoker::ModelInvoker;
pub use orchestrator::{GenerationOrchestrator, GenerationResult};
pub use settings::{GenerationSettings, LlmConfig, ModelOverride, ModelSelection};
