//! StoryCrafter Core - domain layer for requirement-to-artifact generation
//!
//! StoryCrafter turns a product requirement into three backlog artifacts:
//! a feature description, a user story with acceptance criteria, and Gherkin
//! test cases. This crate holds everything that does not talk to a model:
//!
//! 1. **Types** (`types`): artifact kinds, requirements, generation modes, bundles
//! 2. **Templates** (`templates`): guardrail instructions and per-kind output templates
//! 3. **Validation** (`validation`): structural validators and test-case fence normalization
//! 4. **Storage** (`storage`): SQLite persistence for users, projects, chats and messages
//!
//! # Quick Start
//!
//! ```
//! use storycrafter_core::{validation, ArtifactKind, GenerationMode};
//!
//! let kinds = "story".parse::<GenerationMode>().unwrap().kinds();
//! assert_eq!(kinds, vec![ArtifactKind::Story]);
//!
//! let report = validation::validate(ArtifactKind::Story, "As a user");
//! assert!(!report.ok);
//! assert!(report.reasons.iter().any(|r| r.contains("User Story:")));
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, missing_debug_implementations, clippy::all)]

pub mod error;
pub mod storage;
pub mod templates;
pub mod types;
pub mod validation;

pub use error::{CoreError, Result};
pub use templates::{TemplateRegistry, DECLINE_MESSAGE};
pub use types::{ArtifactBundle, ArtifactKind, GenerationMode, Requirement};
pub use validation::ValidationReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
