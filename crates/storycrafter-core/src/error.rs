//! Error types for StoryCrafter Core
//!
//! This module defines the error types shared by the domain layer.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// A requirement was empty or whitespace only
    #[error("Requirement must not be empty")]
    EmptyRequirement,

    /// Generation mode string not recognised
    #[error("Unknown generation mode: {0} (expected all, description, story or test_cases)")]
    UnknownMode(String),

    /// Artifact kind string not recognised
    #[error("Unknown artifact kind: {0}")]
    UnknownArtifactKind(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
