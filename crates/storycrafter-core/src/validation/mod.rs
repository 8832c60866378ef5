//! Structural validation of model output.
//!
//! One validator per [`ArtifactKind`]. Every validator is a pure, total
//! function over text: malformed input never panics, it only accumulates
//! reasons. Reasons are ordered by rule so repeated runs over the same text
//! produce identical reports.

mod description;
mod story;
mod test_cases;

pub use description::validate_description;
pub use story::validate_story;
pub use test_cases::{normalize_test_cases, validate_test_cases, GHERKIN_FENCE_CLOSE, GHERKIN_FENCE_OPEN};

use serde::{Deserialize, Serialize};

use crate::types::ArtifactKind;

/// Outcome of validating one artifact text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub reasons: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn from_reasons(reasons: Vec<String>) -> Self {
        Self {
            ok: reasons.is_empty(),
            reasons,
        }
    }

    /// Reasons joined the way they are quoted back to the model.
    pub fn joined(&self) -> String {
        self.reasons.join("; ")
    }
}

/// Run the validator matching `kind`.
pub fn validate(kind: ArtifactKind, text: &str) -> ValidationReport {
    match kind {
        ArtifactKind::Description => validate_description(text),
        ArtifactKind::Story => validate_story(text),
        ArtifactKind::TestCases => validate_test_cases(text),
    }
}

/// Normalization applied to raw model output before validation.
pub fn normalize(kind: ArtifactKind, text: &str) -> String {
    match kind {
        ArtifactKind::TestCases => normalize_test_cases(text),
        _ => text.to_string(),
    }
}
