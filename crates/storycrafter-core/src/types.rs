//! Core domain types: artifact kinds, requirements, generation modes and bundles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// The three artifacts produced for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Description,
    Story,
    TestCases,
}

impl ArtifactKind {
    /// All kinds in bundle order.
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Description,
        ArtifactKind::Story,
        ArtifactKind::TestCases,
    ];

    /// Key used in the serialized bundle and in `llm_config` overrides.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Description => "description",
            ArtifactKind::Story => "story",
            ArtifactKind::TestCases => "test_cases",
        }
    }

    /// Human readable section name used in prompts.
    pub fn section_name(&self) -> &'static str {
        match self {
            ArtifactKind::Description => "Feature Description",
            ArtifactKind::Story => "User Story",
            ArtifactKind::TestCases => "Gherkin Test Cases",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "description" => Ok(ArtifactKind::Description),
            "story" => Ok(ArtifactKind::Story),
            "test_cases" | "testcases" => Ok(ArtifactKind::TestCases),
            other => Err(CoreError::UnknownArtifactKind(other.to_string())),
        }
    }
}

/// A caller-supplied product requirement, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Requirement(String);

impl Requirement {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyRequirement);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which artifacts a generation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    All,
    Description,
    Story,
    TestCases,
}

impl GenerationMode {
    /// Requested kinds in deterministic bundle order.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        match self {
            GenerationMode::All => ArtifactKind::ALL.to_vec(),
            GenerationMode::Description => vec![ArtifactKind::Description],
            GenerationMode::Story => vec![ArtifactKind::Story],
            GenerationMode::TestCases => vec![ArtifactKind::TestCases],
        }
    }
}

impl FromStr for GenerationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(GenerationMode::All),
            "description" => Ok(GenerationMode::Description),
            "story" => Ok(GenerationMode::Story),
            "test_cases" => Ok(GenerationMode::TestCases),
            other => Err(CoreError::UnknownMode(other.to_string())),
        }
    }
}

/// One AI turn: every kind is present, unrequested kinds are `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub description: Option<String>,
    pub story: Option<String>,
    pub test_cases: Option<String>,
}

impl ArtifactBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Description => self.description.as_deref(),
            ArtifactKind::Story => self.story.as_deref(),
            ArtifactKind::TestCases => self.test_cases.as_deref(),
        }
    }

    pub fn set(&mut self, kind: ArtifactKind, text: impl Into<String>) {
        let slot = match kind {
            ArtifactKind::Description => &mut self.description,
            ArtifactKind::Story => &mut self.story,
            ArtifactKind::TestCases => &mut self.test_cases,
        };
        *slot = Some(text.into());
    }

    /// Serialize as the JSON object text stored in a bot message.
    pub fn to_message_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_message_text(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
