//! Canonical entity references used by resolution and the store contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a canonical record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An existing canonical record a free-text label may resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCandidate {
    pub id: RecordId,
    pub name: String,
}

impl EntityCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.into(),
        }
    }
}

/// Certainty of an entity resolution, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// No acceptable candidate; the caller creates a new entity.
    None,
    Medium,
    High,
    Exact,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::None => "none",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
            ConfidenceTier::Exact => "exact",
        }
    }
}

/// Result of resolving one label against a candidate list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMatch {
    /// Best candidate; `None` when the tier is [`ConfidenceTier::None`].
    pub candidate: Option<EntityCandidate>,
    pub score: u8,
    pub tier: ConfidenceTier,
}

impl EntityMatch {
    pub fn unmatched() -> Self {
        Self {
            candidate: None,
            score: 0,
            tier: ConfidenceTier::None,
        }
    }

    pub fn needs_creation(&self) -> bool {
        self.tier == ConfidenceTier::None
    }
}
