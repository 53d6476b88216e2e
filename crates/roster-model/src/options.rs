//! Tunable settings for the import pipeline.

use serde::{Deserialize, Serialize};

/// Settings shared by mapping, validation, and import.
///
/// Every key is optional when deserialized; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Confidence at or above which suggestions are bulk-accepted.
    pub auto_promote_threshold: u8,
    /// Suggestions below this confidence are turned into skips (0 keeps all).
    pub min_confidence: u8,
    /// Non-empty sample values inspected per column by content heuristics.
    pub sample_size: usize,
    /// Rows validated between progress events.
    pub chunk_size: usize,
    /// Text longer than this raises a warning.
    pub max_text_length: usize,
    /// Characters kept from an overlong value in the issue report.
    pub truncate_to: usize,
    /// Undo entities created earlier in a record when a later step fails.
    pub compensate: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            auto_promote_threshold: 70,
            min_confidence: 0,
            sample_size: 5,
            chunk_size: 100,
            max_text_length: 255,
            truncate_to: 50,
            compensate: true,
        }
    }
}
