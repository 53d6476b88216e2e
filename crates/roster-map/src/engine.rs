//! Mapping engine: one suggested [`ColumnMapping`] per source column.

use roster_model::{
    ColumnMapping, FieldType, MappingAction, ParsedTable, PipelineSettings, TargetFieldSpec,
    TargetTableSpec,
};

use crate::heuristics::{DATE_CONTENT, Hint, header_hints, looks_like_dates};
use crate::score::score;

/// Default confidence at which suggestions are bulk-accepted.
pub const DEFAULT_PROMOTE_THRESHOLD: u8 = 70;

/// Display bucket for a mapping confidence.
///
/// Presentational only; no pipeline decision depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfidenceBucket {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ConfidenceBucket {
    #[must_use]
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            90.. => Self::Excellent,
            70..=89 => Self::Good,
            50..=69 => Self::Fair,
            _ => Self::Poor,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }
}

/// Suggests a target field for every column of a parsed file.
#[derive(Debug, Clone)]
pub struct ColumnMappingEngine {
    sample_size: usize,
    min_confidence: u8,
}

impl Default for ColumnMappingEngine {
    fn default() -> Self {
        Self::from_settings(&PipelineSettings::default())
    }
}

impl ColumnMappingEngine {
    pub fn new(sample_size: usize, min_confidence: u8) -> Self {
        Self {
            sample_size,
            min_confidence,
        }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(settings.sample_size, settings.min_confidence)
    }

    /// Exactly one mapping per header, in header order.
    ///
    /// Each field scores `max(name similarity, heuristics)`; the best field
    /// wins with ties going to the field declared first. A column whose best
    /// score is 0 (or below the engine's minimum) is suggested as a skip.
    pub fn suggest(&self, table: &TargetTableSpec, parsed: &ParsedTable) -> Vec<ColumnMapping> {
        let mappings: Vec<ColumnMapping> = parsed
            .headers()
            .iter()
            .map(|header| {
                let samples = parsed.sample_values(header, self.sample_size);
                self.suggest_column(table, header, &samples)
            })
            .collect();

        let mapped = mappings.iter().filter(|m| !m.is_skip()).count();
        tracing::info!(
            table = %table.name,
            columns = mappings.len(),
            mapped,
            skipped = mappings.len() - mapped,
            "suggested column mappings"
        );
        mappings
    }

    /// Suggestion for a single column given up to `sample_size` non-blank samples.
    pub fn suggest_column(
        &self,
        table: &TargetTableSpec,
        header: &str,
        samples: &[&str],
    ) -> ColumnMapping {
        let hints = header_hints(table, header);
        let dates = looks_like_dates(samples);

        let mut best: Option<(&TargetFieldSpec, u8)> = None;
        for field in &table.fields {
            let confidence = field_score(field, header, &hints, dates);
            if best.is_none_or(|(_, top)| confidence > top) {
                best = Some((field, confidence));
            }
        }

        match best {
            Some((field, confidence)) if confidence > 0 && confidence >= self.min_confidence => {
                tracing::debug!(
                    column = header,
                    field = %field.name,
                    confidence,
                    "column matched"
                );
                ColumnMapping::map(header, &table.name, &field.name, confidence)
            }
            _ => {
                tracing::debug!(column = header, "no field matched, skipping column");
                ColumnMapping::skip(header, &table.name)
            }
        }
    }
}

fn field_score(field: &TargetFieldSpec, header: &str, hints: &[Hint], dates: bool) -> u8 {
    let mut confidence = score(header, &field.name);
    for hint in hints.iter().filter(|h| h.field == field.name) {
        confidence = confidence.max(hint.score);
    }
    if dates && field.field_type == FieldType::Date {
        confidence = confidence.max(DATE_CONTENT);
    }
    confidence.min(100)
}

/// Copy of `mappings` with every confident suggestion accepted as a map.
///
/// Mappings below `threshold`, `Create` mappings and mappings without a
/// target field are returned unchanged.
#[must_use]
pub fn auto_promote(mappings: &[ColumnMapping], threshold: u8) -> Vec<ColumnMapping> {
    mappings
        .iter()
        .map(|mapping| {
            let mut mapping = mapping.clone();
            if mapping.confidence >= threshold
                && mapping.action != MappingAction::Create
                && !mapping.target_field.is_empty()
            {
                mapping.action = MappingAction::Map;
                mapping.data_type = None;
            }
            mapping
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(ConfidenceBucket::from_confidence(100), ConfidenceBucket::Excellent);
        assert_eq!(ConfidenceBucket::from_confidence(90), ConfidenceBucket::Excellent);
        assert_eq!(ConfidenceBucket::from_confidence(89), ConfidenceBucket::Good);
        assert_eq!(ConfidenceBucket::from_confidence(70), ConfidenceBucket::Good);
        assert_eq!(ConfidenceBucket::from_confidence(50), ConfidenceBucket::Fair);
        assert_eq!(ConfidenceBucket::from_confidence(49), ConfidenceBucket::Poor);
        assert_eq!(ConfidenceBucket::from_confidence(0).label(), "Poor");
    }

    #[test]
    fn auto_promote_leaves_create_alone() {
        let create = ColumnMapping::create("Shirt Size", "workers", FieldType::Text);
        let mut confident = create.clone();
        confident.confidence = 99;
        let promoted = auto_promote(&[confident.clone()], 70);
        assert_eq!(promoted[0], confident);
    }
}
