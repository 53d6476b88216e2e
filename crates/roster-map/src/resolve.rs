//! Free-text label resolution against existing canonical entities.

use std::cmp::Ordering;

use roster_model::{ConfidenceTier, EntityCandidate, EntityMatch, is_blank, normalize_label};

use crate::score::entity_score;

/// Scores for the resolution tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionThresholds {
    /// Minimum score for [`ConfidenceTier::High`] (default 80).
    pub high: u8,
    /// Minimum score for [`ConfidenceTier::Medium`] (default 50).
    pub medium: u8,
}

impl Default for ResolutionThresholds {
    fn default() -> Self {
        Self {
            high: 80,
            medium: 50,
        }
    }
}

/// Resolves labels such as an employer name typed into a spreadsheet.
///
/// A [`ConfidenceTier::None`] result means the caller should create a new
/// canonical entity rather than link to an existing one.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    thresholds: ResolutionThresholds,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ResolutionThresholds) -> Self {
        Self { thresholds }
    }

    /// Best candidate for `label`.
    ///
    /// Candidates are ranked by tier, then score, then shorter name, then
    /// lexical order of the name. Labels and names with no letters or digits
    /// never match.
    pub fn resolve(&self, label: &str, candidates: &[EntityCandidate]) -> EntityMatch {
        let wanted = normalize_label(label);
        if is_blank(label) || wanted.is_empty() {
            return EntityMatch::unmatched();
        }

        let best = candidates
            .iter()
            .map(|candidate| (candidate, normalize_label(&candidate.name)))
            .filter(|(candidate, name)| !is_blank(&candidate.name) && !name.is_empty())
            .map(|(candidate, name)| {
                let (score, tier) = if name == wanted {
                    (100, ConfidenceTier::Exact)
                } else {
                    let score = entity_score(label, &candidate.name);
                    (score, self.tier_for(score))
                };
                (candidate, score, tier)
            })
            .min_by(|a, b| rank(a, b));

        match best {
            Some((candidate, score, tier)) if tier != ConfidenceTier::None => {
                tracing::debug!(
                    label,
                    candidate = %candidate.id,
                    score,
                    tier = tier.as_str(),
                    "label resolved"
                );
                EntityMatch {
                    candidate: Some(candidate.clone()),
                    score,
                    tier,
                }
            }
            Some((_, score, _)) => EntityMatch {
                score,
                ..EntityMatch::unmatched()
            },
            None => EntityMatch::unmatched(),
        }
    }

    fn tier_for(&self, score: u8) -> ConfidenceTier {
        if score >= self.thresholds.high {
            ConfidenceTier::High
        } else if score >= self.thresholds.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::None
        }
    }
}

/// Best first.
fn rank(
    a: &(&EntityCandidate, u8, ConfidenceTier),
    b: &(&EntityCandidate, u8, ConfidenceTier),
) -> Ordering {
    b.2.cmp(&a.2)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| a.0.name.chars().count().cmp(&b.0.name.chars().count()))
        .then_with(|| a.0.name.cmp(&b.0.name))
}
