//! Entity Resolution.
//!
//! Defines the `EntityIdentifier` trait that abstracts the identification
//! backend (an LLM, a fuzzy index, or a hand-curated table — the engine does
//! not care) and the `Resolver` policy layer that turns raw candidates into
//! at most one accepted `ResolvedEntity` per leg.
//!
//! Policy:
//! - candidates ordered by score descending, ties broken by smaller edit
//!   distance to the source text, then lexicographic name, for determinism
//! - a candidate below the ambiguity threshold is never accepted; the leg is
//!   later rejected for an unclear subject
//! - identifier failures count as zero candidates, never a request failure

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::models::{EntityKind, ResolvedEntity, Sport};

pub mod index;

/// One identification candidate from the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub kind: EntityKind,
    /// Backend confidence in [0, 1]; values outside are clamped.
    pub score: f64,
    pub sport: Option<Sport>,
    pub team: Option<String>,
    pub event_id: Option<String>,
    #[serde(default)]
    pub external_factors: Vec<String>,
}

/// Pluggable identification capability.
///
/// Implementations may call out to an LLM or search a local index; the
/// resolver only consumes their candidate lists. OCR-style name correction
/// ("J. Hurts" -> "Jalen Hurts") is the backend's responsibility.
#[async_trait]
pub trait EntityIdentifier: Send + Sync {
    /// Identify player/team candidates mentioned in `text`.
    async fn identify(&self, text: &str) -> Result<Vec<Candidate>>;

    /// Backend name for logging and debugging.
    fn identifier_name(&self) -> &str;
}

/// Threshold policy over an identification backend.
#[derive(Debug, Clone)]
pub struct Resolver {
    ambiguity_threshold: f64,
}

impl Resolver {
    pub fn new(ambiguity_threshold: f64) -> Self {
        Self {
            ambiguity_threshold,
        }
    }

    /// Resolve the subject of one leg candidate, or None when nothing clears
    /// the ambiguity threshold.
    pub async fn resolve(
        &self,
        identifier: &dyn EntityIdentifier,
        text: &str,
    ) -> Option<ResolvedEntity> {
        let mut candidates = match identifier.identify(text).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    "identifier {} failed for {:?}: {err:#}",
                    identifier.identifier_name(),
                    text
                );
                Vec::new()
            }
        };

        for candidate in &mut candidates {
            candidate.score = candidate.score.clamp(0.0, 1.0);
        }
        sort_candidates(&mut candidates, text);

        let best = candidates.into_iter().next()?;
        if best.score < self.ambiguity_threshold {
            return None;
        }

        Some(ResolvedEntity {
            kind: best.kind,
            canonical_name: best.name,
            source_span: text.to_string(),
            confidence: best.score,
            sport: best.sport,
            team: best.team,
            event_id: best.event_id,
            external_factors: best.external_factors,
        })
    }
}

/// Deterministic candidate ordering: score desc, then edit distance to the
/// source text asc, then canonical name.
fn sort_candidates(candidates: &mut [Candidate], text: &str) {
    let lower = text.to_lowercase();
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| {
                levenshtein(&a.name.to_lowercase(), &lower)
                    .cmp(&levenshtein(&b.name.to_lowercase(), &lower))
            })
            .then_with(|| a.name.cmp(&b.name))
    });
}
