//! Correlation Engine.
//!
//! Detects pairwise relationships across the Valid legs of one request and
//! folds them into a single group independence multiplier in (0, 1]:
//! - legs in the same event: x0.9 per pair
//! - legs in the same market family: x0.8 per pair, stacking with the
//!   same-event penalty when both apply
//! - legs sharing an external situational factor: x0.95 per pair
//!
//! Penalties combine multiplicatively over the detected edge set, so the
//! result is invariant under leg reordering, and the multiplier is floored to
//! keep large parlays from compounding toward zero.

use crate::config::AnalysisConfig;
use crate::models::{BetLeg, CorrelationEdge, CorrelationKind};

/// Detect every pairwise relationship among the legs. Edge indices refer to
/// positions in `legs`; pairs are visited in canonical (i < j) order, so the
/// edge set depends only on the set of legs.
pub fn detect_edges(legs: &[BetLeg], config: &AnalysisConfig) -> Vec<CorrelationEdge> {
    let mut edges = Vec::new();

    for i in 0..legs.len() {
        for j in (i + 1)..legs.len() {
            let (a, b) = (&legs[i], &legs[j]);

            let same_event = match (&a.event_id, &b.event_id) {
                (Some(ea), Some(eb)) => ea == eb,
                _ => false,
            };

            if same_event {
                edges.push(CorrelationEdge {
                    leg_a: i,
                    leg_b: j,
                    kind: CorrelationKind::SameEvent,
                    penalty: config.same_event_penalty,
                });
            }

            // Family correlation holds across games too (two totals in
            // different games still move with the same scoring environment).
            if a.market.family() == b.market.family() {
                edges.push(CorrelationEdge {
                    leg_a: i,
                    leg_b: j,
                    kind: CorrelationKind::SameMarketFamily,
                    penalty: config.same_family_penalty,
                });
            }

            let shares_factor = a
                .external_factors
                .iter()
                .any(|f| b.external_factors.contains(f));
            if shares_factor {
                edges.push(CorrelationEdge {
                    leg_a: i,
                    leg_b: j,
                    kind: CorrelationKind::SharedExternalFactor,
                    penalty: config.shared_factor_penalty,
                });
            }
        }
    }

    edges
}

/// Combine detected edges into the group independence multiplier.
/// 1.0 when no relationships exist; never below the configured floor.
pub fn independence_multiplier(edges: &[CorrelationEdge], config: &AnalysisConfig) -> f64 {
    let product: f64 = edges.iter().map(|e| e.penalty).product();
    product.max(config.correlation_floor)
}
