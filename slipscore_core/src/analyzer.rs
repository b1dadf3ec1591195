//! Slip analysis pipeline.
//!
//! `SlipAnalyzer` wires the stages together: normalize -> resolve -> build &
//! validate -> (score legs, detect correlation) -> aggregate. Data flows
//! strictly forward and each request's working set is local, so concurrent
//! requests never interfere; per-leg resolution and context fetches run
//! concurrently since legs share no mutable state.

use std::sync::Arc;

use futures_util::future::join_all;
use log::{info, warn};

use crate::aggregate;
use crate::config::AnalysisConfig;
use crate::correlation;
use crate::error::AnalysisError;
use crate::leg::{LegBuilder, LegOutcome};
use crate::models::{BetLeg, GroupRecommendation, StatContext};
use crate::normalize;
use crate::providers::StatContextProvider;
use crate::resolve::{EntityIdentifier, Resolver};
use crate::scoring;
use crate::vocab::MarketVocabulary;

pub struct SlipAnalyzer {
    config: AnalysisConfig,
    identifier: Arc<dyn EntityIdentifier>,
    stats: Arc<dyn StatContextProvider>,
    vocabulary: MarketVocabulary,
    resolver: Resolver,
}

impl SlipAnalyzer {
    /// Build an analyzer. Configuration is validated here, before any
    /// request is processed.
    pub fn new(
        config: AnalysisConfig,
        identifier: Arc<dyn EntityIdentifier>,
        stats: Arc<dyn StatContextProvider>,
    ) -> Result<Self, AnalysisError> {
        config.validate()?;
        let resolver = Resolver::new(config.ambiguity_threshold);
        Ok(Self {
            config,
            identifier,
            stats,
            vocabulary: MarketVocabulary::default_book(),
            resolver,
        })
    }

    /// Replace the default market vocabulary (e.g. a book with different
    /// line windows).
    pub fn with_vocabulary(mut self, vocabulary: MarketVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    /// Analyze one slip. Never fails for a well-formed request: per-leg
    /// problems downgrade to skipped legs and the worst case is a Pass with
    /// explanatory factors.
    pub async fn analyze(&self, raw_text: &str) -> Result<GroupRecommendation, AnalysisError> {
        let candidates = normalize::split_legs(raw_text);
        if candidates.is_empty() {
            info!("no leg candidates found in input");
            return Ok(aggregate::aggregate(
                Vec::new(),
                1.0,
                Vec::new(),
                &self.config,
            ));
        }

        // Resolve every candidate's subject concurrently.
        let subjects = join_all(
            candidates
                .iter()
                .map(|c| self.resolver.resolve(self.identifier.as_ref(), &c.text)),
        )
        .await;

        let mut valid = Vec::new();
        let mut skipped = Vec::new();
        for (candidate, subject) in candidates.iter().zip(subjects) {
            let outcome = LegBuilder::from_candidate(&candidate.text)
                .with_subject(subject)
                .finish(&self.vocabulary);
            match outcome {
                LegOutcome::Valid(leg) => valid.push(leg),
                LegOutcome::Skipped(skip) => {
                    info!("skipping leg {:?} ({:?}): {}", skip.raw_text, skip.state, skip.reason);
                    skipped.push(skip);
                }
            }
        }

        // Fetch statistical context per leg concurrently; provider failures
        // degrade to "no data", never a request failure.
        let contexts = join_all(valid.iter().map(|leg| self.fetch_context(leg))).await;

        let pairs: Vec<(BetLeg, Option<StatContext>)> =
            valid.into_iter().zip(contexts).collect();
        let analyses = scoring::batch_score(&pairs, &self.config);

        // Correlation runs on exactly the leg set that was scored.
        let legs: Vec<BetLeg> = pairs.into_iter().map(|(leg, _)| leg).collect();
        let edges = correlation::detect_edges(&legs, &self.config);
        let multiplier = correlation::independence_multiplier(&edges, &self.config);

        Ok(aggregate::aggregate(analyses, multiplier, skipped, &self.config))
    }

    async fn fetch_context(&self, leg: &BetLeg) -> Option<StatContext> {
        match self
            .stats
            .context(&leg.subject.canonical_name, leg.market, leg.sport)
            .await
        {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(
                    "stat provider {} failed for {}: {err:#}",
                    self.stats.provider_name(),
                    leg.subject.canonical_name
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::models::{MarketKind, Recommendation, RiskLevel};
    use crate::providers::{FixtureStatProvider, NoStatProvider};
    use crate::resolve::index::RosterIndex;

    fn analyzer_with(
        identifier: RosterIndex,
        stats: FixtureStatProvider,
    ) -> SlipAnalyzer {
        SlipAnalyzer::new(
            AnalysisConfig::default(),
            Arc::new(identifier),
            Arc::new(stats),
        )
        .unwrap()
    }

    fn mahomes_context() -> FixtureStatProvider {
        FixtureStatProvider::new().with(
            "Patrick Mahomes",
            MarketKind::PassingYards,
            StatContext {
                historical_average: Some(270.0),
                std_dev: Some(30.0),
                recent_form: None,
            },
        )
    }

    #[tokio::test]
    async fn test_scenario_single_prop_with_context() {
        let analyzer = analyzer_with(RosterIndex::new(), mahomes_context());
        let result = analyzer
            .analyze("Patrick Mahomes over 280.5 passing yards -110")
            .await
            .unwrap();

        assert_eq!(result.leg_analyses.len(), 1);
        let leg = &result.leg_analyses[0];
        assert_eq!(leg.leg.subject.canonical_name, "Patrick Mahomes");
        assert!(leg.risk_level <= RiskLevel::Medium);
        // Positive raw EV must not be a Pass; negative may be
        if result.raw_ev > 0.0 {
            assert_ne!(result.recommendation, Recommendation::Pass);
        }
    }

    #[tokio::test]
    async fn test_scenario_unresolvable_subject_passes_with_explanation() {
        let analyzer = analyzer_with(RosterIndex::new(), FixtureStatProvider::new());
        let result = analyzer
            .analyze("mauinew susnura over 50 yards")
            .await
            .unwrap();

        assert!(result.leg_analyses.is_empty());
        assert_eq!(result.recommendation, Recommendation::Pass);
        assert!(result
            .key_factors
            .iter()
            .any(|f| f.contains("identify") || f.contains("market")));
        assert_eq!(result.skipped_legs.len(), 1);
    }

    #[tokio::test]
    async fn test_scenario_correlated_parlay_penalized_and_escalated() {
        let form = StatContext {
            historical_average: Some(250.0),
            std_dev: Some(30.0),
            recent_form: Some(vec![290.0, 300.0, 285.0, 310.0, 295.0]),
        };
        let td_form = StatContext {
            historical_average: Some(2.0),
            std_dev: Some(1.0),
            recent_form: Some(vec![3.0, 2.0, 3.0, 4.0, 3.0]),
        };
        let rec_form = StatContext {
            historical_average: Some(80.0),
            std_dev: Some(15.0),
            recent_form: Some(vec![85.0, 90.0, 88.0, 95.0, 82.0]),
        };
        let stats = FixtureStatProvider::new()
            .with("Patrick Mahomes", MarketKind::PassingYards, form)
            .with("Patrick Mahomes", MarketKind::PassingTouchdowns, td_form)
            .with("AJ Brown", MarketKind::ReceivingYards, rec_form);
        let index = RosterIndex::new()
            .with_event("KC", "nfl-kc-buf")
            .with_event("PHI", "nfl-phi-dal");
        let analyzer = analyzer_with(index, stats);

        let slip = "Patrick Mahomes over 280.5 passing yards +100\n\
                    Patrick Mahomes over 1.5 passing touchdowns +100\n\
                    AJ Brown over 70.5 receiving yards +100";
        let result = analyzer.analyze(slip).await.unwrap();

        assert_eq!(result.leg_analyses.len(), 3);
        // Two legs share a game and a market family: 0.9 * 0.8
        assert!((result.correlation_multiplier - 0.72).abs() < 1e-9);
        assert!(result.raw_ev > 0.0);
        assert!(result.expected_value < result.raw_ev);
        // Heavy correlation escalates risk relative to the uncorrelated case
        let max_leg_risk = result
            .leg_analyses
            .iter()
            .map(|a| a.risk_level)
            .max()
            .unwrap();
        assert!(result.risk_assessment > max_leg_risk);
        assert!(result
            .key_factors
            .iter()
            .any(|f| f.contains("multiplier 0.72")));
    }

    #[tokio::test]
    async fn test_scenario_boundary_line_validity() {
        let analyzer = analyzer_with(RosterIndex::new(), FixtureStatProvider::new());

        let at_bound = analyzer
            .analyze("Patrick Mahomes over 400 passing yards -110")
            .await
            .unwrap();
        assert_eq!(at_bound.leg_analyses.len(), 1);

        let past_bound = analyzer
            .analyze("Patrick Mahomes over 401 passing yards -110")
            .await
            .unwrap();
        assert!(past_bound.leg_analyses.is_empty());
        assert_eq!(past_bound.skipped_legs.len(), 1);
        assert!(past_bound.skipped_legs[0].reason.contains("outside valid range"));
    }

    #[tokio::test]
    async fn test_empty_input_is_zero_leg_pass() {
        let analyzer = analyzer_with(RosterIndex::new(), FixtureStatProvider::new());
        let result = analyzer.analyze("   \n \t ").await.unwrap();
        assert!(result.leg_analyses.is_empty());
        assert_eq!(result.recommendation, Recommendation::Pass);
        assert!(result.key_factors[0].contains("No parseable bet legs"));
    }

    #[tokio::test]
    async fn test_skipped_legs_never_scored() {
        // One clean leg plus one garbled leg: exactly one analysis,
        // exactly one skip, nothing silently dropped.
        let analyzer = analyzer_with(RosterIndex::new(), mahomes_context());
        let slip = "Patrick Mahomes over 280.5 passing yards -110\n\
                    mauinew susnura over 50 yards -110";
        let result = analyzer.analyze(slip).await.unwrap();
        assert_eq!(result.leg_analyses.len(), 1);
        assert_eq!(result.skipped_legs.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_is_idempotent() {
        let analyzer = analyzer_with(RosterIndex::new(), mahomes_context());
        let slip = "Patrick Mahomes over 280.5 passing yards -110\nTravis Kelce over 5.5 receptions -105";
        let a = analyzer.analyze(slip).await.unwrap();
        let b = analyzer.analyze(slip).await.unwrap();

        // Identical apart from request id and timestamp
        assert_eq!(a.recommendation, b.recommendation);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.expected_value, b.expected_value);
        assert_eq!(a.raw_ev, b.raw_ev);
        assert_eq!(a.risk_assessment, b.risk_assessment);
        assert_eq!(a.key_factors, b.key_factors);
        assert_eq!(a.leg_analyses.len(), b.leg_analyses.len());
    }

    #[tokio::test]
    async fn test_provider_with_no_data_still_scores() {
        let analyzer = SlipAnalyzer::new(
            AnalysisConfig::default(),
            Arc::new(RosterIndex::new()),
            Arc::new(NoStatProvider),
        )
        .unwrap();
        let result = analyzer
            .analyze("Patrick Mahomes over 280.5 passing yards -110")
            .await
            .unwrap();
        assert_eq!(result.leg_analyses.len(), 1);
        let leg = &result.leg_analyses[0];
        assert!((leg.win_probability - 0.5).abs() < 1e-9);
        assert!(leg
            .risk_factors
            .iter()
            .any(|f| f.contains("Limited historical data")));
    }

    #[tokio::test]
    async fn test_result_serializes_with_expected_fields() {
        let analyzer = analyzer_with(RosterIndex::new(), mahomes_context());
        let result = analyzer
            .analyze("Patrick Mahomes over 280.5 passing yards -110")
            .await
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        for key in [
            "recommendation",
            "confidence",
            "expected_value",
            "raw_ev",
            "risk_assessment",
            "key_factors",
            "leg_analyses",
            "timestamp",
        ] {
            assert!(value.get(key).is_some(), "missing field {key}");
        }
        let leg = &value["leg_analyses"][0]["leg"];
        assert_eq!(leg["market"], "passing_yards");
        assert_eq!(leg["american_odds"], -110);
    }

    #[tokio::test]
    async fn test_invalid_config_fails_at_construction() {
        let config = AnalysisConfig {
            ambiguity_threshold: -0.2,
            ..Default::default()
        };
        let built = SlipAnalyzer::new(
            config,
            Arc::new(RosterIndex::new()),
            Arc::new(NoStatProvider),
        );
        assert!(built.is_err());
    }
}
