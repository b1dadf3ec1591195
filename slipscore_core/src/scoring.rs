//! Expected Value & Risk Scorer.
//!
//! Scores one Valid leg against its statistical context:
//! - win probability from recent outcomes, a normal approximation over the
//!   historical average, or the neutral prior when no data exists
//! - raw EV per unit stake from the American odds payout
//! - weighted risk/safety factor rules with a three-tier risk level
//! - confidence as resolver confidence scaled by data completeness
//!
//! Scoring always produces a numeric result for a Valid leg; missing context
//! degrades confidence, it never fails the request.

use log::debug;
use rayon::prelude::*;

use crate::config::AnalysisConfig;
use crate::models::{BetLeg, LegAnalysis, RiskLevel, Side, StatContext};

/// Convert American odds to profit per unit stake.
pub fn implied_payout(odds: i32) -> f64 {
    if odds >= 0 {
        odds as f64 / 100.0
    } else {
        100.0 / (odds as f64).abs()
    }
}

/// Logistic approximation to the standard normal CDF.
fn normal_cdf(z: f64) -> f64 {
    1.0 / (1.0 + (-1.702 * z).exp())
}

/// Estimate the probability the leg wins. Returns the estimate and whether
/// it came from actual data (false means the neutral prior was used).
pub fn estimate_win_probability(
    leg: &BetLeg,
    context: Option<&StatContext>,
    config: &AnalysisConfig,
) -> (f64, bool) {
    let Some(ctx) = context else {
        return (config.neutral_prior, false);
    };

    // Recent outcomes beat a distributional estimate when we have them.
    if let Some(form) = ctx.recent_form.as_ref().filter(|f| !f.is_empty()) {
        let hits = form
            .iter()
            .filter(|&&v| match leg.side {
                Side::Over => v > leg.line,
                Side::Under => v < leg.line,
            })
            .count();
        // Laplace smoothing keeps small samples away from 0 and 1.
        let p = (hits as f64 + 1.0) / (form.len() as f64 + 2.0);
        return (p, true);
    }

    if let (Some(avg), Some(sd)) = (ctx.historical_average, ctx.std_dev) {
        if sd > 0.0 {
            let z = (leg.line - avg) / sd;
            let p_over = 1.0 - normal_cdf(z);
            let p = match leg.side {
                Side::Over => p_over,
                Side::Under => 1.0 - p_over,
            };
            return (p.clamp(0.02, 0.98), true);
        }
    }

    (config.neutral_prior, false)
}

/// Score one Valid leg.
pub fn score_leg(leg: &BetLeg, context: Option<&StatContext>, config: &AnalysisConfig) -> LegAnalysis {
    let (p, from_data) = estimate_win_probability(leg, context, config);
    let payout = implied_payout(leg.american_odds);
    let raw_ev = p * payout - (1.0 - p);

    let mut risk_factors = Vec::new();
    let mut safety_factors = Vec::new();
    let mut risk_points = 0.0f64;

    // Odds-based rules
    let odds = leg.american_odds;
    if odds > 150 {
        risk_factors.push(format!(
            "High positive odds (+{odds}) indicate a significant upset is needed"
        ));
        risk_points += config.high_impact_points;
    } else if odds < -200 {
        risk_factors.push(format!(
            "Heavy favorite ({odds}) leaves little payout margin for error"
        ));
        risk_points += config.low_impact_points;
    } else if (-150..=150).contains(&odds) {
        safety_factors.push(format!(
            "Balanced odds ({odds}) suggest a reasonable win probability"
        ));
    }

    // Line-versus-average rules
    let avg = context.and_then(|c| c.historical_average);
    if let Some(avg) = avg {
        let sd = context.and_then(|c| c.std_dev);
        if sd.is_some_and(|sd| leg.line > avg + sd) {
            risk_factors.push(format!(
                "Line {} more than one standard deviation above the {} average",
                leg.line, avg
            ));
            risk_points += config.high_impact_points;
        } else if leg.line > avg {
            risk_factors.push(format!(
                "Line {} above the historical average {}",
                leg.line, avg
            ));
            risk_points += config.low_impact_points;
        } else if leg.line < 0.8 * avg {
            safety_factors.push(format!(
                "Line {} well below the historical average {}",
                leg.line, avg
            ));
        } else if leg.line < avg {
            safety_factors.push(format!(
                "Line {} below the historical average {}",
                leg.line, avg
            ));
        }

        // Recent trend against the season average
        if let Some(form) = context.and_then(|c| c.recent_form.as_ref()).filter(|f| !f.is_empty()) {
            let window = &form[form.len().saturating_sub(3)..];
            let form_avg = window.iter().sum::<f64>() / window.len() as f64;
            if form_avg > avg * 1.1 {
                safety_factors.push("Recent form trending above the season average".to_string());
            } else if form_avg < avg * 0.9 {
                risk_factors.push("Recent form trending below the season average".to_string());
                risk_points += config.low_impact_points;
            }
        }
    }

    if !from_data {
        risk_factors.push(format!(
            "Limited historical data for {}",
            leg.subject.canonical_name
        ));
        risk_points += config.low_impact_points;
    }

    let risk_level = if risk_points >= config.high_risk_floor as f64 {
        RiskLevel::High
    } else if risk_points >= config.medium_risk_floor as f64 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let completeness = if context.is_some_and(|c| c.is_complete()) {
        1.0
    } else {
        config.partial_context_confidence
    };
    let confidence = (leg.subject.confidence * completeness).clamp(0.0, 1.0);

    debug!(
        "scored {} {}: p={:.3} raw_ev={:+.3} risk={:?}",
        leg.subject.canonical_name,
        leg.market.as_str(),
        p,
        raw_ev,
        risk_level
    );

    LegAnalysis {
        leg: leg.clone(),
        win_probability: p,
        raw_ev,
        expected_value: raw_ev,
        risk_factors,
        safety_factors,
        risk_level,
        confidence,
    }
}

/// Score a batch of legs in parallel. Output order matches input order.
pub fn batch_score(
    pairs: &[(BetLeg, Option<StatContext>)],
    config: &AnalysisConfig,
) -> Vec<LegAnalysis> {
    pairs
        .par_iter()
        .map(|(leg, ctx)| score_leg(leg, ctx.as_ref(), config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityKind, MarketKind, ResolvedEntity, Sport};

    fn leg(line: f64, odds: i32, side: Side) -> BetLeg {
        BetLeg {
            sport: Sport::NFL,
            market: MarketKind::PassingYards,
            subject: ResolvedEntity {
                kind: EntityKind::Player,
                canonical_name: "Patrick Mahomes".to_string(),
                source_span: "mahomes".to_string(),
                confidence: 0.95,
                sport: Some(Sport::NFL),
                team: Some("KC".to_string()),
                event_id: None,
                external_factors: vec![],
            },
            side,
            line,
            american_odds: odds,
            raw_text: String::new(),
            event_id: None,
            external_factors: vec![],
        }
    }

    #[test]
    fn test_implied_payout() {
        assert!((implied_payout(100) - 1.0).abs() < 1e-12);
        assert!((implied_payout(150) - 1.5).abs() < 1e-12);
        assert!((implied_payout(-110) - 100.0 / 110.0).abs() < 1e-12);
        assert!((implied_payout(-200) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fair_coin_at_even_odds_has_zero_ev() {
        // p = 0.5 at +100 is exactly zero edge
        let cfg = AnalysisConfig::default();
        let leg = leg(280.5, 100, Side::Over);
        let analysis = score_leg(&leg, None, &cfg);
        assert!((analysis.win_probability - 0.5).abs() < 1e-12);
        assert_eq!(analysis.raw_ev, 0.0);
    }

    #[test]
    fn test_neutral_prior_adds_limited_data_factor() {
        let cfg = AnalysisConfig::default();
        let analysis = score_leg(&leg(280.5, -110, Side::Over), None, &cfg);
        assert!(analysis
            .risk_factors
            .iter()
            .any(|f| f.contains("Limited historical data")));
        assert!((analysis.confidence - 0.95 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_recent_form_drives_probability() {
        let cfg = AnalysisConfig::default();
        let ctx = StatContext {
            historical_average: Some(270.0),
            std_dev: Some(30.0),
            recent_form: Some(vec![300.0, 310.0, 295.0, 305.0]),
        };
        let analysis = score_leg(&leg(280.5, -110, Side::Over), Some(&ctx), &cfg);
        // 4 of 4 over the line, Laplace smoothed: 5/6
        assert!((analysis.win_probability - 5.0 / 6.0).abs() < 1e-9);
        assert!(analysis.raw_ev > 0.0);
        // Full context, no completeness reduction
        assert!((analysis.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_under_side_inverts_form_hits() {
        let cfg = AnalysisConfig::default();
        let ctx = StatContext {
            historical_average: None,
            std_dev: None,
            recent_form: Some(vec![300.0, 310.0, 295.0, 305.0]),
        };
        let analysis = score_leg(&leg(280.5, -110, Side::Under), Some(&ctx), &cfg);
        assert!((analysis.win_probability - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_above_average_is_risk_below_is_safety() {
        let cfg = AnalysisConfig::default();
        let ctx = StatContext {
            historical_average: Some(270.0),
            std_dev: Some(30.0),
            recent_form: None,
        };

        let above = score_leg(&leg(280.5, -110, Side::Over), Some(&ctx), &cfg);
        assert!(above
            .risk_factors
            .iter()
            .any(|f| f.contains("above the historical average")));
        assert_eq!(above.risk_level, RiskLevel::Low);

        let way_above = score_leg(&leg(305.0, -110, Side::Over), Some(&ctx), &cfg);
        assert!(way_above
            .risk_factors
            .iter()
            .any(|f| f.contains("standard deviation above")));

        let below = score_leg(&leg(250.0, -110, Side::Over), Some(&ctx), &cfg);
        assert!(below
            .safety_factors
            .iter()
            .any(|f| f.contains("below the historical average")));
    }

    #[test]
    fn test_risk_level_thresholds() {
        let cfg = AnalysisConfig::default();
        // Longshot odds (2 pts) + no data (1 pt) = 3 -> Medium
        let analysis = score_leg(&leg(280.5, 300, Side::Over), None, &cfg);
        assert_eq!(analysis.risk_level, RiskLevel::Medium);

        // Add line-over-average+sd (2 pts) for 5 total -> High
        let ctx = StatContext {
            historical_average: Some(240.0),
            std_dev: Some(30.0),
            recent_form: Some(vec![200.0, 210.0, 205.0]),
        };
        let analysis = score_leg(&leg(280.5, 300, Side::Over), Some(&ctx), &cfg);
        assert_eq!(analysis.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        let cfg = AnalysisConfig::default();
        for odds in [-450, -110, 100, 450] {
            for ctx in [
                None,
                Some(StatContext {
                    historical_average: Some(270.0),
                    std_dev: Some(30.0),
                    recent_form: Some(vec![280.0, 260.0]),
                }),
            ] {
                let analysis = score_leg(&leg(280.5, odds, Side::Over), ctx.as_ref(), &cfg);
                assert!((0.0..=1.0).contains(&analysis.confidence));
                assert!((0.0..=1.0).contains(&analysis.win_probability));
            }
        }
    }

    #[test]
    fn test_batch_score_preserves_order() {
        let cfg = AnalysisConfig::default();
        let pairs = vec![
            (leg(280.5, -110, Side::Over), None),
            (leg(225.5, 120, Side::Over), None),
            (leg(300.5, -300, Side::Under), None),
        ];
        let analyses = batch_score(&pairs, &cfg);
        assert_eq!(analyses.len(), 3);
        assert_eq!(analyses[0].leg.american_odds, -110);
        assert_eq!(analyses[1].leg.american_odds, 120);
        assert_eq!(analyses[2].leg.american_odds, -300);
    }
}
