//! Recommendation Aggregator.
//!
//! Pure function from (leg analyses, correlation multiplier, skipped legs)
//! to the terminal `GroupRecommendation`. Parlay EV is computed from the
//! joint win probability and the joint payout, never a naive sum, and the
//! correlation multiplier only ever reduces the claimed edge.

use chrono::Utc;
use uuid::Uuid;

use crate::config::AnalysisConfig;
use crate::models::{
    GroupRecommendation, LegAnalysis, Recommendation, RiskLevel, SkippedLeg,
};
use crate::scoring::implied_payout;

/// Combine scored legs into one group-level recommendation.
pub fn aggregate(
    analyses: Vec<LegAnalysis>,
    multiplier: f64,
    skipped: Vec<SkippedLeg>,
    config: &AnalysisConfig,
) -> GroupRecommendation {
    if analyses.is_empty() {
        return empty_result(skipped);
    }

    let group_raw_ev = group_raw_ev(&analyses);
    let group_ev = group_raw_ev * multiplier;

    let mut risk = analyses
        .iter()
        .map(|a| a.risk_level)
        .max()
        .unwrap_or(RiskLevel::Low);
    if multiplier < config.correlation_risk_threshold {
        // Heavy correlation is itself a risk amplifier
        risk = risk.escalate();
    }

    let uncompensated_high_risk = analyses
        .iter()
        .any(|a| a.risk_level == RiskLevel::High && a.safety_factors.is_empty());

    let recommendation = if group_ev <= 0.0 || uncompensated_high_risk {
        Recommendation::Pass
    } else if group_ev >= config.strong_consider_ev && risk != RiskLevel::High {
        Recommendation::StrongConsider
    } else {
        Recommendation::Consider
    };

    let confidence = group_confidence(&analyses, multiplier);
    let key_factors = key_factors(&analyses, &skipped, multiplier);

    GroupRecommendation {
        request_id: Uuid::new_v4(),
        recommendation,
        confidence,
        expected_value: group_ev,
        raw_ev: group_raw_ev,
        risk_assessment: risk,
        correlation_multiplier: multiplier,
        key_factors,
        leg_analyses: analyses,
        skipped_legs: skipped,
        timestamp: Utc::now(),
    }
}

/// Raw EV for the bet structure: the leg's own EV for a single, the joint
/// probability against the joint payout for a parlay.
fn group_raw_ev(analyses: &[LegAnalysis]) -> f64 {
    if analyses.len() == 1 {
        return analyses[0].raw_ev;
    }

    let joint_p: f64 = analyses.iter().map(|a| a.win_probability).product();
    let joint_payout: f64 = analyses
        .iter()
        .map(|a| 1.0 + implied_payout(a.leg.american_odds))
        .product::<f64>()
        - 1.0;
    joint_p * joint_payout - (1.0 - joint_p)
}

/// Leg confidences weighted by each leg's |raw EV| contribution, then scaled
/// by the independence multiplier.
fn group_confidence(analyses: &[LegAnalysis], multiplier: f64) -> f64 {
    let total_weight: f64 = analyses.iter().map(|a| a.raw_ev.abs()).sum();
    let weighted = if total_weight > 0.0 {
        analyses
            .iter()
            .map(|a| a.confidence * a.raw_ev.abs() / total_weight)
            .sum()
    } else {
        analyses.iter().map(|a| a.confidence).sum::<f64>() / analyses.len() as f64
    };
    (weighted * multiplier).clamp(0.0, 1.0)
}

/// Ordered explanation: safety factors by descending confidence weight, then
/// risk factors in leg order, then skip notes, then the correlation note.
fn key_factors(analyses: &[LegAnalysis], skipped: &[SkippedLeg], multiplier: f64) -> Vec<String> {
    let mut factors = Vec::new();

    let mut weighted_safety: Vec<(f64, &String)> = analyses
        .iter()
        .flat_map(|a| {
            let weight = a.raw_ev.abs() * a.confidence;
            a.safety_factors.iter().map(move |f| (weight, f))
        })
        .collect();
    weighted_safety.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (_, factor) in weighted_safety {
        if !factors.contains(factor) {
            factors.push(factor.clone());
        }
    }

    for analysis in analyses {
        for factor in &analysis.risk_factors {
            if !factors.contains(factor) {
                factors.push(factor.clone());
            }
        }
    }

    if analyses.len() > 1 {
        factors.push(format!(
            "{}-leg parlay compounds risk across legs",
            analyses.len()
        ));
    }
    if analyses.len() > 2 {
        factors.push("Large parlay: consider splitting into smaller bets".to_string());
    }

    for skip in skipped {
        factors.push(format!("Skipped leg: {}", skip.reason));
    }

    if multiplier < 1.0 {
        factors.push(format!(
            "Correlated legs reduce independence (multiplier {multiplier:.2})"
        ));
    }

    factors
}

fn empty_result(skipped: Vec<SkippedLeg>) -> GroupRecommendation {
    let mut key_factors = Vec::new();
    if skipped.is_empty() {
        key_factors.push("No parseable bet legs found in input".to_string());
    } else {
        key_factors.push("No valid bet legs to score".to_string());
        for skip in &skipped {
            key_factors.push(format!("Skipped leg: {}", skip.reason));
        }
    }

    GroupRecommendation {
        request_id: Uuid::new_v4(),
        recommendation: Recommendation::Pass,
        confidence: 0.0,
        expected_value: 0.0,
        raw_ev: 0.0,
        risk_assessment: RiskLevel::Low,
        correlation_multiplier: 1.0,
        key_factors,
        leg_analyses: Vec::new(),
        skipped_legs: skipped,
        timestamp: Utc::now(),
    }
}
