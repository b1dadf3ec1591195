//! Analysis configuration.
//!
//! All tuning (thresholds, factor weights, correlation penalties) lives in an
//! explicit immutable `AnalysisConfig` passed at construction. There is no
//! process-global state, so concurrent requests can run with different
//! configurations without interference.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum identification confidence for a leg subject to be accepted.
    pub ambiguity_threshold: f64,
    /// Win probability used when no statistical context is available.
    pub neutral_prior: f64,
    /// Confidence multiplier applied when historical context is partial or missing.
    pub partial_context_confidence: f64,
    /// Points contributed by a low-impact risk rule.
    pub low_impact_points: f64,
    /// Points contributed by a high-impact risk rule.
    pub high_impact_points: f64,
    /// Total risk points at which a leg becomes Medium risk.
    pub medium_risk_floor: u32,
    /// Total risk points at which a leg becomes High risk.
    pub high_risk_floor: u32,
    /// Penalty per pair of legs in the same event.
    pub same_event_penalty: f64,
    /// Penalty per pair of legs in the same market family.
    pub same_family_penalty: f64,
    /// Penalty per pair of legs sharing an external factor.
    pub shared_factor_penalty: f64,
    /// Lower bound on the group independence multiplier.
    pub correlation_floor: f64,
    /// Multiplier below which heavy correlation escalates the group risk level.
    pub correlation_risk_threshold: f64,
    /// Group EV at or above which a low/medium-risk slip is a strong consider.
    pub strong_consider_ev: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ambiguity_threshold: 0.6,
            neutral_prior: 0.5,
            partial_context_confidence: 0.7,
            low_impact_points: 1.0,
            high_impact_points: 2.0,
            medium_risk_floor: 2,
            high_risk_floor: 4,
            same_event_penalty: 0.9,
            same_family_penalty: 0.8,
            shared_factor_penalty: 0.95,
            correlation_floor: 0.5,
            correlation_risk_threshold: 0.8,
            strong_consider_ev: 0.10,
        }
    }
}

impl AnalysisConfig {
    /// Build a config from environment variables, falling back to defaults.
    /// Mirrors how the analyzer service is tuned in deployment.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            ambiguity_threshold: env_f64("SLIP_AMBIGUITY_THRESHOLD", d.ambiguity_threshold),
            neutral_prior: env_f64("SLIP_NEUTRAL_PRIOR", d.neutral_prior),
            partial_context_confidence: env_f64(
                "SLIP_PARTIAL_CONTEXT_CONFIDENCE",
                d.partial_context_confidence,
            ),
            low_impact_points: env_f64("SLIP_LOW_IMPACT_POINTS", d.low_impact_points),
            high_impact_points: env_f64("SLIP_HIGH_IMPACT_POINTS", d.high_impact_points),
            medium_risk_floor: env_u32("SLIP_MEDIUM_RISK_FLOOR", d.medium_risk_floor),
            high_risk_floor: env_u32("SLIP_HIGH_RISK_FLOOR", d.high_risk_floor),
            same_event_penalty: env_f64("SLIP_SAME_EVENT_PENALTY", d.same_event_penalty),
            same_family_penalty: env_f64("SLIP_SAME_FAMILY_PENALTY", d.same_family_penalty),
            shared_factor_penalty: env_f64("SLIP_SHARED_FACTOR_PENALTY", d.shared_factor_penalty),
            correlation_floor: env_f64("SLIP_CORRELATION_FLOOR", d.correlation_floor),
            correlation_risk_threshold: env_f64(
                "SLIP_CORRELATION_RISK_THRESHOLD",
                d.correlation_risk_threshold,
            ),
            strong_consider_ev: env_f64("SLIP_STRONG_CONSIDER_EV", d.strong_consider_ev),
        }
    }

    /// Fail-fast validation, run once at analyzer construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("ambiguity_threshold", self.ambiguity_threshold, 0.0, 1.0)?;
        check_range("neutral_prior", self.neutral_prior, 0.0, 1.0)?;
        check_range(
            "partial_context_confidence",
            self.partial_context_confidence,
            0.0,
            1.0,
        )?;
        check_penalty("same_event_penalty", self.same_event_penalty)?;
        check_penalty("same_family_penalty", self.same_family_penalty)?;
        check_penalty("shared_factor_penalty", self.shared_factor_penalty)?;
        check_penalty("correlation_floor", self.correlation_floor)?;
        check_range(
            "correlation_risk_threshold",
            self.correlation_risk_threshold,
            0.0,
            1.0,
        )?;
        check_weight("low_impact_points", self.low_impact_points)?;
        check_weight("high_impact_points", self.high_impact_points)?;

        if self.medium_risk_floor >= self.high_risk_floor {
            return Err(ConfigError::NonMonotonicRiskThresholds {
                medium: self.medium_risk_floor,
                high: self.high_risk_floor,
            });
        }

        Ok(())
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Penalties and floors must be in (0, 1]: zero would annihilate group EV.
fn check_penalty(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min: f64::EPSILON,
            max: 1.0,
        });
    }
    Ok(())
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositiveWeight { name, value });
    }
    Ok(())
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
