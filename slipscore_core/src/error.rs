//! Error taxonomy for analyzer construction and requests.
//!
//! Per-leg problems (unclear subject, missing line, out-of-range odds) are
//! never errors: they downgrade to skipped legs with a reason. Only bad
//! configuration surfaces as a hard failure, and it fails at construction
//! before any request is processed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("risk thresholds must be monotonic: medium floor {medium} must be below high floor {high}")]
    NonMonotonicRiskThresholds { medium: u32, high: u32 },

    #[error("factor weight {name} must be positive, got {value}")]
    NonPositiveWeight { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid analysis configuration: {0}")]
    Config(#[from] ConfigError),
}
