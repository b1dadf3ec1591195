//! Slipscore core engine.
//!
//! Turns raw bet-slip text (typed, pasted, or OCR output) into a structured
//! risk-scored recommendation:
//! - Text normalization and leg splitting
//! - Entity resolution through a pluggable identification backend
//! - Per-leg validation state machine ("skip rather than guess")
//! - Expected value and risk scoring against historical context
//! - Pairwise correlation detection with a group independence multiplier
//! - Group-level recommendation aggregation
//!
//! The orchestration entry point is [`analyzer::SlipAnalyzer`]; everything
//! below it is usable on its own.

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod correlation;
pub mod error;
pub mod leg;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod resolve;
pub mod scoring;
pub mod vocab;

pub use analyzer::SlipAnalyzer;
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError};
pub use models::{
    BetLeg, GroupRecommendation, LegAnalysis, Recommendation, RiskLevel, SkippedLeg,
};
pub use providers::StatContextProvider;
pub use resolve::EntityIdentifier;
