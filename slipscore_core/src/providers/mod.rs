//! Statistical context providers.
//!
//! The engine never fetches data itself; historical performance arrives
//! through the `StatContextProvider` trait. A provider returning `None` means
//! "no data for this subject/market", which is distinct from zeroes and makes
//! the scorer fall back to its neutral prior.

use anyhow::Result;
use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::models::{MarketKind, Sport, StatContext};

/// Read-only source of historical performance per subject/market/sport.
#[async_trait]
pub trait StatContextProvider: Send + Sync {
    async fn context(
        &self,
        subject: &str,
        market: MarketKind,
        sport: Sport,
    ) -> Result<Option<StatContext>>;

    /// Provider name for logging and debugging.
    fn provider_name(&self) -> &str;
}

/// Provider with no data at all; every leg scores on the neutral prior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStatProvider;

#[async_trait]
impl StatContextProvider for NoStatProvider {
    async fn context(
        &self,
        _subject: &str,
        _market: MarketKind,
        _sport: Sport,
    ) -> Result<Option<StatContext>> {
        Ok(None)
    }

    fn provider_name(&self) -> &str {
        "no_stats"
    }
}

/// In-memory provider backed by a fixture table, for deterministic context
/// in tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct FixtureStatProvider {
    table: FxHashMap<(String, MarketKind), StatContext>,
}

impl FixtureStatProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject: &str, market: MarketKind, context: StatContext) {
        self.table.insert((subject.to_string(), market), context);
    }

    pub fn with(mut self, subject: &str, market: MarketKind, context: StatContext) -> Self {
        self.insert(subject, market, context);
        self
    }
}

#[async_trait]
impl StatContextProvider for FixtureStatProvider {
    async fn context(
        &self,
        subject: &str,
        market: MarketKind,
        _sport: Sport,
    ) -> Result<Option<StatContext>> {
        Ok(self.table.get(&(subject.to_string(), market)).cloned())
    }

    fn provider_name(&self) -> &str {
        "fixture_stats"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_provider_round_trip() {
        let provider = FixtureStatProvider::new().with(
            "Patrick Mahomes",
            MarketKind::PassingYards,
            StatContext {
                historical_average: Some(270.0),
                std_dev: Some(30.0),
                recent_form: None,
            },
        );

        let ctx = provider
            .context("Patrick Mahomes", MarketKind::PassingYards, Sport::NFL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ctx.historical_average, Some(270.0));

        // Different market for the same subject is a miss, not zeroes
        let miss = provider
            .context("Patrick Mahomes", MarketKind::RushingYards, Sport::NFL)
            .await
            .unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_no_stat_provider_always_absent() {
        let provider = NoStatProvider;
        let miss = provider
            .context("Anyone", MarketKind::Points, Sport::NBA)
            .await
            .unwrap();
        assert!(miss.is_none());
    }
}
