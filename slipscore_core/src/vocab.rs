//! Market vocabulary for supported sports.
//!
//! This module provides:
//! - Static per-sport valid ranges for lines and American odds
//! - Keyword detection mapping slip phrasing to a `MarketKind`
//!
//! Range checks are boundary-inclusive: a line exactly at the bound is valid,
//! one unit outside is not.

use rustc_hash::FxHashMap;

use crate::models::{MarketKind, Sport};

/// Valid [min, max] windows for one sport/market pair.
#[derive(Debug, Clone, Copy)]
pub struct MarketRange {
    pub line_min: f64,
    pub line_max: f64,
    pub odds_min: i32,
    pub odds_max: i32,
}

impl MarketRange {
    pub fn line_in_range(&self, line: f64) -> bool {
        line >= self.line_min && line <= self.line_max
    }

    pub fn odds_in_range(&self, odds: i32) -> bool {
        odds >= self.odds_min && odds <= self.odds_max
    }
}

/// Static configuration for every scoreable sport/market pair.
///
/// Line windows reflect realistic sportsbook offerings; odds are capped at
/// ±500 across the board since anything further out is noise or an OCR error.
static MARKET_RANGES: &[(Sport, MarketKind, f64, f64, i32, i32)] = &[
    // Football
    (Sport::NFL, MarketKind::PassingYards, 150.0, 400.0, -500, 500),
    (Sport::NFL, MarketKind::PassingTouchdowns, 0.5, 4.5, -500, 500),
    (Sport::NFL, MarketKind::RushingYards, 20.0, 200.0, -500, 500),
    (Sport::NFL, MarketKind::ReceivingYards, 20.0, 150.0, -500, 500),
    (Sport::NFL, MarketKind::Receptions, 0.5, 15.5, -500, 500),
    (Sport::NFL, MarketKind::AnytimeTouchdown, 0.5, 0.5, -500, 500),
    (Sport::NFL, MarketKind::Spread, -30.0, 30.0, -500, 500),
    (Sport::NFL, MarketKind::Total, 30.0, 65.0, -500, 500),
    (Sport::NCAAF, MarketKind::PassingYards, 150.0, 450.0, -500, 500),
    (Sport::NCAAF, MarketKind::RushingYards, 20.0, 250.0, -500, 500),
    (Sport::NCAAF, MarketKind::ReceivingYards, 20.0, 175.0, -500, 500),
    (Sport::NCAAF, MarketKind::Spread, -45.0, 45.0, -500, 500),
    (Sport::NCAAF, MarketKind::Total, 35.0, 85.0, -500, 500),
    // Basketball
    (Sport::NBA, MarketKind::Points, 5.5, 45.5, -500, 500),
    (Sport::NBA, MarketKind::Rebounds, 2.5, 20.5, -500, 500),
    (Sport::NBA, MarketKind::Assists, 2.5, 15.5, -500, 500),
    (Sport::NBA, MarketKind::ThreePointers, 0.5, 8.5, -500, 500),
    (Sport::NBA, MarketKind::Spread, -25.0, 25.0, -500, 500),
    (Sport::NBA, MarketKind::Total, 190.0, 260.0, -500, 500),
    (Sport::NCAAB, MarketKind::Points, 5.5, 40.5, -500, 500),
    (Sport::NCAAB, MarketKind::Spread, -30.0, 30.0, -500, 500),
    (Sport::NCAAB, MarketKind::Total, 110.0, 180.0, -500, 500),
    // Hockey
    (Sport::NHL, MarketKind::ShotsOnGoal, 1.5, 6.5, -500, 500),
    (Sport::NHL, MarketKind::Goals, 0.5, 1.5, -500, 500),
    (Sport::NHL, MarketKind::Spread, -2.5, 2.5, -500, 500),
    (Sport::NHL, MarketKind::Total, 4.5, 8.5, -500, 500),
    // Baseball
    (Sport::MLB, MarketKind::Strikeouts, 2.5, 12.5, -500, 500),
    (Sport::MLB, MarketKind::TotalBases, 0.5, 4.5, -500, 500),
    (Sport::MLB, MarketKind::Hits, 0.5, 3.5, -500, 500),
    (Sport::MLB, MarketKind::Spread, -2.5, 2.5, -500, 500),
    (Sport::MLB, MarketKind::Total, 5.5, 13.5, -500, 500),
];

/// Keyword phrases mapped to a market kind and the sport that market defaults
/// to when the subject's sport is unknown. Checked in order; longer phrases
/// come first so "total points" wins over "points".
static MARKET_KEYWORDS: &[(&str, MarketKind, Sport)] = &[
    ("passing touchdowns", MarketKind::PassingTouchdowns, Sport::NFL),
    ("passing tds", MarketKind::PassingTouchdowns, Sport::NFL),
    ("passing yards", MarketKind::PassingYards, Sport::NFL),
    ("pass yds", MarketKind::PassingYards, Sport::NFL),
    ("rushing yards", MarketKind::RushingYards, Sport::NFL),
    ("rush yds", MarketKind::RushingYards, Sport::NFL),
    ("receiving yards", MarketKind::ReceivingYards, Sport::NFL),
    ("rec yds", MarketKind::ReceivingYards, Sport::NFL),
    ("receptions", MarketKind::Receptions, Sport::NFL),
    ("anytime touchdown", MarketKind::AnytimeTouchdown, Sport::NFL),
    ("touchdown scorer", MarketKind::AnytimeTouchdown, Sport::NFL),
    ("anytime td", MarketKind::AnytimeTouchdown, Sport::NFL),
    ("to score a touchdown", MarketKind::AnytimeTouchdown, Sport::NFL),
    ("total bases", MarketKind::TotalBases, Sport::MLB),
    ("shots on goal", MarketKind::ShotsOnGoal, Sport::NHL),
    ("strikeouts", MarketKind::Strikeouts, Sport::MLB),
    ("three pointers", MarketKind::ThreePointers, Sport::NBA),
    ("3-pointers", MarketKind::ThreePointers, Sport::NBA),
    ("threes made", MarketKind::ThreePointers, Sport::NBA),
    ("total points", MarketKind::Total, Sport::NBA),
    ("game total", MarketKind::Total, Sport::NFL),
    ("rebounds", MarketKind::Rebounds, Sport::NBA),
    ("assists", MarketKind::Assists, Sport::NBA),
    ("points", MarketKind::Points, Sport::NBA),
    ("goals", MarketKind::Goals, Sport::NHL),
    ("hits", MarketKind::Hits, Sport::MLB),
    ("puck line", MarketKind::Spread, Sport::NHL),
    ("run line", MarketKind::Spread, Sport::MLB),
    ("spread", MarketKind::Spread, Sport::NFL),
];

/// Market vocabulary: answers "is this sport/market pair scoreable, and what
/// are its valid windows".
#[derive(Debug, Clone)]
pub struct MarketVocabulary {
    ranges: FxHashMap<(Sport, MarketKind), MarketRange>,
}

impl MarketVocabulary {
    /// Vocabulary covering the default book of markets.
    pub fn default_book() -> Self {
        let mut ranges = FxHashMap::default();
        for &(sport, kind, line_min, line_max, odds_min, odds_max) in MARKET_RANGES {
            ranges.insert(
                (sport, kind),
                MarketRange {
                    line_min,
                    line_max,
                    odds_min,
                    odds_max,
                },
            );
        }
        Self { ranges }
    }

    pub fn range(&self, sport: Sport, kind: MarketKind) -> Option<&MarketRange> {
        self.ranges.get(&(sport, kind))
    }

    pub fn supports(&self, sport: Sport, kind: MarketKind) -> bool {
        self.ranges.contains_key(&(sport, kind))
    }

    /// All market kinds known for one sport.
    pub fn markets_for(&self, sport: Sport) -> Vec<MarketKind> {
        let mut kinds: Vec<MarketKind> = self
            .ranges
            .keys()
            .filter(|(s, _)| *s == sport)
            .map(|(_, k)| *k)
            .collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}

impl Default for MarketVocabulary {
    fn default() -> Self {
        Self::default_book()
    }
}

/// Detect the market a leg candidate describes from its phrasing.
///
/// Returns the market kind plus the default sport for that market; the
/// caller prefers the resolved subject's sport when one is known.
pub fn detect_market(text: &str) -> Option<(MarketKind, Sport)> {
    let lower = text.to_lowercase();
    MARKET_KEYWORDS
        .iter()
        .find(|(phrase, _, _)| lower.contains(phrase))
        .map(|&(_, kind, sport)| (kind, sport))
}
