//! Bet Leg Builder & Validator.
//!
//! `LegBuilder` progressively fills subject, market, line, and odds from one
//! leg-candidate substring, then `finish` drives the validation state
//! machine: `Building -> Valid | Incomplete | Rejected`.
//!
//! Skip rather than guess: a leg missing information is recorded with a
//! reason and excluded from scoring, never completed with defaults. The same
//! substring always produces the same terminal state and reason.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{BetLeg, MarketKind, ResolvedEntity, Side, SkippedLeg, Sport, ValidationState};
use crate::vocab::{self, MarketVocabulary};

/// Terminal outcome for one leg candidate.
#[derive(Debug, Clone)]
pub enum LegOutcome {
    Valid(BetLeg),
    Skipped(SkippedLeg),
}

impl LegOutcome {
    pub fn state(&self) -> ValidationState {
        match self {
            LegOutcome::Valid(_) => ValidationState::Valid,
            LegOutcome::Skipped(skipped) => skipped.state,
        }
    }
}

fn side_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "over 280.5", "Under 24", "o280.5", "u 6.5"
    RE.get_or_init(|| Regex::new(r"(?i)\b(over|under|o|u)\s*(\d+(?:\.\d+)?)").unwrap())
}

fn odds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // American odds are signed three-or-four digit integers
    RE.get_or_init(|| Regex::new(r"([+-]\d{3,4})(?:\b|$)").unwrap())
}

fn spread_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Spread lines are small signed numbers, usually with a half point
    RE.get_or_init(|| Regex::new(r"([+-]\d{1,2}(?:\.\d+)?)(?:\s|$)").unwrap())
}

/// Builder for a single leg. Fields fill in any order while in `Building`;
/// `finish` freezes the outcome.
#[derive(Debug, Clone)]
pub struct LegBuilder {
    raw_text: String,
    subject: Option<ResolvedEntity>,
    market: Option<(MarketKind, Sport)>,
    side: Side,
    line: Option<f64>,
    odds: Option<i32>,
    state: ValidationState,
}

impl LegBuilder {
    /// Parse market phrasing, side, line, and odds from a leg candidate.
    /// The subject arrives separately from the resolver.
    pub fn from_candidate(text: &str) -> Self {
        let market = vocab::detect_market(text);

        let mut side = Side::Over;
        let mut line = None;
        if let Some(caps) = side_line_re().captures(text) {
            side = match caps[1].to_lowercase().as_str() {
                "under" | "u" => Side::Under,
                _ => Side::Over,
            };
            line = caps[2].parse::<f64>().ok();
        }

        // The last odds token wins so that folded odds-movement text
        // ("... -110 to -125") resolves to the newest price.
        let odds = odds_re()
            .captures_iter(text)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .last();

        // Spreads carry their line as a small signed number ("Chiefs -7.5")
        // rather than an over/under phrase.
        if line.is_none() {
            if let Some((MarketKind::Spread, _)) = market {
                line = spread_line_re()
                    .captures_iter(text)
                    .filter_map(|caps| caps[1].parse::<f64>().ok())
                    .find(|v| v.abs() < 100.0);
            }
        }

        Self {
            raw_text: text.to_string(),
            subject: None,
            market,
            side,
            line,
            odds,
            state: ValidationState::Building,
        }
    }

    pub fn with_subject(mut self, subject: Option<ResolvedEntity>) -> Self {
        self.subject = subject;
        self
    }

    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Run the terminal transition. Rejection (unclear subject, unknown
    /// market) is checked before completeness, completeness before range.
    pub fn finish(mut self, vocabulary: &MarketVocabulary) -> LegOutcome {
        let subject = match self.subject.take() {
            Some(subject) => subject,
            None => {
                return self.reject(
                    "could not identify a player or team above the confidence threshold",
                )
            }
        };

        let (kind, default_sport) = match self.market {
            Some(market) => market,
            None => return self.reject("unrecognized market phrase"),
        };

        let sport = subject.sport.unwrap_or(default_sport);
        let range = match vocabulary.range(sport, kind) {
            Some(range) => range,
            None => {
                return self.reject(&format!(
                    "market {} is not offered for {}",
                    kind.as_str(),
                    sport.as_str()
                ))
            }
        };

        let line = match self.line.or_else(|| kind.implicit_line()) {
            Some(line) => line,
            None => return self.incomplete("no line value found"),
        };
        let odds = match self.odds {
            Some(odds) => odds,
            None => return self.incomplete("no odds found"),
        };

        if !range.line_in_range(line) {
            return self.incomplete(&format!(
                "line {} outside valid range [{}, {}]",
                line, range.line_min, range.line_max
            ));
        }
        if !range.odds_in_range(odds) {
            return self.incomplete(&format!(
                "odds {} outside valid range [{}, {}]",
                odds, range.odds_min, range.odds_max
            ));
        }

        self.state = ValidationState::Valid;
        LegOutcome::Valid(BetLeg {
            sport,
            market: kind,
            side: self.side,
            line,
            american_odds: odds,
            raw_text: self.raw_text,
            event_id: subject.event_id.clone(),
            external_factors: subject.external_factors.clone(),
            subject,
        })
    }

    fn reject(mut self, reason: &str) -> LegOutcome {
        self.state = ValidationState::Rejected;
        LegOutcome::Skipped(SkippedLeg {
            raw_text: self.raw_text,
            state: ValidationState::Rejected,
            reason: reason.to_string(),
        })
    }

    fn incomplete(mut self, reason: &str) -> LegOutcome {
        self.state = ValidationState::Incomplete;
        LegOutcome::Skipped(SkippedLeg {
            raw_text: self.raw_text,
            state: ValidationState::Incomplete,
            reason: reason.to_string(),
        })
    }
}
