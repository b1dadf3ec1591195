// Shared models for the slipscore engine
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Sport & Market Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    NFL,
    NBA,
    NHL,
    MLB,
    NCAAF,
    NCAAB,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::NFL => "NFL",
            Sport::NBA => "NBA",
            Sport::NHL => "NHL",
            Sport::MLB => "MLB",
            Sport::NCAAF => "NCAAF",
            Sport::NCAAB => "NCAAB",
        }
    }
}

/// Line-bearing market types the engine can validate and score.
///
/// Moneyline markets carry no line and are outside the scoreable vocabulary;
/// they reject during validation rather than being guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    // Football props
    PassingYards,
    PassingTouchdowns,
    RushingYards,
    ReceivingYards,
    Receptions,
    AnytimeTouchdown,
    // Basketball props
    Points,
    Rebounds,
    Assists,
    ThreePointers,
    // Hockey props
    ShotsOnGoal,
    Goals,
    // Baseball props
    Strikeouts,
    TotalBases,
    Hits,
    // Game lines
    Spread,
    Total,
}

impl MarketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::PassingYards => "passing_yards",
            MarketKind::PassingTouchdowns => "passing_touchdowns",
            MarketKind::RushingYards => "rushing_yards",
            MarketKind::ReceivingYards => "receiving_yards",
            MarketKind::Receptions => "receptions",
            MarketKind::AnytimeTouchdown => "anytime_touchdown",
            MarketKind::Points => "points",
            MarketKind::Rebounds => "rebounds",
            MarketKind::Assists => "assists",
            MarketKind::ThreePointers => "three_pointers",
            MarketKind::ShotsOnGoal => "shots_on_goal",
            MarketKind::Goals => "goals",
            MarketKind::Strikeouts => "strikeouts",
            MarketKind::TotalBases => "total_bases",
            MarketKind::Hits => "hits",
            MarketKind::Spread => "spread",
            MarketKind::Total => "total",
        }
    }

    /// Market family used for correlation grouping.
    pub fn family(&self) -> MarketFamily {
        match self {
            MarketKind::PassingYards | MarketKind::PassingTouchdowns => MarketFamily::Passing,
            MarketKind::RushingYards => MarketFamily::Rushing,
            MarketKind::ReceivingYards | MarketKind::Receptions => MarketFamily::Receiving,
            MarketKind::AnytimeTouchdown
            | MarketKind::Points
            | MarketKind::ThreePointers
            | MarketKind::Goals => MarketFamily::Scoring,
            MarketKind::Rebounds | MarketKind::Assists => MarketFamily::Playmaking,
            MarketKind::ShotsOnGoal | MarketKind::TotalBases | MarketKind::Hits => {
                MarketFamily::Volume
            }
            MarketKind::Strikeouts => MarketFamily::Pitching,
            MarketKind::Spread | MarketKind::Total => MarketFamily::GameLine,
        }
    }

    /// Markets with an implicit line when none is written on the slip
    /// (e.g. anytime touchdown is an over 0.5 scored-TD prop).
    pub fn implicit_line(&self) -> Option<f64> {
        match self {
            MarketKind::AnytimeTouchdown => Some(0.5),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketFamily {
    Passing,
    Rushing,
    Receiving,
    Scoring,
    Playmaking,
    Volume,
    Pitching,
    GameLine,
}

/// Which side of the line the wager takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Team,
}

// ============================================================================
// Validation State Machine
// ============================================================================

/// Per-leg validation state. `Building` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    Building,
    Valid,
    Incomplete,
    Rejected,
}

impl ValidationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ValidationState::Building)
    }
}

// ============================================================================
// Bet Legs
// ============================================================================

/// One wager within a slip. Immutable once it leaves the validator as Valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetLeg {
    pub sport: Sport,
    pub market: MarketKind,
    pub subject: ResolvedEntity,
    pub side: Side,
    pub line: f64,
    pub american_odds: i32,
    pub raw_text: String,
    /// Event/game identifier when the identification backend knows the
    /// subject's upcoming game. Drives same-event correlation detection.
    pub event_id: Option<String>,
    /// External situational keys (weather, injury report) shared across legs.
    pub external_factors: Vec<String>,
}

/// A leg that never reached Valid, kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedLeg {
    pub raw_text: String,
    pub state: ValidationState,
    pub reason: String,
}

/// Entity picked by the resolver for one leg candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub kind: EntityKind,
    pub canonical_name: String,
    /// The substring of the raw input the entity was resolved from.
    pub source_span: String,
    /// Identification confidence in [0, 1].
    pub confidence: f64,
    pub sport: Option<Sport>,
    pub team: Option<String>,
    pub event_id: Option<String>,
    pub external_factors: Vec<String>,
}

// ============================================================================
// Statistical Context
// ============================================================================

/// Historical context for one subject/market pair. Every field is optional:
/// absent means "no data", which is never the same as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatContext {
    pub historical_average: Option<f64>,
    pub std_dev: Option<f64>,
    /// Most recent outcomes for the market stat, newest last.
    pub recent_form: Option<Vec<f64>>,
}

impl StatContext {
    /// True when all context fields are populated.
    pub fn is_complete(&self) -> bool {
        self.historical_average.is_some()
            && self.std_dev.is_some()
            && self.recent_form.as_ref().is_some_and(|f| !f.is_empty())
    }
}

// ============================================================================
// Scoring Output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
        }
    }

    /// One step up, saturating at High.
    pub fn escalate(&self) -> RiskLevel {
        match self {
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium | RiskLevel::High => RiskLevel::High,
        }
    }
}

/// Per-leg scoring result, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegAnalysis {
    pub leg: BetLeg,
    /// Estimated probability the leg wins, in [0, 1].
    pub win_probability: f64,
    /// Per-unit-stake expected value before group-level adjustments.
    pub raw_ev: f64,
    /// Leg-level EV; equals raw_ev (correlation adjusts at group level only).
    pub expected_value: f64,
    pub risk_factors: Vec<String>,
    pub safety_factors: Vec<String>,
    pub risk_level: RiskLevel,
    pub confidence: f64,
}

// ============================================================================
// Correlation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    SameEvent,
    SameMarketFamily,
    SharedExternalFactor,
}

/// One detected pairwise relationship. Indices refer to the scored leg set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEdge {
    pub leg_a: usize,
    pub leg_b: usize,
    pub kind: CorrelationKind,
    /// Multiplicative penalty in (0, 1].
    pub penalty: f64,
}

// ============================================================================
// Group Recommendation (terminal output)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Pass,
    Consider,
    StrongConsider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecommendation {
    pub request_id: Uuid,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub expected_value: f64,
    pub raw_ev: f64,
    pub risk_assessment: RiskLevel,
    /// Group independence multiplier in (0, 1]; 1.0 means fully independent.
    pub correlation_multiplier: f64,
    pub key_factors: Vec<String>,
    pub leg_analyses: Vec<LegAnalysis>,
    pub skipped_legs: Vec<SkippedLeg>,
    pub timestamp: DateTime<Utc>,
}
