//! Index-backed entity identification.
//!
//! A deterministic `EntityIdentifier` over a static roster with aliases,
//! scored with Jaro-Winkler similarity. Serves as the offline backend for the
//! analyzer service and as the reference implementation for tests; an
//! LLM-backed identifier plugs into the same trait from outside the core.

use anyhow::Result;
use async_trait::async_trait;
use rustc_hash::FxHashMap;
use strsim::jaro_winkler;

use super::{Candidate, EntityIdentifier};
use crate::models::{EntityKind, Sport};
use crate::normalize;

/// Minimum similarity for an entry to be reported as a candidate at all.
/// Acceptance is the resolver's call; this only trims obvious noise.
const MIN_CANDIDATE_SCORE: f64 = 0.3;

struct RosterEntry {
    canonical: &'static str,
    aliases: &'static [&'static str],
    kind: EntityKind,
    sport: Sport,
    team: &'static str,
}

/// Built-in roster. Aliases cover last names, initials, and common
/// OCR-mangled short forms.
static ROSTER: &[RosterEntry] = &[
    // NFL players
    RosterEntry {
        canonical: "Patrick Mahomes",
        aliases: &["mahomes", "p. mahomes", "pat mahomes"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "KC",
    },
    RosterEntry {
        canonical: "Travis Kelce",
        aliases: &["kelce", "t. kelce"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "KC",
    },
    RosterEntry {
        canonical: "Jalen Hurts",
        aliases: &["hurts", "j. hurts"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "PHI",
    },
    RosterEntry {
        canonical: "AJ Brown",
        aliases: &["a.j. brown", "aj brown"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "PHI",
    },
    RosterEntry {
        canonical: "Matthew Stafford",
        aliases: &["stafford", "m. stafford"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "LAR",
    },
    RosterEntry {
        canonical: "Cooper Kupp",
        aliases: &["kupp", "c. kupp"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "LAR",
    },
    RosterEntry {
        canonical: "Josh Allen",
        aliases: &["j. allen", "josh allen"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "BUF",
    },
    RosterEntry {
        canonical: "Saquon Barkley",
        aliases: &["barkley", "s. barkley"],
        kind: EntityKind::Player,
        sport: Sport::NFL,
        team: "PHI",
    },
    // NBA players
    RosterEntry {
        canonical: "LeBron James",
        aliases: &["lebron", "l. james"],
        kind: EntityKind::Player,
        sport: Sport::NBA,
        team: "LAL",
    },
    RosterEntry {
        canonical: "Stephen Curry",
        aliases: &["curry", "steph curry", "s. curry"],
        kind: EntityKind::Player,
        sport: Sport::NBA,
        team: "GSW",
    },
    RosterEntry {
        canonical: "Nikola Jokic",
        aliases: &["jokic", "n. jokic"],
        kind: EntityKind::Player,
        sport: Sport::NBA,
        team: "DEN",
    },
    // NHL / MLB players
    RosterEntry {
        canonical: "Connor McDavid",
        aliases: &["mcdavid", "c. mcdavid"],
        kind: EntityKind::Player,
        sport: Sport::NHL,
        team: "EDM",
    },
    RosterEntry {
        canonical: "Aaron Judge",
        aliases: &["judge", "a. judge"],
        kind: EntityKind::Player,
        sport: Sport::MLB,
        team: "NYY",
    },
    RosterEntry {
        canonical: "Shohei Ohtani",
        aliases: &["ohtani", "s. ohtani"],
        kind: EntityKind::Player,
        sport: Sport::MLB,
        team: "LAD",
    },
    // Teams
    RosterEntry {
        canonical: "Kansas City Chiefs",
        aliases: &["chiefs", "kansas city", "kc chiefs"],
        kind: EntityKind::Team,
        sport: Sport::NFL,
        team: "KC",
    },
    RosterEntry {
        canonical: "Philadelphia Eagles",
        aliases: &["eagles", "philadelphia", "phi eagles"],
        kind: EntityKind::Team,
        sport: Sport::NFL,
        team: "PHI",
    },
    RosterEntry {
        canonical: "Buffalo Bills",
        aliases: &["bills", "buffalo"],
        kind: EntityKind::Team,
        sport: Sport::NFL,
        team: "BUF",
    },
    RosterEntry {
        canonical: "Los Angeles Rams",
        aliases: &["rams", "la rams"],
        kind: EntityKind::Team,
        sport: Sport::NFL,
        team: "LAR",
    },
    RosterEntry {
        canonical: "Los Angeles Lakers",
        aliases: &["lakers", "la lakers"],
        kind: EntityKind::Team,
        sport: Sport::NBA,
        team: "LAL",
    },
    RosterEntry {
        canonical: "Boston Celtics",
        aliases: &["celtics", "boston"],
        kind: EntityKind::Team,
        sport: Sport::NBA,
        team: "BOS",
    },
];

/// Deterministic roster-backed identifier.
///
/// Event assignments and external factor tags (weather keys, injury reports)
/// change game to game, so they are configured per instance rather than
/// baked into the static roster.
#[derive(Debug, Clone, Default)]
pub struct RosterIndex {
    /// Team abbreviation -> upcoming event id.
    events: FxHashMap<String, String>,
    /// Event id -> situational factor keys.
    factors: FxHashMap<String, Vec<String>>,
}

impl RosterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a team to an upcoming event.
    pub fn with_event(mut self, team: &str, event_id: &str) -> Self {
        self.events.insert(team.to_string(), event_id.to_string());
        self
    }

    /// Tag an event with an external situational factor key.
    pub fn with_external_factor(mut self, event_id: &str, factor: &str) -> Self {
        self.factors
            .entry(event_id.to_string())
            .or_default()
            .push(factor.to_string());
        self
    }

    /// Best similarity between any roster alias and any 1-3 token window of
    /// the candidate text, mapped onto confidence tiers. Raw similarity is
    /// only trusted near-verbatim; mid-band matches are discounted so that
    /// garbled names fall below the acceptance threshold.
    fn score_entry(entry: &RosterEntry, windows: &[String]) -> f64 {
        let mut best = 0.0f64;
        for window in windows {
            for name in std::iter::once(&entry.canonical)
                .chain(entry.aliases.iter())
                .map(|n| n.to_lowercase())
            {
                let sim = jaro_winkler(&name, window);
                let tiered = if sim >= 0.999 {
                    1.0
                } else if sim >= 0.93 {
                    0.9
                } else if sim >= 0.85 {
                    0.75
                } else {
                    sim * 0.6
                };
                best = best.max(tiered);
            }
        }
        best
    }
}

#[async_trait]
impl EntityIdentifier for RosterIndex {
    async fn identify(&self, text: &str) -> Result<Vec<Candidate>> {
        let tokens = normalize::tokenize(text);
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();

        // Sliding 1-3 token windows; names never span more than three tokens.
        let mut windows = Vec::new();
        for width in 1..=3usize.min(words.len().max(1)) {
            for chunk in words.windows(width) {
                windows.push(chunk.join(" "));
            }
        }

        let mut candidates = Vec::new();
        for entry in ROSTER {
            let score = Self::score_entry(entry, &windows);
            if score < MIN_CANDIDATE_SCORE {
                continue;
            }
            let event_id = self.events.get(entry.team).cloned();
            let external_factors = event_id
                .as_ref()
                .and_then(|event| self.factors.get(event))
                .cloned()
                .unwrap_or_default();
            candidates.push(Candidate {
                name: entry.canonical.to_string(),
                kind: entry.kind,
                score,
                sport: Some(entry.sport),
                team: Some(entry.team.to_string()),
                event_id,
                external_factors,
            });
        }
        Ok(candidates)
    }

    fn identifier_name(&self) -> &str {
        "roster_index"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;

    #[tokio::test]
    async fn test_exact_name_scores_full_confidence() {
        let index = RosterIndex::new();
        let candidates = index
            .identify("Patrick Mahomes over 280.5 passing yards -110")
            .await
            .unwrap();
        let mahomes = candidates
            .iter()
            .find(|c| c.name == "Patrick Mahomes")
            .unwrap();
        assert!((mahomes.score - 1.0).abs() < 1e-9);
        assert_eq!(mahomes.team.as_deref(), Some("KC"));
    }

    #[tokio::test]
    async fn test_alias_and_initials_resolve() {
        let index = RosterIndex::new();
        let resolver = Resolver::new(0.6);
        let resolved = resolver
            .resolve(&index, "J. Hurts over 225.5 passing yards -115")
            .await
            .unwrap();
        assert_eq!(resolved.canonical_name, "Jalen Hurts");
    }

    #[tokio::test]
    async fn test_garbled_name_stays_below_threshold() {
        let index = RosterIndex::new();
        let resolver = Resolver::new(0.6);
        let resolved = resolver.resolve(&index, "mauinew susnura over 50 yards").await;
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_event_and_factor_tags_flow_through() {
        let index = RosterIndex::new()
            .with_event("KC", "nfl-kc-buf")
            .with_event("BUF", "nfl-kc-buf")
            .with_external_factor("nfl-kc-buf", "wind_20mph");
        let candidates = index.identify("Mahomes passing yards").await.unwrap();
        let mahomes = candidates
            .iter()
            .find(|c| c.name == "Patrick Mahomes")
            .unwrap();
        assert_eq!(mahomes.event_id.as_deref(), Some("nfl-kc-buf"));
        assert_eq!(mahomes.external_factors, vec!["wind_20mph".to_string()]);
    }

    #[tokio::test]
    async fn test_identification_is_deterministic() {
        let index = RosterIndex::new();
        let a = index.identify("Kelce anytime touchdown +130").await.unwrap();
        let b = index.identify("Kelce anytime touchdown +130").await.unwrap();
        let names_a: Vec<_> = a.iter().map(|c| (&c.name, c.score)).collect();
        let names_b: Vec<_> = b.iter().map(|c| (&c.name, c.score)).collect();
        assert_eq!(names_a, names_b);
    }
}
