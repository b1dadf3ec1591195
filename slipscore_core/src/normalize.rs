//! Entity Normalizer.
//!
//! Turns raw slip text (typed or OCR-derived) into leg-candidate substrings:
//! - strips OCR artifacts (backticks, stray pipes, unicode dashes)
//! - drops sportsbook metadata lines ("cash out", "bet max", "sgp", ...)
//! - splits multi-leg input on "Parlay:" markers, newlines, and a
//!   conjunction heuristic
//! - folds odds-movement and standalone-odds lines into the preceding leg
//!
//! Never fails: empty or whitespace-only input produces an empty vec, which
//! downstream stages treat as "no legs found".

use std::sync::OnceLock;

use regex::Regex;

/// One substring of the raw input believed to describe a single wager.
#[derive(Debug, Clone, PartialEq)]
pub struct LegCandidate {
    pub text: String,
    /// Byte offset of the candidate's first line in the raw input.
    pub offset: usize,
}

/// A cleaned lowercase word with its byte offset into the candidate text.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedToken {
    pub text: String,
    pub offset: usize,
}

/// Lines that describe slip chrome rather than a wager.
const METADATA_TERMS: &[&str] = &[
    "risk",
    "to win",
    "bet max",
    "cash out",
    "available",
    "selection",
    "suspended",
    "same game parlay",
    "sgp",
    "in-play",
];

fn odds_movement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)odds have (?:increased|decreased|changed) from [+-]\d+ to ([+-]\d+)")
            .unwrap()
    })
}

fn standalone_odds_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]\d{2,4}$").unwrap())
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9][A-Za-z0-9.'+-]*").unwrap())
}

/// Remove OCR noise from one line and collapse whitespace.
pub fn clean_line(line: &str) -> String {
    let mut cleaned = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '`' | '|' | '\u{200b}' | '\u{feff}' => cleaned.push(' '),
            '\u{2013}' | '\u{2014}' | '\u{2212}' => cleaned.push('-'),
            '\u{2019}' => cleaned.push('\''),
            _ => cleaned.push(ch),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_metadata_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    METADATA_TERMS.iter().any(|term| lower.contains(term))
}

/// Split raw slip text into independent leg candidates.
pub fn split_legs(raw: &str) -> Vec<LegCandidate> {
    let mut candidates: Vec<LegCandidate> = Vec::new();
    let mut offset = 0usize;

    for line in raw.split('\n') {
        let line_offset = offset;
        offset += line.len() + 1;

        let cleaned = clean_line(line);
        if cleaned.is_empty() || is_metadata_line(&cleaned) {
            continue;
        }

        // "Parlay:" is a slip marker; the rest of the line, if any, is a leg.
        let (body, body_shift) = match strip_parlay_marker(&cleaned) {
            Some(rest) => rest,
            None => (cleaned.as_str(), 0),
        };
        if body.is_empty() {
            continue;
        }

        // Odds-movement lines amend the previous leg's odds.
        if let Some(caps) = odds_movement_re().captures(body) {
            if let Some(prev) = candidates.last_mut() {
                prev.text.push_str(" to ");
                prev.text.push_str(&caps[1]);
            }
            continue;
        }

        // A bare odds line belongs to the leg above it.
        if standalone_odds_re().is_match(body) {
            if let Some(prev) = candidates.last_mut() {
                prev.text.push(' ');
                prev.text.push_str(body);
            }
            continue;
        }

        for (piece, piece_shift) in split_conjunction(body) {
            candidates.push(LegCandidate {
                text: piece.to_string(),
                offset: line_offset + body_shift + piece_shift,
            });
        }
    }

    candidates
}

/// Strip a "Parlay:" marker, returning the remainder and its shift into the
/// cleaned line. Handles both a leading marker ("Parlay: Mahomes ...") and
/// header lines that end with it ("3-Leg Parlay:"), which carry no wager.
fn strip_parlay_marker(line: &str) -> Option<(&str, usize)> {
    let lower = line.to_lowercase();
    let marker = lower.find("parlay:")?;
    let rest = line[marker + "parlay:".len()..].trim_start();
    if marker != 0 && !rest.is_empty() {
        return None;
    }
    let shift = line.len() - rest.len();
    Some((rest, shift))
}

/// Split "X and Y" into two candidates when both halves look like wagers
/// (each contains a digit). Single-wager sentences pass through whole.
fn split_conjunction(text: &str) -> Vec<(&str, usize)> {
    if let Some(pos) = text.to_lowercase().find(" and ") {
        let (left, rest) = text.split_at(pos);
        let right = &rest[" and ".len()..];
        let has_digits = |s: &str| s.chars().any(|c| c.is_ascii_digit());
        if has_digits(left) && has_digits(right) {
            return vec![(left.trim_end(), 0), (right, pos + " and ".len())];
        }
    }
    vec![(text, 0)]
}

/// Tokenize one leg candidate into ordered lowercase tokens with offsets.
pub fn tokenize(text: &str) -> Vec<NormalizedToken> {
    token_re()
        .find_iter(text)
        .map(|m| NormalizedToken {
            text: m.as_str().to_lowercase(),
            offset: m.start(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_candidates() {
        assert!(split_legs("").is_empty());
        assert!(split_legs("   \n\n  \t ").is_empty());
    }

    #[test]
    fn test_single_leg_passthrough() {
        let legs = split_legs("Patrick Mahomes over 280.5 passing yards -110");
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].text, "Patrick Mahomes over 280.5 passing yards -110");
        assert_eq!(legs[0].offset, 0);
    }

    #[test]
    fn test_newline_split_and_metadata_filtered() {
        let raw = "Same Game Parlay\nJalen Hurts over 225.5 passing yards -115\nRisk $50 to win $120\nAJ Brown over 70.5 receiving yards -110";
        let legs = split_legs(raw);
        assert_eq!(legs.len(), 2);
        assert!(legs[0].text.starts_with("Jalen Hurts"));
        assert!(legs[1].text.starts_with("AJ Brown"));
    }

    #[test]
    fn test_parlay_marker_stripped() {
        let legs = split_legs("Parlay: LeBron James over 27.5 points -120");
        assert_eq!(legs.len(), 1);
        assert!(legs[0].text.starts_with("LeBron James"));
    }

    #[test]
    fn test_parlay_header_with_leg_count_dropped() {
        let raw = "3-Leg Parlay:\nLeBron James over 27.5 points -120\nStephen Curry over 4.5 three pointers -110";
        let legs = split_legs(raw);
        assert_eq!(legs.len(), 2);
        assert!(legs[0].text.starts_with("LeBron James"));
    }

    #[test]
    fn test_odds_movement_folds_into_previous_leg() {
        let raw =
            "Jalen Hurts over 225.5 passing yards -110\nOdds have decreased from -110 to -125";
        let legs = split_legs(raw);
        assert_eq!(legs.len(), 1);
        assert!(legs[0].text.ends_with("to -125"));
    }

    #[test]
    fn test_standalone_odds_line_attaches() {
        let raw = "Travis Kelce over 5.5 receptions\n-105";
        let legs = split_legs(raw);
        assert_eq!(legs.len(), 1);
        assert!(legs[0].text.ends_with("-105"));
    }

    #[test]
    fn test_conjunction_split() {
        let legs =
            split_legs("Mahomes over 280.5 passing yards -110 and Kelce over 70.5 receiving yards -115");
        assert_eq!(legs.len(), 2);
        assert!(legs[0].text.contains("Mahomes"));
        assert!(legs[1].text.contains("Kelce"));
    }

    #[test]
    fn test_ocr_artifacts_cleaned() {
        assert_eq!(
            clean_line("Patrick  Mahomes | over `280.5`  passing\u{2014}yards"),
            "Patrick Mahomes over 280.5 passing-yards"
        );
    }

    #[test]
    fn test_tokenize_offsets() {
        let tokens = tokenize("Mahomes over 280.5");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "mahomes");
        assert_eq!(tokens[1].offset, 8);
        assert_eq!(tokens[2].text, "280.5");
    }
}
