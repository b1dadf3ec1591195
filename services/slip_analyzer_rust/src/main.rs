//! Slip Analyzer Rust Service
//!
//! Command-line front end for the slipscore engine.
//!
//! This service:
//! - Reads raw bet-slip text from the command line or stdin
//! - Resolves players and teams against the built-in roster index
//! - Validates, scores, and correlation-adjusts every leg
//! - Prints the group recommendation as pretty JSON on stdout
//!
//! Event assignments and situational factors come from the environment:
//! `SLIP_EVENT_MAP=KC=nfl-kc-buf,BUF=nfl-kc-buf` and
//! `SLIP_FACTOR_MAP=nfl-kc-buf=wind_20mph`.

use std::env;
use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;

use slipscore_core::config::AnalysisConfig;
use slipscore_core::providers::NoStatProvider;
use slipscore_core::resolve::index::RosterIndex;
use slipscore_core::SlipAnalyzer;

fn roster_from_env() -> RosterIndex {
    let mut index = RosterIndex::new();
    if let Ok(map) = env::var("SLIP_EVENT_MAP") {
        for pair in map.split(',').filter(|p| !p.trim().is_empty()) {
            if let Some((team, event)) = pair.split_once('=') {
                index = index.with_event(team.trim(), event.trim());
            }
        }
    }
    if let Ok(map) = env::var("SLIP_FACTOR_MAP") {
        for pair in map.split(',').filter(|p| !p.trim().is_empty()) {
            if let Some((event, factor)) = pair.split_once('=') {
                index = index.with_external_factor(event.trim(), factor.trim());
            }
        }
    }
    index
}

fn read_slip_text() -> Result<String> {
    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        return Ok(args.join(" "));
    }
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read slip text from stdin")?;
    Ok(buffer)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting Slip Analyzer Rust Service...");

    let config = AnalysisConfig::from_env();
    let analyzer = SlipAnalyzer::new(
        config,
        Arc::new(roster_from_env()),
        Arc::new(NoStatProvider),
    )?;

    let text = read_slip_text()?;
    let result = analyzer.analyze(&text).await?;

    info!(
        "analyzed {} legs ({} skipped): {:?}",
        result.leg_analyses.len(),
        result.skipped_legs.len(),
        result.recommendation
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
