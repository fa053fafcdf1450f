//! Command-line interface for spellclash
//!
//! Runs headless scenarios, either paced in real time or stepped as fast as possible.

use clap::Parser;
use std::path::PathBuf;

use crate::settings::DEFAULT_SETTINGS_PATH;
use crate::spells::DEFAULT_CATALOG_PATH;

/// Spell-casting and clash-detection simulator
#[derive(Parser, Debug)]
#[command(name = "spellclash")]
#[command(about = "Spell-casting and clash-detection simulator")]
#[command(version)]
pub struct Args {
    /// Scenario JSON file to run
    #[arg(value_name = "SCENARIO_FILE")]
    pub scenario: PathBuf,

    /// Output path for the spell log (overrides the scenario's output_path)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Number of ticks to simulate (overrides the scenario's ticks)
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Seed for the random number generator (overrides the scenario's seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Spell catalog (RON)
    #[arg(long, value_name = "CATALOG_FILE", default_value = DEFAULT_CATALOG_PATH)]
    pub catalog: PathBuf,

    /// Clash settings (RON); missing files fall back to defaults
    #[arg(long, value_name = "SETTINGS_FILE", default_value = DEFAULT_SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Step the scenario without real-time pacing and print the result as JSON
    #[arg(long)]
    pub fast: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
