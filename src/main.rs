//! Spellclash - Spell-casting state and clash-detection engine
//!
//! Runs a scripted headless scenario from the command line.

use std::process::ExitCode;

use spellclash::cli;
use spellclash::headless::{run_headless_scenario, simulate_scenario, ScenarioConfig};
use spellclash::settings::ClashSettings;
use spellclash::spells::load_spell_catalog;

fn main() -> ExitCode {
    let args = cli::parse_args();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: cli::Args) -> Result<(), String> {
    let mut config = ScenarioConfig::load_from_file(&args.scenario)?;
    if let Some(output) = &args.output {
        config.output_path = Some(output.display().to_string());
    }
    if let Some(ticks) = args.ticks {
        config.ticks = ticks;
    }
    if args.seed.is_some() {
        config.random_seed = args.seed;
    }

    let catalog = load_spell_catalog(&args.catalog)?;
    let settings = ClashSettings::load(&args.settings);

    if args.fast {
        let result = simulate_scenario(config, catalog, settings)?;
        let json = serde_json::to_string_pretty(&result).map_err(|e| format!("Failed to serialize result: {}", e))?;
        println!("{}", json);
        Ok(())
    } else {
        run_headless_scenario(config, catalog, settings)
    }
}
