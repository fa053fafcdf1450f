//! Headless mode for scripted scenarios
//!
//! Runs spell duels without any graphical output, suitable for automated
//! testing and balance checks.
//!
//! ## Usage
//!
//! ```bash
//! # Run a scenario in real time (20 ticks per second)
//! cargo run --release -- demos/duel.json
//!
//! # Step it as fast as possible and print the result as JSON
//! cargo run --release -- demos/duel.json --fast
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "actors": [
//!     { "id": 1, "position": [0, 0, 0], "aim": [1, 0, 0],
//!       "tool": { "owner": 1 }, "loadout": { "Top": "stupefy" } },
//!     { "id": 2, "position": [8, 0, 0], "aim": [-1, 0, 0],
//!       "loadout": { "Top": "expelliarmus" } }
//!   ],
//!   "casts": [ { "tick": 5, "actor": 1, "slot": 0 }, { "tick": 6, "actor": 2, "slot": 0 } ],
//!   "ticks": 100,
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{ScenarioActor, ScenarioConfig, ScriptedCast, ScriptedDisconnect};
pub use runner::{build_scenario_app, run_headless_scenario, simulate_scenario, HeadlessScenarioState, ScenarioResult};
