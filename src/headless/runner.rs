//! Headless scenario execution
//!
//! Runs scripted duel scenarios without any graphical output, suitable for
//! automated testing and balance checks.

use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use serde::Serialize;

use crate::clash::ClashEffectRegistry;
use crate::constants::TICKS_PER_SECOND;
use crate::events::{ActorDisconnected, CastSpellRequest};
use crate::log::{SpellLog, SpellLogEventType};
use crate::session::{Actor, AimDirection, EquippedTool, GameRng, SimulationTick};
use crate::settings::ClashSettings;
use crate::spells::{SpellBook, SpellCatalog};
use crate::systems::{SpellClashPlugin, SpellSystemPhase};

use super::config::ScenarioConfig;

/// Result of a completed headless scenario
///
/// This struct provides programmatic access to scenario results for testing and analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub ticks_run: u64,
    pub casts: usize,
    pub miscasts: usize,
    /// Casts refused because the spell was on cooldown
    pub blocked_casts: usize,
    pub duel_clashes: usize,
    pub projectile_collisions: usize,
    /// Actors dropped by scripted disconnects
    pub purged_actors: usize,
    /// Clash effects still alive when the run ended
    pub active_effects: usize,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Resource to track headless scenario state
#[derive(Resource)]
pub struct HeadlessScenarioState {
    /// Ticks to simulate before stopping
    pub ticks: u64,
    /// Custom output path for the spell log
    pub output_path: Option<PathBuf>,
    pub complete: bool,
    pub random_seed: Option<u64>,
    /// Populated when the scenario completes
    pub result: Option<ScenarioResult>,
}

/// Plugin for headless scenario execution
pub struct HeadlessPlugin {
    pub config: ScenarioConfig,
    pub catalog: SpellCatalog,
    pub settings: ClashSettings,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let game_rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };

        app.insert_resource(self.catalog.clone())
            .insert_resource(game_rng)
            .insert_resource(ScenarioScript(self.config.clone()))
            .insert_resource(HeadlessScenarioState {
                ticks: self.config.ticks,
                output_path: self.config.output_path.as_ref().map(PathBuf::from),
                complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .add_plugins(SpellClashPlugin {
                settings: self.settings.clone(),
            });

        app.add_systems(Startup, headless_setup_scenario)
            .add_systems(
                Update,
                headless_send_scripted_events
                    .after(SpellSystemPhase::Clock)
                    .before(SpellSystemPhase::Bookkeeping),
            )
            .add_systems(
                Update,
                headless_check_scenario_end.after(SpellSystemPhase::Effects),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// The scenario being played, kept for the scripting systems
#[derive(Resource)]
struct ScenarioScript(ScenarioConfig);

/// Spawn actors and load their spell state
fn headless_setup_scenario(
    mut commands: Commands,
    script: Res<ScenarioScript>,
    catalog: Res<SpellCatalog>,
    mut book: ResMut<SpellBook>,
    mut log: ResMut<SpellLog>,
) {
    log.clear();
    log.log(SpellLogEventType::SessionEvent, "Scenario started (headless mode)".to_string());

    for actor in &script.0.actors {
        book.load_actor(actor.id, None);
        for spell in &actor.learned {
            book.learn(actor.id, spell.clone(), &catalog);
        }
        // Validated on load, so resolution only fails for hand-built configs
        match actor.resolved_loadout() {
            Ok(loadout) => {
                for (slot, spell) in loadout {
                    book.learn(actor.id, spell.clone(), &catalog);
                    book.assign_slot(actor.id, slot.index() as i32, Some(spell), &catalog);
                }
            }
            Err(e) => warn!("{}", e),
        }

        let mut entity = commands.spawn((
            Actor::new(actor.id),
            Transform::from_translation(actor.position()),
            AimDirection(actor.aim()),
        ));
        if let Some(tool) = &actor.tool {
            entity.insert(EquippedTool(tool.clone()));
        }
    }

    info!("Headless scenario setup complete: {} actors", script.0.actors.len());
}

/// Send this tick's scripted cast requests and disconnects
fn headless_send_scripted_events(
    script: Res<ScenarioScript>,
    clock: Res<SimulationTick>,
    mut casts: EventWriter<CastSpellRequest>,
    mut disconnects: EventWriter<ActorDisconnected>,
) {
    for disconnect in script.0.disconnects.iter().filter(|d| d.tick == clock.tick) {
        disconnects.send(ActorDisconnected { actor: disconnect.actor });
    }
    for cast in script.0.casts.iter().filter(|c| c.tick == clock.tick) {
        casts.send(CastSpellRequest {
            actor: cast.actor,
            slot: cast.slot,
        });
    }
}

/// Stop once the configured number of ticks has run
fn headless_check_scenario_end(
    clock: Res<SimulationTick>,
    registry: Res<ClashEffectRegistry>,
    mut log: ResMut<SpellLog>,
    mut state: ResMut<HeadlessScenarioState>,
) {
    if state.complete || clock.tick < state.ticks {
        return;
    }

    log.log(
        SpellLogEventType::SessionEvent,
        format!("Scenario ended after {} ticks", clock.tick),
    );

    let result = build_scenario_result(&log, &registry, clock.tick, state.random_seed);
    info!(
        "Scenario complete: {} casts, {} duel clashes, {} projectile collisions",
        result.casts, result.duel_clashes, result.projectile_collisions
    );

    if let Some(path) = &state.output_path {
        match log.save_to_file(path) {
            Ok(()) => println!("Scenario complete. Log saved to: {}", path.display()),
            Err(e) => eprintln!("Failed to save spell log: {}", e),
        }
    }

    state.result = Some(result);
    state.complete = true;
}

/// Build the ScenarioResult from the spell log
fn build_scenario_result(
    log: &SpellLog,
    registry: &ClashEffectRegistry,
    ticks_run: u64,
    random_seed: Option<u64>,
) -> ScenarioResult {
    ScenarioResult {
        ticks_run,
        casts: log.count(SpellLogEventType::Cast),
        miscasts: log.count(SpellLogEventType::Miscast),
        blocked_casts: log.count(SpellLogEventType::CastBlocked),
        duel_clashes: log.count(SpellLogEventType::DuelClash),
        projectile_collisions: log.count(SpellLogEventType::ProjectileCollision),
        purged_actors: log.count(SpellLogEventType::ActorPurged),
        active_effects: registry.len(),
        random_seed,
    }
}

/// Exit the app when the scenario is complete
fn headless_exit_on_complete(state: Res<HeadlessScenarioState>, mut exit: EventWriter<AppExit>) {
    if state.complete {
        exit.send(AppExit::Success);
    }
}

/// Build a headless app for the scenario without starting it.
///
/// Tests drive the returned app with `app.update()`, one call per tick.
pub fn build_scenario_app(config: ScenarioConfig, catalog: SpellCatalog, settings: ClashSettings) -> Result<App, String> {
    config.validate()?;
    config.validate_against(&catalog)?;
    settings.validate()?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(HeadlessPlugin {
            config,
            catalog,
            settings,
        });
    Ok(app)
}

/// Step a scenario to completion as fast as possible and return its result
pub fn simulate_scenario(
    config: ScenarioConfig,
    catalog: SpellCatalog,
    settings: ClashSettings,
) -> Result<ScenarioResult, String> {
    let ticks = config.ticks;
    let mut app = build_scenario_app(config, catalog, settings)?;
    app.finish();
    app.cleanup();

    for _ in 0..ticks {
        app.update();
    }

    app.world()
        .resource::<HeadlessScenarioState>()
        .result
        .clone()
        .ok_or_else(|| "scenario did not complete".to_string())
}

/// Run a headless scenario in real time at the simulation tick rate
pub fn run_headless_scenario(config: ScenarioConfig, catalog: SpellCatalog, settings: ClashSettings) -> Result<(), String> {
    config.validate()?;
    config.validate_against(&catalog)?;
    settings.validate()?;

    println!("Starting headless scenario...");
    println!("  Actors: {}", config.actors.len());
    println!("  Scripted casts: {}", config.casts.len());
    println!("  Ticks: {}", config.ticks);

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / f64::from(TICKS_PER_SECOND),
            ))),
        )
        .add_plugins(LogPlugin::default())
        .add_plugins(HeadlessPlugin {
            config,
            catalog,
            settings,
        })
        .run();

    Ok(())
}
