//! Spell System Registration
//!
//! Shared system ordering so the headless runner, tests and any host app run
//! the exact same per-tick pipeline:
//!
//! 1. **Clock**: advance the tick, pick up settings changes
//! 2. **Bookkeeping**: disconnect purge, cooldown tick, cast requests,
//!    projectile movement
//! 3. **Detection**: prune expired casts, projectile collisions, duel clashes
//! 4. **Effects**: age clash effects and emit pulses
//!
//! Cooldowns tick exactly once per schedule run. Adding
//! `tick_spell_cooldowns` anywhere else halves every cooldown.

use bevy::prelude::*;

use crate::clash::{
    apply_clash_settings, detect_duel_clashes, detect_projectile_collisions, move_spell_projectiles,
    prune_expired_casts, tick_clash_effects, CastTracker, ClashEffectRegistry,
};
use crate::events::{
    ActorDisconnected, CastResolved, CastSpellRequest, ClashOccurred, ClashPulseEvent, ClashVisualEvent,
};
use crate::log::SpellLog;
use crate::session::{advance_simulation_tick, purge_disconnected_actors, GameRng, SimulationTick};
use crate::settings::ClashSettings;
use crate::spells::{process_cast_requests, tick_spell_cooldowns, Affinity, SpellBook, SpellCatalog};

/// Phases of one simulation tick, run in this order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpellSystemPhase {
    Clock,
    Bookkeeping,
    Detection,
    Effects,
}

pub fn configure_spell_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SpellSystemPhase::Clock,
            SpellSystemPhase::Bookkeeping,
            SpellSystemPhase::Detection,
            SpellSystemPhase::Effects,
        )
            .chain(),
    );
}

/// Add the per-tick pipeline, gated by `run_condition`.
pub fn add_core_spell_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    app.add_systems(
        Update,
        (advance_simulation_tick, apply_clash_settings)
            .chain()
            .in_set(SpellSystemPhase::Clock)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        (
            purge_disconnected_actors,
            tick_spell_cooldowns,
            process_cast_requests,
            move_spell_projectiles,
        )
            .chain()
            .in_set(SpellSystemPhase::Bookkeeping)
            .run_if(run_condition.clone()),
    );

    // Despawns from the purge and fresh projectiles must be visible to the scan
    app.add_systems(
        Update,
        apply_deferred
            .after(SpellSystemPhase::Bookkeeping)
            .before(SpellSystemPhase::Detection)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        (prune_expired_casts, detect_projectile_collisions, detect_duel_clashes)
            .chain()
            .in_set(SpellSystemPhase::Detection)
            .run_if(run_condition.clone()),
    );

    app.add_systems(
        Update,
        tick_clash_effects
            .in_set(SpellSystemPhase::Effects)
            .run_if(run_condition),
    );
}

/// Inserts every spell registry into the world and schedules the pipeline.
///
/// The catalog is only initialized empty if the host hasn't inserted one
/// (for example through `SpellCatalogPlugin`) before this plugin is built.
#[derive(Default)]
pub struct SpellClashPlugin {
    pub settings: ClashSettings,
}

impl Plugin for SpellClashPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone())
            .insert_resource(CastTracker::from_settings(&self.settings))
            .insert_resource(ClashEffectRegistry::from_settings(&self.settings))
            .init_resource::<SpellBook>()
            .init_resource::<SpellCatalog>()
            .init_resource::<SpellLog>()
            .init_resource::<SimulationTick>()
            .init_resource::<GameRng>()
            .init_resource::<Affinity>()
            .add_event::<CastSpellRequest>()
            .add_event::<CastResolved>()
            .add_event::<ActorDisconnected>()
            .add_event::<ClashVisualEvent>()
            .add_event::<ClashPulseEvent>()
            .add_event::<ClashOccurred>();

        configure_spell_system_ordering(app);
        add_core_spell_systems(app, || true);
    }
}
