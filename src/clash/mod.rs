//! Clash tracking, detection and effects
//!
//! - `tracker`: active casts eligible for duel clashes
//! - `detector`: duel and projectile clash geometry plus the scanning systems
//! - `effects`: clash effect lifecycle and pulse emission
//! - `projectiles`: in-flight spell projectiles

pub mod detector;
pub mod effects;
pub mod projectiles;
pub mod tracker;

use bevy::prelude::*;

use crate::settings::ClashSettings;

pub use detector::{
    detect_duel_clash, detect_duel_clashes, detect_projectile_collisions, duel_intensity, find_projectile_collisions,
    scan_duel_clashes, DuelClash, ProjectileSample,
};
pub use effects::{jagged_path, tick_clash_effects, ClashEffect, ClashEffectRegistry, EffectPhase};
pub use projectiles::{move_spell_projectiles, ProjectileKind, SpellProjectile};
pub use tracker::{ActiveSpellCast, CastTracker};

/// Drop casts that fell out of the tracking window.
pub fn prune_expired_casts(mut tracker: ResMut<CastTracker>, tick: Res<crate::session::SimulationTick>) {
    if tracker.is_empty() {
        return;
    }
    let pruned = tracker.prune(tick.tick);
    if pruned > 0 {
        debug!("Pruned {} expired casts at tick {}", pruned, tick.tick);
    }
}

/// Push changed settings into the tracker and effect registry.
pub fn apply_clash_settings(
    settings: Res<ClashSettings>,
    mut tracker: ResMut<CastTracker>,
    mut registry: ResMut<ClashEffectRegistry>,
) {
    if !settings.is_changed() {
        return;
    }
    tracker.configure(&settings);
    registry.configure(&settings);
    info!(
        "Clash settings applied: enabled={}, range={}, window={} ticks",
        settings.enabled, settings.clash_range, settings.cast_track_ticks
    );
}
