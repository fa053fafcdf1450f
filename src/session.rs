//! Session state shared by the spell and clash systems
//!
//! The simulation clock, the components actors carry, the seedable RNG, and
//! the world-load/unload and disconnect bookkeeping.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::clash::{CastTracker, ClashEffectRegistry, SpellProjectile};
use crate::constants::{EYE_HEIGHT, WAND_REACH};
use crate::events::ActorDisconnected;
use crate::log::{SpellLog, SpellLogEventType};
use crate::spells::{ActorId, SpellBook, Tool};

// ============================================================================
// Clock
// ============================================================================

/// Monotonic simulation tick, advanced once per schedule run.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTick {
    pub tick: u64,
}

pub fn advance_simulation_tick(mut clock: ResMut<SimulationTick>, mut log: ResMut<SpellLog>) {
    clock.tick += 1;
    log.tick = clock.tick;
}

// ============================================================================
// Actor components
// ============================================================================

/// Marks an entity as a spell-casting actor.
#[derive(Component, Debug, Clone, Copy)]
pub struct Actor {
    pub id: ActorId,
    /// Dead actors keep their state but can't cast or clash
    pub alive: bool,
}

impl Actor {
    pub fn new(id: ActorId) -> Self {
        Self { id, alive: true }
    }
}

/// Where the actor is looking. Falls back to the transform's forward when absent.
#[derive(Component, Debug, Clone, Copy)]
pub struct AimDirection(pub Vec3);

/// The tool in the actor's hand, for affinity.
#[derive(Component, Debug, Clone)]
pub struct EquippedTool(pub Tool);

/// Wand tip for an actor standing at `feet` and aiming along `aim`.
pub fn wand_position(feet: Vec3, aim: Vec3) -> Vec3 {
    feet + Vec3::Y * EYE_HEIGHT + aim * WAND_REACH
}

// ============================================================================
// Randomness
// ============================================================================

/// Seeded random number generator for miscast/crit rolls and effect jitter.
/// A fixed seed makes a whole session reproducible.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// ============================================================================
// Disconnect and world unload
// ============================================================================

/// What was dropped for a departing actor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub had_state: bool,
    pub had_cast: bool,
    pub projectiles: usize,
}

/// Drop an actor's spell state and tracked cast.
pub fn purge_actor_session(book: &mut SpellBook, tracker: &mut CastTracker, actor: ActorId) -> PurgeReport {
    PurgeReport {
        had_state: book.purge_actor(actor).is_some(),
        had_cast: tracker.forget(actor).is_some(),
        projectiles: 0,
    }
}

/// Handle `ActorDisconnected`: state, tracked cast and in-flight projectiles go.
pub fn purge_disconnected_actors(
    mut commands: Commands,
    mut disconnects: EventReader<ActorDisconnected>,
    mut book: ResMut<SpellBook>,
    mut tracker: ResMut<CastTracker>,
    mut log: ResMut<SpellLog>,
    projectiles: Query<(Entity, &SpellProjectile)>,
) {
    for event in disconnects.read() {
        let mut report = purge_actor_session(&mut book, &mut tracker, event.actor);
        report.projectiles =
            crate::clash::projectiles::despawn_owned_projectiles(&mut commands, projectiles.iter(), event.actor);

        if report == PurgeReport::default() {
            debug!("{}: disconnect with nothing to purge", event.actor);
            continue;
        }

        log.log_for(
            SpellLogEventType::ActorPurged,
            Some(event.actor),
            None,
            format!(
                "{} disconnected (state: {}, cast: {}, projectiles: {})",
                event.actor, report.had_state, report.had_cast, report.projectiles
            ),
        );
    }
}

/// World unload: drop every registry's contents.
pub fn clear_session(world: &mut World) {
    if let Some(mut book) = world.get_resource_mut::<SpellBook>() {
        book.clear();
    }
    if let Some(mut tracker) = world.get_resource_mut::<CastTracker>() {
        tracker.clear();
    }
    if let Some(mut registry) = world.get_resource_mut::<ClashEffectRegistry>() {
        registry.clear();
    }
    if let Some(mut log) = world.get_resource_mut::<SpellLog>() {
        log.clear();
    }
    if let Some(mut clock) = world.get_resource_mut::<SimulationTick>() {
        clock.tick = 0;
    }

    let projectiles: Vec<Entity> = world
        .query_filtered::<Entity, With<SpellProjectile>>()
        .iter(world)
        .collect();
    for entity in projectiles {
        world.despawn(entity);
    }

    info!("Spell session cleared");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wand_sits_in_front_of_the_eyes() {
        let tip = wand_position(Vec3::new(1.0, 0.0, 0.0), Vec3::Z);
        assert_eq!(tip, Vec3::new(1.0, EYE_HEIGHT, WAND_REACH));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut a = GameRng::from_seed(42);
        let mut b = GameRng::from_seed(42);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
        assert_eq!(a.seed, Some(42));
    }

    #[test]
    fn test_purge_reports_what_existed() {
        let mut book = SpellBook::new();
        let mut tracker = CastTracker::default();
        book.load_actor(ActorId(1), None);
        tracker.track(ActorId(1), Vec3::ZERO, Vec3::X, "stupefy".into(), 0);

        let report = purge_actor_session(&mut book, &mut tracker, ActorId(1));
        assert!(report.had_state && report.had_cast);

        let again = purge_actor_session(&mut book, &mut tracker, ActorId(1));
        assert_eq!(again, PurgeReport::default());
    }
}
