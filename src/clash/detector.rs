//! Clash detection
//!
//! Two kinds of clash:
//! - **Duel**: two actors with tracked casts, within range, each aiming at the
//!   other. Checked for every unordered pair on every tick while both casts
//!   are tracked, so a sustained face-off keeps producing clashes.
//! - **Projectile**: two in-flight spell projectiles from different owners
//!   passing within the collision distance. Both projectiles are consumed and
//!   the effect arcs between the owners' wands through the meeting point.
//!
//! The geometry lives in pure functions; the systems below gather ECS data,
//! call them, and hand matches to the `ClashEffectRegistry`.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use smallvec::SmallVec;

use super::effects::ClashEffectRegistry;
use super::projectiles::SpellProjectile;
use super::tracker::{ActiveSpellCast, CastTracker};
use crate::events::{ClashKind, ClashOccurred, ClashVisualEvent};
use crate::log::{SpellLog, SpellLogEventType};
use crate::session::{wand_position, Actor, AimDirection, GameRng};
use crate::settings::ClashSettings;
use crate::spells::{ActorId, SpellCatalog, SpellId};

/// Intensity of a projectile collision effect.
pub const PROJECTILE_CLASH_INTENSITY: f32 = 1.0;

/// True when two casters are close enough and aim at each other.
///
/// Symmetric in its arguments. Casters at the same point never clash since
/// there is no direction between them.
pub fn detect_duel_clash(a: &ActiveSpellCast, b: &ActiveSpellCast, range: f32, facing_threshold: f32) -> bool {
    if a.origin.distance(b.origin) > range {
        return false;
    }

    let toward_b = (b.origin - a.origin).normalize_or_zero();
    let toward_a = (a.origin - b.origin).normalize_or_zero();

    let dot_a = a.aim.dot(toward_b);
    let dot_b = b.aim.dot(toward_a);

    dot_a > facing_threshold && dot_b > facing_threshold
}

/// A matched duel pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DuelClash {
    pub actor_a: ActorId,
    pub actor_b: ActorId,
    pub origin_a: Vec3,
    pub origin_b: Vec3,
    pub spell_a: SpellId,
    pub spell_b: SpellId,
}

impl DuelClash {
    pub fn midpoint(&self) -> Vec3 {
        (self.origin_a + self.origin_b) * 0.5
    }
}

/// Check every unordered pair of casts by distinct, present actors.
///
/// Each matching pair is reported once per scan, in iteration order.
pub fn scan_duel_clashes<'a>(
    casts: impl IntoIterator<Item = &'a ActiveSpellCast>,
    is_present: impl Fn(ActorId) -> bool,
    range: f32,
    facing_threshold: f32,
) -> Vec<DuelClash> {
    let casts: Vec<&ActiveSpellCast> = casts.into_iter().filter(|c| is_present(c.actor)).collect();

    let mut clashes = Vec::new();
    for (i, a) in casts.iter().enumerate() {
        for b in &casts[i + 1..] {
            if a.actor == b.actor {
                continue;
            }
            if detect_duel_clash(a, b, range, facing_threshold) {
                clashes.push(DuelClash {
                    actor_a: a.actor,
                    actor_b: b.actor,
                    origin_a: a.origin,
                    origin_b: b.origin,
                    spell_a: a.spell.clone(),
                    spell_b: b.spell.clone(),
                });
            }
        }
    }
    clashes
}

/// Effect intensity for a duel: 0.5 plus the mean visual intensity of both spells.
///
/// Spells missing from the catalog count as the neutral 0.5, giving 1.0 overall.
pub fn duel_intensity(catalog: &SpellCatalog, spell_a: &SpellId, spell_b: &SpellId) -> f32 {
    let mean = (catalog.visual_intensity(spell_a) + catalog.visual_intensity(spell_b)) / 2.0;
    0.5 + mean
}

/// Position and ownership of one spell projectile, for the collision scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSample {
    pub owner: Option<ActorId>,
    pub position: Vec3,
}

/// Index pairs of colliding projectiles.
///
/// Owners must both be known and differ. Once a projectile has collided it is
/// skipped for the rest of the scan.
pub fn find_projectile_collisions(samples: &[ProjectileSample], collision_distance: f32) -> Vec<(usize, usize)> {
    let mut consumed: SmallVec<[bool; 32]> = SmallVec::from_elem(false, samples.len());
    let mut pairs = Vec::new();

    for i in 0..samples.len() {
        if consumed[i] {
            continue;
        }
        let Some(owner_i) = samples[i].owner else {
            continue;
        };

        for j in (i + 1)..samples.len() {
            if consumed[j] {
                continue;
            }
            let Some(owner_j) = samples[j].owner else {
                continue;
            };
            if owner_i == owner_j {
                continue;
            }

            if samples[i].position.distance(samples[j].position) < collision_distance {
                consumed[i] = true;
                consumed[j] = true;
                pairs.push((i, j));
                break;
            }
        }
    }

    pairs
}

/// Spawn a clash effect for every facing pair of tracked casts.
#[allow(clippy::too_many_arguments)]
pub fn detect_duel_clashes(
    tracker: Res<CastTracker>,
    settings: Res<ClashSettings>,
    catalog: Res<SpellCatalog>,
    actors: Query<&Actor>,
    mut registry: ResMut<ClashEffectRegistry>,
    mut rng: ResMut<GameRng>,
    mut log: ResMut<SpellLog>,
    mut visuals: EventWriter<ClashVisualEvent>,
    mut occurred: EventWriter<ClashOccurred>,
) {
    if !settings.enabled || !tracker.is_enabled() || tracker.len() < 2 {
        return;
    }

    let present: HashSet<ActorId> = actors.iter().filter(|a| a.alive).map(|a| a.id).collect();
    let clashes = scan_duel_clashes(
        tracker.iter(),
        |actor| present.contains(&actor),
        settings.clash_range,
        settings.facing_threshold,
    );

    for clash in clashes {
        let impact_point = clash.midpoint();
        let intensity = duel_intensity(&catalog, &clash.spell_a, &clash.spell_b);

        visuals.send(registry.create(
            clash.origin_a,
            clash.origin_b,
            impact_point,
            intensity,
            Some(clash.spell_a.clone()),
            Some(clash.spell_b.clone()),
            &mut rng,
        ));
        occurred.send(ClashOccurred {
            kind: ClashKind::Duel,
            actors: [clash.actor_a, clash.actor_b],
            impact_point,
        });

        log.log_for(
            SpellLogEventType::DuelClash,
            Some(clash.actor_a),
            Some(clash.spell_a.clone()),
            format!(
                "{} ({}) clashed with {} ({}) at ({:.1}, {:.1}, {:.1})",
                clash.actor_a, clash.spell_a, clash.actor_b, clash.spell_b, impact_point.x, impact_point.y, impact_point.z
            ),
        );
    }
}

/// Collide spell projectiles from different owners and despawn both.
///
/// Only projectiles whose owner is still in the world take part. The effect
/// spans the two owners' wand tips; the impact point is where the projectiles met.
#[allow(clippy::too_many_arguments)]
pub fn detect_projectile_collisions(
    mut commands: Commands,
    projectiles: Query<(Entity, &SpellProjectile, &Transform)>,
    actors: Query<(&Actor, &Transform, Option<&AimDirection>)>,
    settings: Res<ClashSettings>,
    mut registry: ResMut<ClashEffectRegistry>,
    mut rng: ResMut<GameRng>,
    mut log: ResMut<SpellLog>,
    mut visuals: EventWriter<ClashVisualEvent>,
    mut occurred: EventWriter<ClashOccurred>,
) {
    if !settings.enabled {
        return;
    }

    let mut candidates: Vec<(Entity, &SpellProjectile, Vec3)> = projectiles
        .iter()
        .filter(|(_, projectile, _)| projectile.is_spell_projectile())
        .map(|(entity, projectile, transform)| (entity, projectile, transform.translation))
        .collect();
    if candidates.len() < 2 {
        return;
    }
    // Query order isn't stable across runs
    candidates.sort_by_key(|(entity, _, _)| *entity);

    let wands: HashMap<ActorId, Vec3> = actors
        .iter()
        .map(|(actor, transform, aim)| {
            let aim = aim
                .map(|a| a.0)
                .unwrap_or_else(|| *transform.forward())
                .normalize_or_zero();
            (actor.id, wand_position(transform.translation, aim))
        })
        .collect();

    let samples: Vec<ProjectileSample> = candidates
        .iter()
        .map(|(_, projectile, position)| ProjectileSample {
            owner: projectile.owner.filter(|owner| wands.contains_key(owner)),
            position: *position,
        })
        .collect();

    for (i, j) in find_projectile_collisions(&samples, settings.projectile_collision_distance) {
        let (entity_a, projectile_a, position_a) = candidates[i];
        let (entity_b, projectile_b, position_b) = candidates[j];
        // find_projectile_collisions only pairs samples with present owners
        let (Some(owner_a), Some(owner_b)) = (samples[i].owner, samples[j].owner) else {
            continue;
        };
        let (Some(&wand_a), Some(&wand_b)) = (wands.get(&owner_a), wands.get(&owner_b)) else {
            continue;
        };
        let impact_point = (position_a + position_b) * 0.5;

        commands.entity(entity_a).despawn();
        commands.entity(entity_b).despawn();

        visuals.send(registry.create(
            wand_a,
            wand_b,
            impact_point,
            PROJECTILE_CLASH_INTENSITY,
            Some(projectile_a.spell.clone()),
            Some(projectile_b.spell.clone()),
            &mut rng,
        ));
        occurred.send(ClashOccurred {
            kind: ClashKind::Projectile,
            actors: [owner_a, owner_b],
            impact_point,
        });
        log.log_for(
            SpellLogEventType::ProjectileCollision,
            Some(owner_a),
            Some(projectile_a.spell.clone()),
            format!(
                "{} ({}) and {} ({}) projectiles collided",
                owner_a, projectile_a.spell, owner_b, projectile_b.spell
            ),
        );
    }
}
