//! Spell Projectiles
//!
//! In-flight projectiles launched by successful casts. They travel in a
//! straight line and fizzle out when their lifetime runs out. Only projectiles
//! classified as `ProjectileKind::Spell` take part in collision clashes.

use bevy::prelude::*;

use crate::constants::TICKS_PER_SECOND;
use crate::spells::{ActorId, SpellId};

/// Classification used by the collision scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    Spell,
    /// Arrows, thrown items and the like. Never clash.
    Mundane,
}

#[derive(Component, Debug, Clone)]
pub struct SpellProjectile {
    pub owner: Option<ActorId>,
    pub spell: SpellId,
    pub kind: ProjectileKind,
    /// Units per second
    pub velocity: Vec3,
    pub remaining_ticks: u32,
}

impl SpellProjectile {
    pub fn new(owner: ActorId, spell: SpellId, velocity: Vec3, lifetime_ticks: u32) -> Self {
        Self {
            owner: Some(owner),
            spell,
            kind: ProjectileKind::Spell,
            velocity,
            remaining_ticks: lifetime_ticks,
        }
    }

    pub fn is_spell_projectile(&self) -> bool {
        self.kind == ProjectileKind::Spell
    }
}

/// Advance projectiles by one tick and despawn the ones that ran out.
pub fn move_spell_projectiles(mut commands: Commands, mut projectiles: Query<(Entity, &mut SpellProjectile, &mut Transform)>) {
    let step = 1.0 / TICKS_PER_SECOND as f32;

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        if projectile.remaining_ticks == 0 {
            commands.entity(entity).despawn();
            continue;
        }

        transform.translation += projectile.velocity * step;
        projectile.remaining_ticks -= 1;
    }
}

/// Despawn every projectile owned by `actor`. Returns how many were queued.
pub fn despawn_owned_projectiles<'a>(
    commands: &mut Commands,
    projectiles: impl IntoIterator<Item = (Entity, &'a SpellProjectile)>,
    actor: ActorId,
) -> usize {
    let mut count = 0;
    for (entity, projectile) in projectiles {
        if projectile.owner == Some(actor) {
            commands.entity(entity).despawn();
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projectile_moves_then_fizzles() {
        let mut app = App::new();
        app.add_systems(Update, move_spell_projectiles);

        let entity = app
            .world_mut()
            .spawn((
                SpellProjectile::new(ActorId(1), SpellId::from("stupefy"), Vec3::new(20.0, 0.0, 0.0), 2),
                Transform::default(),
            ))
            .id();

        app.update();
        let x = app.world().get::<Transform>(entity).map(|t| t.translation.x);
        assert_eq!(x, Some(1.0));

        app.update();
        app.update();
        assert!(app.world().get::<SpellProjectile>(entity).is_none());
    }

    #[test]
    fn test_mundane_projectiles_are_not_spells() {
        let mut projectile = SpellProjectile::new(ActorId(1), SpellId::from("arrow"), Vec3::X, 10);
        projectile.kind = ProjectileKind::Mundane;
        assert!(!projectile.is_spell_projectile());
    }
}
