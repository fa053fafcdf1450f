//! Clash effects
//!
//! A clash effect is a short-lived visual arc between two points. The registry
//! owns every live effect, ages them once per tick and tells the render side
//! what to draw through events. Nothing here renders.

use bevy::prelude::*;

use crate::constants::{
    BRANCH_JITTER, BRANCH_SEGMENT_LENGTH, CLASH_EFFECT_DURATION_TICKS, MAX_BRANCH_SEGMENTS, PULSE_INTENSITY_SCALE,
    PULSE_INTERVAL_TICKS,
};
use crate::events::{ClashPulseEvent, ClashVisualEvent};
use crate::session::GameRng;
use crate::settings::ClashSettings;
use crate::spells::SpellId;

/// Lifecycle stage of an effect. Effects are `Active` from creation until the
/// tick their age reaches the total duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectPhase {
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClashEffect {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub impact_point: Vec3,
    pub total_duration: u32,
    pub age: u32,
    pub intensity: f32,
    pub spell_a: Option<SpellId>,
    pub spell_b: Option<SpellId>,
    /// Jagged path from `point_a` to `point_b`, fixed at creation
    pub branch_points: Vec<Vec3>,
}

impl ClashEffect {
    pub fn phase(&self) -> EffectPhase {
        if self.age >= self.total_duration {
            EffectPhase::Expired
        } else {
            EffectPhase::Active
        }
    }
}

/// Lightning-style path between two points.
///
/// Interior points are jittered by up to half of `BRANCH_JITTER * intensity` on
/// each axis; the endpoints stay put. Points closer than 0.01 give an empty path.
pub fn jagged_path(a: Vec3, b: Vec3, intensity: f32, rng: &mut GameRng) -> Vec<Vec3> {
    let distance = a.distance(b);
    if distance < 0.01 {
        return Vec::new();
    }

    let segments = ((distance / BRANCH_SEGMENT_LENGTH) as usize).clamp(1, MAX_BRANCH_SEGMENTS);
    let spread = BRANCH_JITTER * intensity;

    let mut points = Vec::with_capacity(segments + 1);
    points.push(a);
    for i in 1..segments {
        let t = i as f32 / segments as f32;
        let jitter = Vec3::new(
            (rng.random_f32() - 0.5) * spread,
            (rng.random_f32() - 0.5) * spread,
            (rng.random_f32() - 0.5) * spread,
        );
        points.push(a.lerp(b, t) + jitter);
    }
    points.push(b);
    points
}

/// World-owned collection of live clash effects.
#[derive(Resource, Debug, Clone)]
pub struct ClashEffectRegistry {
    effects: Vec<ClashEffect>,
    default_duration: u32,
}

impl Default for ClashEffectRegistry {
    fn default() -> Self {
        Self::with_duration(CLASH_EFFECT_DURATION_TICKS)
    }
}

impl ClashEffectRegistry {
    pub fn with_duration(default_duration: u32) -> Self {
        Self {
            effects: Vec::new(),
            default_duration,
        }
    }

    pub fn from_settings(settings: &ClashSettings) -> Self {
        Self::with_duration(settings.effect_duration_ticks)
    }

    /// Applies to effects created from now on.
    pub fn configure(&mut self, settings: &ClashSettings) {
        self.default_duration = settings.effect_duration_ticks;
    }

    /// Register a new effect and return the visual event announcing it.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        point_a: Vec3,
        point_b: Vec3,
        impact_point: Vec3,
        intensity: f32,
        spell_a: Option<SpellId>,
        spell_b: Option<SpellId>,
        rng: &mut GameRng,
    ) -> ClashVisualEvent {
        let branch_points = jagged_path(point_a, point_b, intensity, rng);
        self.effects.push(ClashEffect {
            point_a,
            point_b,
            impact_point,
            total_duration: self.default_duration,
            age: 0,
            intensity,
            spell_a,
            spell_b,
            branch_points,
        });

        ClashVisualEvent {
            point_a,
            point_b,
            intensity,
            duration_hint: self.default_duration,
        }
    }

    /// Age every effect by one tick and drop the expired ones.
    ///
    /// Returns a pulse for every surviving effect whose new age lands on the
    /// pulse interval.
    pub fn tick(&mut self) -> Vec<ClashPulseEvent> {
        for effect in self.effects.iter_mut() {
            effect.age += 1;
        }
        self.effects.retain(|effect| effect.phase() == EffectPhase::Active);

        self.effects
            .iter()
            .filter(|effect| effect.age % PULSE_INTERVAL_TICKS == 0)
            .map(|effect| ClashPulseEvent {
                point_a: effect.point_a,
                point_b: effect.point_b,
                intensity: effect.intensity * PULSE_INTENSITY_SCALE,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClashEffect> {
        self.effects.iter()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

/// Age clash effects and forward their pulses.
pub fn tick_clash_effects(mut registry: ResMut<ClashEffectRegistry>, mut pulses: EventWriter<ClashPulseEvent>) {
    if registry.is_empty() {
        return;
    }
    pulses.send_batch(registry.tick());
}
