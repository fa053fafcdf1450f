//! Spell and clash events
//!
//! Input events drive the engine (`CastSpellRequest`, `ActorDisconnected`);
//! output events are the sink for whatever renders or replicates clashes.

use bevy::prelude::*;

use crate::spells::{ActorId, CastOutcome};

/// Actor wants to cast whatever is in a quick-cast slot.
#[derive(Event, Debug, Clone)]
pub struct CastSpellRequest {
    pub actor: ActorId,
    /// Raw slot index from input, validated on use
    pub slot: i32,
}

/// Result of a `CastSpellRequest`, sent once per request.
#[derive(Event, Debug, Clone)]
pub struct CastResolved {
    pub actor: ActorId,
    pub outcome: CastOutcome,
}

/// Actor left the session; all of its state is dropped this tick.
#[derive(Event, Debug, Clone)]
pub struct ActorDisconnected {
    pub actor: ActorId,
}

/// A new clash effect should be shown.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ClashVisualEvent {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub intensity: f32,
    pub duration_hint: u32,
}

/// Periodic re-emission of a live clash effect.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ClashPulseEvent {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClashKind {
    Duel,
    Projectile,
}

/// Gameplay-facing notice of a clash, for scoring or sound.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct ClashOccurred {
    pub kind: ClashKind,
    pub actors: [ActorId; 2],
    pub impact_point: Vec3,
}
