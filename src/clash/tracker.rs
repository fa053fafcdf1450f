//! Active cast tracking
//!
//! Remembers each actor's most recent cast for a short window so the duel
//! scan can look for two actors casting at each other.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::settings::ClashSettings;
use crate::spells::{ActorId, SpellId};

/// A cast eligible for duel clashes. Never mutated once tracked.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSpellCast {
    pub actor: ActorId,
    /// Wand tip position at cast time
    pub origin: Vec3,
    /// Normalized aim direction at cast time
    pub aim: Vec3,
    pub spell: SpellId,
    pub cast_tick: u64,
    pub duration_ticks: u32,
}

impl ActiveSpellCast {
    /// Expired once strictly more than `duration_ticks` have passed.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.cast_tick) > u64::from(self.duration_ticks)
    }
}

/// One tracked cast per actor, ordered by actor id so scans are reproducible.
#[derive(Resource, Debug, Clone)]
pub struct CastTracker {
    casts: BTreeMap<ActorId, ActiveSpellCast>,
    enabled: bool,
    window_ticks: u32,
}

impl Default for CastTracker {
    fn default() -> Self {
        Self::from_settings(&ClashSettings::default())
    }
}

impl CastTracker {
    pub fn from_settings(settings: &ClashSettings) -> Self {
        Self {
            casts: BTreeMap::new(),
            enabled: settings.enabled,
            window_ticks: settings.cast_track_ticks,
        }
    }

    /// Pick up changed settings. Turning clashes off drops every tracked cast.
    pub fn configure(&mut self, settings: &ClashSettings) {
        self.enabled = settings.enabled;
        self.window_ticks = settings.cast_track_ticks;
        if !self.enabled {
            self.casts.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn window_ticks(&self) -> u32 {
        self.window_ticks
    }

    /// Record a cast, replacing the actor's previous one. No-op when disabled.
    pub fn track(&mut self, actor: ActorId, origin: Vec3, aim: Vec3, spell: SpellId, now: u64) {
        if !self.enabled {
            return;
        }
        self.casts.insert(
            actor,
            ActiveSpellCast {
                actor,
                origin,
                aim,
                spell,
                cast_tick: now,
                duration_ticks: self.window_ticks,
            },
        );
    }

    /// Drop expired casts. Returns how many were removed.
    pub fn prune(&mut self, now: u64) -> usize {
        let before = self.casts.len();
        self.casts.retain(|_, cast| !cast.is_expired(now));
        before - self.casts.len()
    }

    pub fn forget(&mut self, actor: ActorId) -> Option<ActiveSpellCast> {
        self.casts.remove(&actor)
    }

    pub fn get(&self, actor: ActorId) -> Option<&ActiveSpellCast> {
        self.casts.get(&actor)
    }

    pub fn len(&self) -> usize {
        self.casts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveSpellCast> {
        self.casts.values()
    }

    pub fn clear(&mut self) {
        self.casts.clear();
    }
}
