//! SpellBook resource
//!
//! World-owned registry of `ActorSpellState`, keyed by actor. This is the
//! boundary the rest of the game talks to: invalid input (unknown actor, bad
//! slot index, spell missing from the catalog, negative cooldown) is logged and
//! turned into a no-op or an empty answer, never a panic.
//!
//! The `try_*` methods return the underlying `SpellError` for callers that want
//! to react to the failure themselves.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::catalog::SpellCatalog;
use super::error::SpellError;
use super::mastery::MasteryLevel;
use super::state::{ActorSpellState, SpellSlot};
use super::{ActorId, SpellId};

#[derive(Resource, Debug, Default)]
pub struct SpellBook {
    actors: HashMap<ActorId, ActorSpellState>,
    /// Actors whose slots or cooldowns changed since the last `drain_changed`
    changed: HashSet<ActorId>,
}

impl SpellBook {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Load an actor's state, from a save or fresh. Replaces any existing entry.
    pub fn load_actor(&mut self, actor: ActorId, saved: Option<ActorSpellState>) {
        let state = saved.unwrap_or_default();
        if self.actors.insert(actor, state).is_some() {
            debug!("{}: spell state reloaded, previous entry replaced", actor);
        }
        self.changed.insert(actor);
    }

    /// Load saved state after dropping anything the catalog no longer knows.
    pub fn restore_actor(&mut self, actor: ActorId, mut saved: ActorSpellState, catalog: &SpellCatalog) {
        let report = saved.sanitize(catalog);
        if !report.is_clean() {
            warn!("{}: saved spell state was sanitized on restore: {:?}", actor, report);
        }
        self.load_actor(actor, Some(saved));
    }

    pub fn is_loaded(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }

    /// Copy of the actor's state for persistence.
    pub fn snapshot(&self, actor: ActorId) -> Option<ActorSpellState> {
        self.actors.get(&actor).cloned()
    }

    /// Drop the actor's state entirely. Returns what was removed.
    pub fn purge_actor(&mut self, actor: ActorId) -> Option<ActorSpellState> {
        self.changed.remove(&actor);
        self.actors.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.actors.keys().copied()
    }

    pub fn clear(&mut self) {
        self.actors.clear();
        self.changed.clear();
    }

    pub fn get(&self, actor: ActorId) -> Option<&ActorSpellState> {
        self.actors.get(&actor)
    }

    fn state(&self, actor: ActorId) -> Result<&ActorSpellState, SpellError> {
        self.actors.get(&actor).ok_or(SpellError::UnknownActor(actor))
    }

    fn state_mut(&mut self, actor: ActorId) -> Result<&mut ActorSpellState, SpellError> {
        self.actors.get_mut(&actor).ok_or(SpellError::UnknownActor(actor))
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    pub fn try_assign_slot(
        &mut self,
        actor: ActorId,
        slot_index: i32,
        spell: Option<SpellId>,
        catalog: &SpellCatalog,
    ) -> Result<(), SpellError> {
        let slot = SpellSlot::from_index(slot_index).ok_or(SpellError::InvalidSlot(slot_index))?;
        if let Some(spell) = &spell {
            if !catalog.contains(spell) {
                return Err(SpellError::UnknownSpell(spell.clone()));
            }
        }

        self.state_mut(actor)?.set_slot(slot, spell);
        self.changed.insert(actor);
        Ok(())
    }

    /// Put a spell in a slot, or clear it with `None`.
    pub fn assign_slot(
        &mut self,
        actor: ActorId,
        slot_index: i32,
        spell: Option<SpellId>,
        catalog: &SpellCatalog,
    ) -> bool {
        match self.try_assign_slot(actor, slot_index, spell, catalog) {
            Ok(()) => true,
            Err(e) => {
                warn!("assign_slot ignored: {}", e);
                false
            }
        }
    }

    pub fn try_spell_in_slot(&self, actor: ActorId, slot_index: i32) -> Result<Option<SpellId>, SpellError> {
        let slot = SpellSlot::from_index(slot_index).ok_or(SpellError::InvalidSlot(slot_index))?;
        Ok(self.state(actor)?.slot(slot).cloned())
    }

    pub fn spell_in_slot(&self, actor: ActorId, slot_index: i32) -> Option<SpellId> {
        self.try_spell_in_slot(actor, slot_index).unwrap_or_else(|e| {
            warn!("spell_in_slot: {}", e);
            None
        })
    }

    /// All four slots for the display layer. Empty for unknown actors.
    pub fn slots(&self, actor: ActorId) -> [Option<SpellId>; 4] {
        self.actors
            .get(&actor)
            .map(|state| state.slots().clone())
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Learned spells
    // ------------------------------------------------------------------

    pub fn try_learn(&mut self, actor: ActorId, spell: SpellId, catalog: &SpellCatalog) -> Result<bool, SpellError> {
        if !catalog.contains(&spell) {
            return Err(SpellError::UnknownSpell(spell));
        }
        Ok(self.state_mut(actor)?.learn(spell))
    }

    pub fn learn(&mut self, actor: ActorId, spell: SpellId, catalog: &SpellCatalog) -> bool {
        self.try_learn(actor, spell, catalog).unwrap_or_else(|e| {
            warn!("learn ignored: {}", e);
            false
        })
    }

    pub fn forget(&mut self, actor: ActorId, spell: &SpellId) -> bool {
        match self.state_mut(actor) {
            Ok(state) => state.forget(spell),
            Err(e) => {
                warn!("forget ignored: {}", e);
                false
            }
        }
    }

    pub fn has_learned(&self, actor: ActorId, spell: &SpellId) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|state| state.has_learned(spell))
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    pub fn try_set_cooldown(&mut self, actor: ActorId, spell: SpellId, ticks: i64) -> Result<(), SpellError> {
        if ticks < 0 {
            return Err(SpellError::NegativeCooldown { spell, ticks });
        }
        let ticks = u32::try_from(ticks).unwrap_or(u32::MAX);
        self.state_mut(actor)?.set_cooldown(spell, ticks);
        self.changed.insert(actor);
        Ok(())
    }

    /// Overwrite a cooldown. Zero clears it, negative values are rejected.
    pub fn set_cooldown(&mut self, actor: ActorId, spell: SpellId, ticks: i64) -> bool {
        match self.try_set_cooldown(actor, spell, ticks) {
            Ok(()) => true,
            Err(e) => {
                warn!("set_cooldown ignored: {}", e);
                false
            }
        }
    }

    pub fn is_on_cooldown(&self, actor: ActorId, spell: &SpellId) -> bool {
        self.actors
            .get(&actor)
            .is_some_and(|state| state.is_on_cooldown(spell))
    }

    pub fn remaining_cooldown(&self, actor: ActorId, spell: &SpellId) -> u32 {
        self.actors.get(&actor).map(|state| state.cooldown(spell)).unwrap_or(0)
    }

    /// Remaining cooldowns for the display layer. Empty for unknown actors.
    pub fn cooldowns(&self, actor: ActorId) -> HashMap<SpellId, u32> {
        self.actors
            .get(&actor)
            .map(|state| state.cooldowns().clone())
            .unwrap_or_default()
    }

    /// Advance every loaded actor's cooldowns by one tick.
    ///
    /// Only actors that actually had a cooldown are marked changed.
    pub fn tick_cooldowns(&mut self) {
        for (actor, state) in self.actors.iter_mut() {
            if state.cooldowns().is_empty() {
                continue;
            }
            state.tick_cooldowns();
            self.changed.insert(*actor);
        }
    }

    // ------------------------------------------------------------------
    // Casts, mastery, hold
    // ------------------------------------------------------------------

    pub fn record_cast(&mut self, actor: ActorId, spell: SpellId, now: u64) -> bool {
        match self.state_mut(actor) {
            Ok(state) => {
                state.record_cast(spell, now);
                true
            }
            Err(e) => {
                warn!("record_cast ignored: {}", e);
                false
            }
        }
    }

    pub fn clear_recent_casts(&mut self, actor: ActorId) {
        if let Ok(state) = self.state_mut(actor) {
            state.clear_recent_casts();
        }
    }

    pub fn mastery_level(&self, actor: ActorId, spell: &SpellId) -> MasteryLevel {
        MasteryLevel::from_uses(
            self.actors
                .get(&actor)
                .map(|state| state.mastery_uses(spell))
                .unwrap_or(0),
        )
    }

    pub fn start_hold(&mut self, actor: ActorId, spell: SpellId) -> bool {
        match self.state_mut(actor) {
            Ok(state) => {
                if let Some(previous) = state.start_hold(spell) {
                    debug!("{}: hold spell '{}' replaced", actor, previous);
                }
                true
            }
            Err(e) => {
                warn!("start_hold ignored: {}", e);
                false
            }
        }
    }

    pub fn stop_hold(&mut self, actor: ActorId) -> Option<SpellId> {
        match self.state_mut(actor) {
            Ok(state) => state.stop_hold(),
            Err(e) => {
                warn!("stop_hold ignored: {}", e);
                None
            }
        }
    }

    pub fn active_hold(&self, actor: ActorId) -> Option<SpellId> {
        self.actors.get(&actor).and_then(|state| state.active_hold().cloned())
    }

    /// Actors whose slots or cooldowns changed since the last call, sorted.
    pub fn drain_changed(&mut self) -> Vec<ActorId> {
        let mut changed: Vec<ActorId> = self.changed.drain().collect();
        changed.sort();
        changed
    }
}

/// Advance every actor's cooldowns. Scheduled exactly once per tick.
pub fn tick_spell_cooldowns(mut book: ResMut<SpellBook>) {
    book.tick_cooldowns();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spells::catalog::SpellDefinition;

    const ALICE: ActorId = ActorId(1);
    const GHOST: ActorId = ActorId(99);

    fn catalog() -> SpellCatalog {
        SpellCatalog::from_definitions([
            (SpellId::from("stupefy"), SpellDefinition::new("Stupefy", 40)),
            (SpellId::from("lumos"), SpellDefinition::new("Lumos", 0)),
        ])
    }

    fn loaded() -> SpellBook {
        let mut book = SpellBook::new();
        book.load_actor(ALICE, None);
        book.drain_changed();
        book
    }

    #[test]
    fn test_invalid_slot_index_is_rejected() {
        let mut book = loaded();
        let catalog = catalog();

        assert_eq!(
            book.try_assign_slot(ALICE, 4, Some(SpellId::from("lumos")), &catalog),
            Err(SpellError::InvalidSlot(4))
        );
        assert!(!book.assign_slot(ALICE, -1, Some(SpellId::from("lumos")), &catalog));
        assert_eq!(book.spell_in_slot(ALICE, 7), None);
        assert_eq!(book.slots(ALICE), [None, None, None, None]);
    }

    #[test]
    fn test_assign_unknown_spell_is_rejected() {
        let mut book = loaded();
        assert_eq!(
            book.try_assign_slot(ALICE, 0, Some(SpellId::from("avada")), &catalog()),
            Err(SpellError::UnknownSpell(SpellId::from("avada")))
        );
        assert_eq!(book.spell_in_slot(ALICE, 0), None);
    }

    #[test]
    fn test_unknown_actor_mutations_are_noops() {
        let mut book = SpellBook::new();
        let catalog = catalog();

        assert!(!book.assign_slot(GHOST, 0, Some(SpellId::from("lumos")), &catalog));
        assert!(!book.learn(GHOST, SpellId::from("lumos"), &catalog));
        assert!(!book.set_cooldown(GHOST, SpellId::from("lumos"), 5));
        assert!(!book.record_cast(GHOST, SpellId::from("lumos"), 0));
        assert!(!book.start_hold(GHOST, SpellId::from("lumos")));
        assert!(book.is_empty());
        assert!(book.drain_changed().is_empty());
    }

    #[test]
    fn test_negative_cooldown_is_rejected() {
        let mut book = loaded();
        assert_eq!(
            book.try_set_cooldown(ALICE, SpellId::from("stupefy"), -5),
            Err(SpellError::NegativeCooldown { spell: SpellId::from("stupefy"), ticks: -5 })
        );
        assert!(!book.is_on_cooldown(ALICE, &SpellId::from("stupefy")));
    }

    #[test]
    fn test_learn_requires_catalog_entry() {
        let mut book = loaded();
        let catalog = catalog();

        assert!(book.learn(ALICE, SpellId::from("stupefy"), &catalog));
        assert!(!book.learn(ALICE, SpellId::from("stupefy"), &catalog));
        assert!(!book.learn(ALICE, SpellId::from("avada"), &catalog));
        assert!(book.has_learned(ALICE, &SpellId::from("stupefy")));
        assert!(!book.has_learned(ALICE, &SpellId::from("avada")));
    }

    #[test]
    fn test_changed_tracks_slot_and_cooldown_updates() {
        let mut book = loaded();
        book.load_actor(ActorId(2), None);
        book.drain_changed();

        book.set_cooldown(ActorId(2), SpellId::from("stupefy"), 3);
        book.assign_slot(ALICE, 1, Some(SpellId::from("lumos")), &catalog());

        assert_eq!(book.drain_changed(), vec![ALICE, ActorId(2)]);
        assert!(book.drain_changed().is_empty());

        book.tick_cooldowns();
        assert_eq!(book.drain_changed(), vec![ActorId(2)]);
    }

    #[test]
    fn test_purge_removes_everything() {
        let mut book = loaded();
        book.set_cooldown(ALICE, SpellId::from("stupefy"), 30);
        book.start_hold(ALICE, SpellId::from("lumos"));

        let purged = book.purge_actor(ALICE).unwrap();
        assert!(purged.is_on_cooldown(&SpellId::from("stupefy")));
        assert!(!book.is_loaded(ALICE));
        assert_eq!(book.remaining_cooldown(ALICE, &SpellId::from("stupefy")), 0);
        assert_eq!(book.active_hold(ALICE), None);
    }

    #[test]
    fn test_restore_sanitizes_saved_state() {
        let mut saved = ActorSpellState::new();
        saved.learn(SpellId::from("lumos"));
        saved.learn(SpellId::from("removed_in_patch"));

        let mut book = SpellBook::new();
        book.restore_actor(ALICE, saved, &catalog());

        assert!(book.has_learned(ALICE, &SpellId::from("lumos")));
        assert!(!book.has_learned(ALICE, &SpellId::from("removed_in_patch")));
    }
}
