//! Per-actor spell record
//!
//! `ActorSpellState` is a plain value: it knows nothing about actors or the
//! world. `SpellBook` owns one per loaded actor and handles boundary checks.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::catalog::SpellCatalog;
use super::SpellId;
use crate::constants::{COMBO_TIMEOUT_TICKS, RECENT_CAST_CAPACITY};

/// The four quick-cast slots, laid out like a d-pad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellSlot {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpellSlot {
    pub const ALL: [SpellSlot; 4] = [SpellSlot::Top, SpellSlot::Bottom, SpellSlot::Left, SpellSlot::Right];

    /// Map a raw slot index from input or network code. Anything outside 0..=3 is `None`.
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(SpellSlot::Top),
            1 => Some(SpellSlot::Bottom),
            2 => Some(SpellSlot::Left),
            3 => Some(SpellSlot::Right),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            SpellSlot::Top => 0,
            SpellSlot::Bottom => 1,
            SpellSlot::Left => 2,
            SpellSlot::Right => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpellSlot::Top => "Top",
            SpellSlot::Bottom => "Bottom",
            SpellSlot::Left => "Left",
            SpellSlot::Right => "Right",
        }
    }
}

/// One entry of the recent-cast ring.
///
/// Saves written before casts carried a tick hold bare spell ids. Those load
/// with tick 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecentCastRepr")]
pub struct RecentCast {
    pub spell: SpellId,
    pub tick: u64,
}

impl RecentCast {
    pub fn new(spell: SpellId, tick: u64) -> Self {
        Self { spell, tick }
    }

    /// Still counts towards combos at `now`. Entries stamped in the future
    /// came from another clock and never count.
    pub fn is_fresh(&self, now: u64) -> bool {
        self.tick <= now && now - self.tick <= COMBO_TIMEOUT_TICKS
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecentCastRepr {
    Timed { spell: SpellId, tick: u64 },
    Bare(SpellId),
}

impl From<RecentCastRepr> for RecentCast {
    fn from(repr: RecentCastRepr) -> Self {
        match repr {
            RecentCastRepr::Timed { spell, tick } => RecentCast { spell, tick },
            RecentCastRepr::Bare(spell) => RecentCast { spell, tick: 0 },
        }
    }
}

/// What `sanitize` threw away while restoring saved data.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanitizeReport {
    pub dropped_slots: usize,
    pub dropped_learned: usize,
    pub dropped_cooldowns: usize,
    pub dropped_hold: bool,
    pub trimmed_recent: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        *self == SanitizeReport::default()
    }
}

/// Spell bookkeeping for one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSpellState {
    slots: [Option<SpellId>; 4],
    learned_spells: HashSet<SpellId>,
    /// Remaining ticks per spell. Entries are always > 0.
    cooldowns: HashMap<SpellId, u32>,
    active_hold_spell: Option<SpellId>,
    mastery_uses: HashMap<SpellId, u32>,
    /// Oldest first.
    recent_casts: VecDeque<RecentCast>,
}

impl ActorSpellState {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    pub fn slot(&self, slot: SpellSlot) -> Option<&SpellId> {
        self.slots[slot.index()].as_ref()
    }

    /// Overwrite a slot. `None` clears it.
    pub fn set_slot(&mut self, slot: SpellSlot, spell: Option<SpellId>) {
        self.slots[slot.index()] = spell;
    }

    pub fn slots(&self) -> &[Option<SpellId>; 4] {
        &self.slots
    }

    // ------------------------------------------------------------------
    // Learned spells
    // ------------------------------------------------------------------

    /// Returns true if the spell was newly learned.
    pub fn learn(&mut self, spell: SpellId) -> bool {
        self.learned_spells.insert(spell)
    }

    /// Returns true if the spell was known.
    pub fn forget(&mut self, spell: &SpellId) -> bool {
        self.learned_spells.remove(spell)
    }

    pub fn has_learned(&self, spell: &SpellId) -> bool {
        self.learned_spells.contains(spell)
    }

    pub fn learned_spells(&self) -> impl Iterator<Item = &SpellId> {
        self.learned_spells.iter()
    }

    // ------------------------------------------------------------------
    // Cooldowns
    // ------------------------------------------------------------------

    /// Overwrite the remaining cooldown. Zero clears the entry.
    pub fn set_cooldown(&mut self, spell: SpellId, ticks: u32) {
        if ticks == 0 {
            self.cooldowns.remove(&spell);
        } else {
            self.cooldowns.insert(spell, ticks);
        }
    }

    /// Remaining ticks, 0 when the spell is ready.
    pub fn cooldown(&self, spell: &SpellId) -> u32 {
        self.cooldowns.get(spell).copied().unwrap_or(0)
    }

    pub fn is_on_cooldown(&self, spell: &SpellId) -> bool {
        self.cooldowns.contains_key(spell)
    }

    pub fn cooldowns(&self) -> &HashMap<SpellId, u32> {
        &self.cooldowns
    }

    /// Advance every cooldown by one tick, dropping the ones that reach zero.
    ///
    /// Must run exactly once per simulation tick. A second call in the same
    /// tick shortens every cooldown by an extra tick.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }

    // ------------------------------------------------------------------
    // Hold spell
    // ------------------------------------------------------------------

    /// Start channeling, replacing any current hold spell.
    pub fn start_hold(&mut self, spell: SpellId) -> Option<SpellId> {
        self.active_hold_spell.replace(spell)
    }

    pub fn stop_hold(&mut self) -> Option<SpellId> {
        self.active_hold_spell.take()
    }

    pub fn active_hold(&self) -> Option<&SpellId> {
        self.active_hold_spell.as_ref()
    }

    // ------------------------------------------------------------------
    // Mastery and recent casts
    // ------------------------------------------------------------------

    /// Count a successful cast at tick `now` and push it onto the recent ring.
    ///
    /// Entries older than the combo timeout are dropped first.
    pub fn record_cast(&mut self, spell: SpellId, now: u64) {
        let uses = self.mastery_uses.entry(spell.clone()).or_insert(0);
        *uses = uses.saturating_add(1);

        self.recent_casts.retain(|cast| cast.is_fresh(now));
        self.recent_casts.push_back(RecentCast::new(spell, now));
        while self.recent_casts.len() > RECENT_CAST_CAPACITY {
            self.recent_casts.pop_front();
        }
    }

    /// Empty the ring after a sequence combo consumed it.
    pub fn clear_recent_casts(&mut self) {
        self.recent_casts.clear();
    }

    pub fn mastery_uses(&self, spell: &SpellId) -> u32 {
        self.mastery_uses.get(spell).copied().unwrap_or(0)
    }

    pub fn recent_casts(&self) -> &VecDeque<RecentCast> {
        &self.recent_casts
    }

    /// Drop everything that doesn't hold up against the current catalog.
    ///
    /// Saved data can outlive a catalog change (a spell removed from an addon,
    /// a hand-edited save). Unknown ids are removed from slots, learned spells,
    /// cooldowns and the hold spell. Zero cooldowns are dropped and the recent
    /// ring is trimmed to the newest entries. Mastery counters are kept since
    /// they are harmless for unknown spells and survive re-adding the spell.
    pub fn sanitize(&mut self, catalog: &SpellCatalog) -> SanitizeReport {
        let mut report = SanitizeReport::default();

        for slot in self.slots.iter_mut() {
            if slot.as_ref().is_some_and(|spell| !catalog.contains(spell)) {
                *slot = None;
                report.dropped_slots += 1;
            }
        }

        let before = self.learned_spells.len();
        self.learned_spells.retain(|spell| catalog.contains(spell));
        report.dropped_learned = before - self.learned_spells.len();

        let before = self.cooldowns.len();
        self.cooldowns
            .retain(|spell, remaining| *remaining > 0 && catalog.contains(spell));
        report.dropped_cooldowns = before - self.cooldowns.len();

        if self
            .active_hold_spell
            .as_ref()
            .is_some_and(|spell| !catalog.contains(spell))
        {
            self.active_hold_spell = None;
            report.dropped_hold = true;
        }

        while self.recent_casts.len() > RECENT_CAST_CAPACITY {
            self.recent_casts.pop_front();
            report.trimmed_recent += 1;
        }

        report
    }
}
