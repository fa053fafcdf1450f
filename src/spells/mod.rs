//! Spell bookkeeping
//!
//! Per-actor spell state and the operations that mutate it:
//! - Spell catalog (static spell definitions loaded from RON)
//! - Slot assignments, learned spells, cooldowns, hold spells
//! - Mastery counters and combo detection over recent casts
//! - Affinity modifiers from the equipped tool
//! - The slot-cast operation tying all of the above together

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod affinity;
pub mod book;
pub mod casting;
pub mod catalog;
pub mod combo;
pub mod error;
pub mod mastery;
pub mod state;

pub use affinity::{Affinity, AffinityProfile, AffinityResolver, Loyalty, LoyaltyAffinity, NeutralAffinity, Tool};
pub use book::{tick_spell_cooldowns, SpellBook};
pub use casting::{process_cast_requests, CastContext, CastOutcome, CastReport, CastRequest};
pub use catalog::{
    load_spell_catalog, parse_spell_catalog, ProjectileProfile, SpellCatalog, SpellCatalogPlugin, SpellCategory,
    SpellDefinition, DEFAULT_CATALOG_PATH,
};
pub use combo::{detect_combo, match_sequence, ComboType, SequenceCombo};
pub use error::SpellError;
pub use mastery::MasteryLevel;
pub use state::{ActorSpellState, RecentCast, SanitizeReport, SpellSlot};

/// Namespaced spell identifier, e.g. `"stupefy"` or `"addon:ember_lash"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(String);

impl SpellId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpellId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Stable identifier of an actor across ticks and sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}
