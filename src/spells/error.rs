//! Spell operation errors
//!
//! Raised inside the bookkeeping operations and turned into a logged,
//! neutral outcome at the `SpellBook` boundary. Callers that only want
//! best-effort feedback never see them.

use thiserror::Error;

use super::{ActorId, SpellId};

/// Why a spell operation was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpellError {
    #[error("{0} has no loaded spell state")]
    UnknownActor(ActorId),

    #[error("slot index {0} is out of range (expected 0..=3)")]
    InvalidSlot(i32),

    #[error("spell '{0}' is not in the catalog")]
    UnknownSpell(SpellId),

    #[error("negative cooldown of {ticks} ticks for spell '{spell}'")]
    NegativeCooldown { spell: SpellId, ticks: i64 },
}
