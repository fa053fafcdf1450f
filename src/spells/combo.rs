//! Combo detection over an actor's recent casts.
//!
//! Two layers run on every successful cast. The generic repeat/chain
//! classification comes first. Named sequence combos from the catalog are
//! checked next, and a match empties the ring so the same casts can't
//! complete it twice. Only casts inside the combo timeout take part in either.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::state::RecentCast;
use super::SpellId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboType {
    None,
    /// Same spell twice in a row
    DoubleCast,
    /// Same spell three or more times in a row
    TripleCast,
    /// Three different spells in the recent window
    ElementalChain,
}

impl ComboType {
    pub fn power_multiplier(self) -> f32 {
        match self {
            ComboType::None => 1.0,
            ComboType::DoubleCast => 1.15,
            ComboType::TripleCast => 1.25,
            ComboType::ElementalChain => 1.3,
        }
    }

    pub fn cooldown_reduction(self) -> f32 {
        match self {
            ComboType::None => 0.0,
            ComboType::DoubleCast => 0.10,
            ComboType::TripleCast => 0.15,
            ComboType::ElementalChain => 0.20,
        }
    }

    pub fn is_combo(self) -> bool {
        self != ComboType::None
    }
}

/// A named cast sequence registered in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceCombo {
    pub name: String,
    /// Spells in cast order, oldest first
    pub pattern: Vec<SpellId>,
    pub power_multiplier: f32,
}

impl SequenceCombo {
    pub fn new(name: impl Into<String>, pattern: impl IntoIterator<Item = SpellId>, power_multiplier: f32) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into_iter().collect(),
            power_multiplier,
        }
    }

    /// True when the newest fresh casts spell out the pattern in order.
    pub fn matches(&self, recent: &VecDeque<RecentCast>, now: u64) -> bool {
        let fresh: Vec<&SpellId> = fresh_casts(recent, now).collect();
        if self.pattern.is_empty() || fresh.len() < self.pattern.len() {
            return false;
        }
        fresh[fresh.len() - self.pattern.len()..]
            .iter()
            .zip(&self.pattern)
            .all(|(cast, wanted)| *cast == wanted)
    }
}

/// First registered combo the ring completes, in registration order.
pub fn match_sequence<'a>(
    combos: &'a [SequenceCombo],
    recent: &VecDeque<RecentCast>,
    now: u64,
) -> Option<&'a SequenceCombo> {
    combos.iter().find(|combo| combo.matches(recent, now))
}

fn fresh_casts(recent: &VecDeque<RecentCast>, now: u64) -> impl Iterator<Item = &SpellId> {
    recent.iter().filter(move |cast| cast.is_fresh(now)).map(|cast| &cast.spell)
}

/// Classify the recent-cast ring (oldest first, newest last) at tick `now`.
///
/// Repeats of the newest spell win over a chain of distinct spells. Casts
/// past the combo timeout are ignored.
pub fn detect_combo(recent: &VecDeque<RecentCast>, now: u64) -> ComboType {
    let fresh: Vec<&SpellId> = fresh_casts(recent, now).collect();
    let Some(latest) = fresh.last() else {
        return ComboType::None;
    };

    let run = fresh.iter().rev().take_while(|spell| *spell == latest).count();
    if run >= 3 {
        return ComboType::TripleCast;
    }
    if run == 2 {
        return ComboType::DoubleCast;
    }

    let distinct: HashSet<&SpellId> = fresh.iter().copied().collect();
    if fresh.len() >= 3 && distinct.len() >= 3 {
        return ComboType::ElementalChain;
    }

    ComboType::None
}
