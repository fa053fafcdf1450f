//! Spell mastery levels
//!
//! Each successful cast counts toward mastery of that spell. Higher levels
//! shorten the spell's cooldown and raise its power.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasteryLevel {
    Novice,
    Apprentice,
    Competent,
    Expert,
    Master,
    Grandmaster,
}

impl MasteryLevel {
    /// Highest first, so `from_uses` can stop at the first match.
    const DESCENDING: [MasteryLevel; 6] = [
        MasteryLevel::Grandmaster,
        MasteryLevel::Master,
        MasteryLevel::Expert,
        MasteryLevel::Competent,
        MasteryLevel::Apprentice,
        MasteryLevel::Novice,
    ];

    pub fn from_uses(uses: u32) -> Self {
        Self::DESCENDING
            .into_iter()
            .find(|level| uses >= level.required_uses())
            .unwrap_or(MasteryLevel::Novice)
    }

    pub fn required_uses(self) -> u32 {
        match self {
            MasteryLevel::Novice => 0,
            MasteryLevel::Apprentice => 10,
            MasteryLevel::Competent => 25,
            MasteryLevel::Expert => 50,
            MasteryLevel::Master => 100,
            MasteryLevel::Grandmaster => 250,
        }
    }

    /// Fraction taken off the cooldown.
    pub fn cooldown_reduction(self) -> f32 {
        match self {
            MasteryLevel::Novice => 0.0,
            MasteryLevel::Apprentice => 0.10,
            MasteryLevel::Competent => 0.15,
            MasteryLevel::Expert => 0.20,
            MasteryLevel::Master => 0.25,
            MasteryLevel::Grandmaster => 0.30,
        }
    }

    pub fn power_multiplier(self) -> f32 {
        match self {
            MasteryLevel::Novice => 1.0,
            MasteryLevel::Apprentice => 1.10,
            MasteryLevel::Competent => 1.15,
            MasteryLevel::Expert => 1.20,
            MasteryLevel::Master => 1.25,
            MasteryLevel::Grandmaster => 1.30,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MasteryLevel::Novice => "Novice",
            MasteryLevel::Apprentice => "Apprentice",
            MasteryLevel::Competent => "Competent",
            MasteryLevel::Expert => "Expert",
            MasteryLevel::Master => "Master",
            MasteryLevel::Grandmaster => "Grandmaster",
        }
    }
}
