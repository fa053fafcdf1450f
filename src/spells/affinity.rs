//! Affinity between an actor and the tool they cast with
//!
//! The casting operation never inspects tools directly. It asks an
//! `AffinityResolver` for multipliers and chances, so hosts can plug in their
//! own rules (wand cores, enchantments, etc.) by replacing the `Affinity`
//! resource.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ActorId;

/// Per-tool chances, read from the tool's item data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffinityProfile {
    /// Base chance (0.0 to 1.0) that a cast fizzles
    pub miscast_chance: f32,
    /// Chance (0.0 to 1.0) that a cast is critical
    pub crit_chance: f32,
    /// Subtracted from the miscast chance
    pub stability_bonus: f32,
}

/// The wand-equivalent an actor casts through.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Actor the tool is bound to, if any
    pub owner: Option<ActorId>,
    #[serde(default)]
    pub profile: AffinityProfile,
}

impl Tool {
    pub fn owned_by(owner: ActorId) -> Self {
        Self {
            owner: Some(owner),
            profile: AffinityProfile::default(),
        }
    }

    pub fn unowned() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: AffinityProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Source of cast modifiers for an actor holding (or not holding) a tool.
///
/// Implementations must be pure: the same inputs give the same answers.
pub trait AffinityResolver: Send + Sync {
    fn cooldown_multiplier(&self, actor: ActorId, tool: Option<&Tool>) -> f32;
    fn power_multiplier(&self, actor: ActorId, tool: Option<&Tool>) -> f32;
    fn miscast_chance(&self, actor: ActorId, tool: Option<&Tool>) -> f32;
    fn crit_chance(&self, actor: ActorId, tool: Option<&Tool>) -> f32;
    fn stability_bonus(&self, actor: ActorId, tool: Option<&Tool>) -> f32;

    /// Miscast chance after stability, clamped to 0.0..=1.0.
    fn effective_miscast_chance(&self, actor: ActorId, tool: Option<&Tool>) -> f32 {
        (self.miscast_chance(actor, tool) - self.stability_bonus(actor, tool)).clamp(0.0, 1.0)
    }
}

/// How an actor relates to the tool in hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loyalty {
    Owner,
    Stranger,
    /// No tool, or a tool nobody has claimed
    Unowned,
}

impl Loyalty {
    pub fn of(actor: ActorId, tool: Option<&Tool>) -> Self {
        match tool.and_then(|t| t.owner) {
            None => Loyalty::Unowned,
            Some(owner) if owner == actor => Loyalty::Owner,
            Some(_) => Loyalty::Stranger,
        }
    }
}

/// Tools work better for their owner and worse for anyone else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoyaltyAffinity;

impl AffinityResolver for LoyaltyAffinity {
    fn cooldown_multiplier(&self, actor: ActorId, tool: Option<&Tool>) -> f32 {
        match Loyalty::of(actor, tool) {
            Loyalty::Owner => 0.9,
            Loyalty::Stranger => 1.2,
            Loyalty::Unowned => 1.0,
        }
    }

    fn power_multiplier(&self, actor: ActorId, tool: Option<&Tool>) -> f32 {
        match Loyalty::of(actor, tool) {
            Loyalty::Owner => 1.1,
            Loyalty::Stranger => 0.8,
            Loyalty::Unowned => 1.0,
        }
    }

    fn miscast_chance(&self, _actor: ActorId, tool: Option<&Tool>) -> f32 {
        tool.map(|t| t.profile.miscast_chance).unwrap_or(0.0)
    }

    fn crit_chance(&self, _actor: ActorId, tool: Option<&Tool>) -> f32 {
        tool.map(|t| t.profile.crit_chance).unwrap_or(0.0)
    }

    fn stability_bonus(&self, _actor: ActorId, tool: Option<&Tool>) -> f32 {
        tool.map(|t| t.profile.stability_bonus).unwrap_or(0.0)
    }
}

/// Everything neutral: no modifiers, never miscasts, never crits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralAffinity;

impl AffinityResolver for NeutralAffinity {
    fn cooldown_multiplier(&self, _actor: ActorId, _tool: Option<&Tool>) -> f32 {
        1.0
    }

    fn power_multiplier(&self, _actor: ActorId, _tool: Option<&Tool>) -> f32 {
        1.0
    }

    fn miscast_chance(&self, _actor: ActorId, _tool: Option<&Tool>) -> f32 {
        0.0
    }

    fn crit_chance(&self, _actor: ActorId, _tool: Option<&Tool>) -> f32 {
        0.0
    }

    fn stability_bonus(&self, _actor: ActorId, _tool: Option<&Tool>) -> f32 {
        0.0
    }
}

/// Resource holding the active resolver.
#[derive(Resource)]
pub struct Affinity(pub Box<dyn AffinityResolver>);

impl Affinity {
    pub fn new(resolver: impl AffinityResolver + 'static) -> Self {
        Self(Box::new(resolver))
    }
}

impl Default for Affinity {
    fn default() -> Self {
        Self::new(LoyaltyAffinity)
    }
}

impl std::ops::Deref for Affinity {
    type Target = dyn AffinityResolver;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: ActorId = ActorId(1);
    const BOB: ActorId = ActorId(2);

    #[test]
    fn test_loyalty_classification() {
        assert_eq!(Loyalty::of(ALICE, None), Loyalty::Unowned);
        assert_eq!(Loyalty::of(ALICE, Some(&Tool::unowned())), Loyalty::Unowned);
        assert_eq!(Loyalty::of(ALICE, Some(&Tool::owned_by(ALICE))), Loyalty::Owner);
        assert_eq!(Loyalty::of(ALICE, Some(&Tool::owned_by(BOB))), Loyalty::Stranger);
    }

    #[test]
    fn test_owner_gets_bonus_and_stranger_penalty() {
        let resolver = LoyaltyAffinity;
        let tool = Tool::owned_by(ALICE);

        assert_eq!(resolver.power_multiplier(ALICE, Some(&tool)), 1.1);
        assert_eq!(resolver.cooldown_multiplier(ALICE, Some(&tool)), 0.9);
        assert_eq!(resolver.power_multiplier(BOB, Some(&tool)), 0.8);
        assert_eq!(resolver.cooldown_multiplier(BOB, Some(&tool)), 1.2);
        assert_eq!(resolver.power_multiplier(BOB, None), 1.0);
    }

    #[test]
    fn test_stability_offsets_miscast_chance() {
        let tool = Tool::owned_by(ALICE).with_profile(AffinityProfile {
            miscast_chance: 0.3,
            crit_chance: 0.0,
            stability_bonus: 0.5,
        });

        assert_eq!(LoyaltyAffinity.effective_miscast_chance(ALICE, Some(&tool)), 0.0);
    }

    #[test]
    fn test_affinity_resource_derefs_to_resolver() {
        let affinity = Affinity::new(NeutralAffinity);
        assert_eq!(affinity.cooldown_multiplier(ALICE, Some(&Tool::owned_by(BOB))), 1.0);
    }
}
