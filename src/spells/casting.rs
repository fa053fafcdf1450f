//! Slot casting
//!
//! Resolves "actor casts whatever is in slot N" into an outcome. The order of
//! checks matters for balance and is fixed:
//!
//! 1. Resolve the slot, then look the spell up in the catalog
//! 2. Refuse while the spell is on cooldown
//! 3. Roll for a miscast (tool miscast chance minus stability). A miscast puts
//!    the spell on a penalty cooldown and stops there
//! 4. Count the cast toward mastery and the recent-cast ring
//! 5. Detect combos (the ring now includes this cast), then match named
//!    sequences. A matched sequence clears the ring
//! 6. Roll for a critical
//! 7. Compute power and cooldown from affinity, mastery, combo and crit
//! 8. Track the cast for duel clashes
//!
//! `CastContext::cast_in_slot` is the pure part. `process_cast_requests` is the
//! system that feeds it from `CastSpellRequest` events, spawns projectiles and
//! writes the spell log.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::Serialize;

use super::affinity::{Affinity, AffinityResolver, Tool};
use super::book::SpellBook;
use super::catalog::{ProjectileProfile, SpellCatalog};
use super::combo::{detect_combo, match_sequence, ComboType};
use super::error::SpellError;
use super::mastery::MasteryLevel;
use super::state::SpellSlot;
use super::{ActorId, SpellId};
use crate::clash::projectiles::{ProjectileKind, SpellProjectile};
use crate::clash::tracker::CastTracker;
use crate::constants::{CRIT_MULTIPLIER, MISCAST_PENALTY_TICKS};
use crate::events::{CastResolved, CastSpellRequest};
use crate::log::{SpellLog, SpellLogEventType};
use crate::session::{wand_position, Actor, AimDirection, EquippedTool, GameRng, SimulationTick};
use crate::settings::ClashSettings;

/// Details of a successful cast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastReport {
    pub spell: SpellId,
    pub power: f32,
    pub critical: bool,
    /// Cooldown applied after the cast, in ticks
    pub cooldown_ticks: u32,
    pub combo: ComboType,
    /// Name of the sequence combo this cast completed
    pub sequence_combo: Option<String>,
    /// Mastery level the cast was made at (before this cast was counted)
    pub mastery: MasteryLevel,
    /// Set when the spell launches a projectile
    #[serde(skip)]
    pub projectile: Option<ProjectileProfile>,
    /// The spell is channeled and became the actor's hold spell
    pub hold: bool,
}

/// Result of a cast attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    /// Bad input: unknown or absent actor, slot index out of range
    Rejected(SpellError),
    EmptySlot(SpellSlot),
    /// The slot refers to a spell the catalog doesn't have
    UnknownSpell(SpellId),
    OnCooldown { spell: SpellId, remaining: u32 },
    /// The cast fizzled and the spell is on a penalty cooldown
    Miscast { spell: SpellId, penalty_ticks: u32 },
    Cast(CastReport),
}

impl CastOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CastOutcome::Cast(_))
    }

    pub fn report(&self) -> Option<&CastReport> {
        match self {
            CastOutcome::Cast(report) => Some(report),
            _ => None,
        }
    }
}

/// One cast attempt, with the caster's geometry already resolved.
#[derive(Debug, Clone)]
pub struct CastRequest<'a> {
    pub actor: ActorId,
    /// Raw slot index (0..=3)
    pub slot: i32,
    /// Wand tip position
    pub origin: Vec3,
    /// Normalized aim direction
    pub aim: Vec3,
    pub tool: Option<&'a Tool>,
}

/// Everything a cast reads or mutates.
pub struct CastContext<'a> {
    pub book: &'a mut SpellBook,
    pub tracker: &'a mut CastTracker,
    pub catalog: &'a SpellCatalog,
    pub affinity: &'a dyn AffinityResolver,
    pub settings: &'a ClashSettings,
    pub rng: &'a mut GameRng,
    pub now: u64,
}

impl CastContext<'_> {
    pub fn cast_in_slot(&mut self, request: &CastRequest) -> CastOutcome {
        let actor = request.actor;

        if !self.book.is_loaded(actor) {
            return CastOutcome::Rejected(SpellError::UnknownActor(actor));
        }
        let Some(slot) = SpellSlot::from_index(request.slot) else {
            return CastOutcome::Rejected(SpellError::InvalidSlot(request.slot));
        };
        let Some(spell) = self.book.spell_in_slot(actor, request.slot) else {
            return CastOutcome::EmptySlot(slot);
        };
        let Some(definition) = self.catalog.get(&spell) else {
            return CastOutcome::UnknownSpell(spell);
        };

        let remaining = self.book.remaining_cooldown(actor, &spell);
        if remaining > 0 {
            return CastOutcome::OnCooldown { spell, remaining };
        }

        let miscast_chance = self.affinity.effective_miscast_chance(actor, request.tool);
        if self.rng.random_f32() < miscast_chance {
            let penalty_ticks = definition.cooldown.saturating_add(MISCAST_PENALTY_TICKS);
            self.book.set_cooldown(actor, spell.clone(), i64::from(penalty_ticks));
            return CastOutcome::Miscast { spell, penalty_ticks };
        }

        let mastery = self.book.mastery_level(actor, &spell);
        self.book.record_cast(actor, spell.clone(), self.now);
        let (combo, sequence) = match self.book.get(actor) {
            Some(state) => (
                detect_combo(state.recent_casts(), self.now),
                match_sequence(self.catalog.sequence_combos(), state.recent_casts(), self.now),
            ),
            None => (ComboType::None, None),
        };
        if sequence.is_some() {
            self.book.clear_recent_casts(actor);
        }

        let crit_chance = self.affinity.crit_chance(actor, request.tool).clamp(0.0, 1.0);
        let critical = self.rng.random_f32() < crit_chance;

        let mut power = definition.base_power
            * self.affinity.power_multiplier(actor, request.tool)
            * mastery.power_multiplier()
            * combo.power_multiplier();
        if let Some(sequence) = sequence {
            power *= sequence.power_multiplier;
        }
        if critical {
            power *= CRIT_MULTIPLIER;
        }

        let cooldown_ticks = scaled_cooldown(
            definition.cooldown,
            self.affinity.cooldown_multiplier(actor, request.tool)
                * (1.0 - mastery.cooldown_reduction())
                * (1.0 - combo.cooldown_reduction())
                * self.settings.cooldown_multiplier,
        );
        self.book.set_cooldown(actor, spell.clone(), i64::from(cooldown_ticks));

        if definition.hold {
            self.book.start_hold(actor, spell.clone());
        }

        self.tracker
            .track(actor, request.origin, request.aim, spell.clone(), self.now);

        CastOutcome::Cast(CastReport {
            spell,
            power,
            critical,
            cooldown_ticks,
            combo,
            sequence_combo: sequence.map(|s| s.name.clone()),
            mastery,
            projectile: definition.projectile.clone(),
            hold: definition.hold,
        })
    }
}

/// Apply a combined multiplier to a base cooldown.
///
/// A spell with a base cooldown never drops to zero from modifiers alone.
fn scaled_cooldown(base: u32, multiplier: f32) -> u32 {
    if base == 0 {
        return 0;
    }
    let scaled = (base as f32 * multiplier.max(0.0)).round();
    (scaled as u32).max(1)
}

/// Resolve this tick's `CastSpellRequest` events.
#[allow(clippy::too_many_arguments)]
pub fn process_cast_requests(
    mut commands: Commands,
    mut requests: EventReader<CastSpellRequest>,
    mut resolved: EventWriter<CastResolved>,
    mut book: ResMut<SpellBook>,
    mut tracker: ResMut<CastTracker>,
    mut rng: ResMut<GameRng>,
    mut log: ResMut<SpellLog>,
    catalog: Res<SpellCatalog>,
    affinity: Res<Affinity>,
    settings: Res<ClashSettings>,
    tick: Res<SimulationTick>,
    actors: Query<(&Actor, &Transform, Option<&AimDirection>, Option<&EquippedTool>)>,
) {
    if requests.is_empty() {
        return;
    }

    let casters: HashMap<ActorId, (&Actor, &Transform, Option<&AimDirection>, Option<&EquippedTool>)> = actors
        .iter()
        .map(|entry| (entry.0.id, entry))
        .collect();

    let mut ctx = CastContext {
        book: &mut book,
        tracker: &mut tracker,
        catalog: &catalog,
        affinity: &**affinity,
        settings: &settings,
        rng: &mut rng,
        now: tick.tick,
    };

    for request in requests.read() {
        let Some(&(caster, transform, aim, tool)) = casters.get(&request.actor).filter(|c| c.0.alive) else {
            warn!("{}: cast from slot {} ignored, actor is not present", request.actor, request.slot);
            resolved.send(CastResolved {
                actor: request.actor,
                outcome: CastOutcome::Rejected(SpellError::UnknownActor(request.actor)),
            });
            continue;
        };

        let aim = aim
            .map(|a| a.0)
            .unwrap_or_else(|| *transform.forward())
            .normalize_or_zero();
        let origin = wand_position(transform.translation, aim);

        let outcome = ctx.cast_in_slot(&CastRequest {
            actor: caster.id,
            slot: request.slot,
            origin,
            aim,
            tool: tool.map(|t| &t.0),
        });

        match &outcome {
            CastOutcome::Cast(report) => {
                if let Some(profile) = &report.projectile {
                    commands.spawn((
                        SpellProjectile::new(caster.id, report.spell.clone(), aim * profile.speed, profile.lifetime_ticks),
                        Transform::from_translation(origin),
                    ));
                }
                let mut message = format!(
                    "{} cast {} (power {:.2}, cooldown {} ticks)",
                    caster.id, report.spell, report.power, report.cooldown_ticks
                );
                if report.critical {
                    message.push_str(" CRIT");
                }
                if report.combo.is_combo() {
                    message.push_str(&format!(" combo {:?}", report.combo));
                }
                if let Some(name) = &report.sequence_combo {
                    message.push_str(&format!(" sequence {}", name));
                }
                log.log_for(SpellLogEventType::Cast, Some(caster.id), Some(report.spell.clone()), message);
            }
            CastOutcome::Miscast { spell, penalty_ticks } => {
                log.log_for(
                    SpellLogEventType::Miscast,
                    Some(caster.id),
                    Some(spell.clone()),
                    format!("{} miscast {} ({} tick penalty)", caster.id, spell, penalty_ticks),
                );
            }
            CastOutcome::OnCooldown { spell, remaining } => {
                log.log_for(
                    SpellLogEventType::CastBlocked,
                    Some(caster.id),
                    Some(spell.clone()),
                    format!("{} tried {} with {} ticks of cooldown left", caster.id, spell, remaining),
                );
            }
            CastOutcome::UnknownSpell(spell) => {
                warn!("{}: slot {} holds '{}', which is not in the catalog", caster.id, request.slot, spell);
            }
            CastOutcome::EmptySlot(slot) => {
                debug!("{}: {} slot is empty", caster.id, slot.name());
            }
            CastOutcome::Rejected(e) => {
                warn!("{}: cast_in_slot rejected: {}", caster.id, e);
            }
        }

        resolved.send(CastResolved {
            actor: caster.id,
            outcome,
        });
    }
}
