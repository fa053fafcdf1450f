//! Integration tests for per-actor spell bookkeeping
//!
//! These tests verify that the SpellBook:
//! - Only ever shortens cooldowns when ticking
//! - Keeps the recent-cast ring bounded
//! - Treats slot assignment as an idempotent overwrite
//! - Survives a snapshot/restore cycle, including stale saved data

use spellclash::spells::{
    ActorId, ActorSpellState, MasteryLevel, RecentCast, SpellBook, SpellCatalog, SpellDefinition, SpellId, SpellSlot,
};

const ALICE: ActorId = ActorId(1);

fn catalog() -> SpellCatalog {
    SpellCatalog::from_definitions([
        (SpellId::from("stupefy"), SpellDefinition::new("Stupefy", 40)),
        (SpellId::from("expelliarmus"), SpellDefinition::new("Expelliarmus", 60)),
        (SpellId::from("lumos"), SpellDefinition::new("Lumos", 0).as_hold()),
    ])
}

fn book_with_alice() -> SpellBook {
    let mut book = SpellBook::new();
    book.load_actor(ALICE, None);
    book
}

// =============================================================================
// Cooldowns
// =============================================================================

#[test]
fn test_cooldowns_never_increase_while_ticking() {
    let mut book = book_with_alice();
    book.set_cooldown(ALICE, SpellId::from("stupefy"), 7);
    book.set_cooldown(ALICE, SpellId::from("expelliarmus"), 3);

    let mut previous = book.cooldowns(ALICE);
    for _ in 0..10 {
        book.tick_cooldowns();
        let current = book.cooldowns(ALICE);

        for (spell, remaining) in &current {
            let before = previous.get(spell).copied().unwrap_or(0);
            assert!(*remaining < before, "{} went from {} to {}", spell, before, remaining);
            assert!(*remaining > 0, "zero cooldowns must be removed");
        }
        previous = current;
    }

    assert!(book.cooldowns(ALICE).is_empty());
}

#[test]
fn test_cooldown_expires_after_exact_tick_count() {
    let mut book = book_with_alice();
    book.set_cooldown(ALICE, SpellId::from("stupefy"), 3);

    book.tick_cooldowns();
    book.tick_cooldowns();
    assert!(book.is_on_cooldown(ALICE, &SpellId::from("stupefy")));
    assert_eq!(book.remaining_cooldown(ALICE, &SpellId::from("stupefy")), 1);

    book.tick_cooldowns();
    assert!(!book.is_on_cooldown(ALICE, &SpellId::from("stupefy")));
}

#[test]
fn test_cooldown_overwrite_replaces_longer_value() {
    let mut book = book_with_alice();
    book.set_cooldown(ALICE, SpellId::from("stupefy"), 100);
    book.set_cooldown(ALICE, SpellId::from("stupefy"), 5);
    assert_eq!(book.remaining_cooldown(ALICE, &SpellId::from("stupefy")), 5);

    assert!(book.set_cooldown(ALICE, SpellId::from("stupefy"), 0));
    assert!(!book.is_on_cooldown(ALICE, &SpellId::from("stupefy")));
}

// =============================================================================
// Recent casts and mastery
// =============================================================================

#[test]
fn test_recent_casts_never_exceed_five() {
    let mut book = book_with_alice();
    let spells = ["stupefy", "expelliarmus", "lumos"];

    for i in 0..23 {
        book.record_cast(ALICE, SpellId::from(spells[i % spells.len()]), i as u64);
        let state = book.get(ALICE).unwrap();
        assert!(state.recent_casts().len() <= 5);
    }

    let state = book.get(ALICE).unwrap();
    assert_eq!(state.recent_casts().len(), 5);
    // 23 casts: the last one is index 22 -> "expelliarmus"
    assert_eq!(
        state.recent_casts().back(),
        Some(&RecentCast::new(SpellId::from("expelliarmus"), 22))
    );
}

#[test]
fn test_mastery_level_follows_use_count() {
    let mut book = book_with_alice();
    let stupefy = SpellId::from("stupefy");

    for tick in 0..9 {
        book.record_cast(ALICE, stupefy.clone(), tick);
    }
    assert_eq!(book.mastery_level(ALICE, &stupefy), MasteryLevel::Novice);

    // Mastery counts every cast, however far apart
    book.record_cast(ALICE, stupefy.clone(), 5_000);
    assert_eq!(book.mastery_level(ALICE, &stupefy), MasteryLevel::Apprentice);
    assert_eq!(book.mastery_level(ActorId(42), &stupefy), MasteryLevel::Novice);
}

// =============================================================================
// Slots
// =============================================================================

#[test]
fn test_assigning_same_spell_twice_is_idempotent() {
    let mut book = book_with_alice();
    let catalog = catalog();

    book.assign_slot(ALICE, 2, Some(SpellId::from("stupefy")), &catalog);
    let once = book.snapshot(ALICE);
    book.assign_slot(ALICE, 2, Some(SpellId::from("stupefy")), &catalog);
    let twice = book.snapshot(ALICE);

    assert_eq!(once, twice);
    assert_eq!(book.spell_in_slot(ALICE, 2), Some(SpellId::from("stupefy")));
}

#[test]
fn test_clearing_a_slot() {
    let mut book = book_with_alice();
    let catalog = catalog();

    book.assign_slot(ALICE, 0, Some(SpellId::from("lumos")), &catalog);
    book.assign_slot(ALICE, 0, None, &catalog);

    assert_eq!(book.spell_in_slot(ALICE, 0), None);
}

#[test]
fn test_slots_are_independent() {
    let mut book = book_with_alice();
    let catalog = catalog();

    book.assign_slot(ALICE, 0, Some(SpellId::from("stupefy")), &catalog);
    book.assign_slot(ALICE, 3, Some(SpellId::from("lumos")), &catalog);

    assert_eq!(
        book.slots(ALICE),
        [Some(SpellId::from("stupefy")), None, None, Some(SpellId::from("lumos"))]
    );
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_snapshot_restores_identically() {
    let mut book = book_with_alice();
    let catalog = catalog();
    book.assign_slot(ALICE, 1, Some(SpellId::from("expelliarmus")), &catalog);
    book.learn(ALICE, SpellId::from("expelliarmus"), &catalog);
    book.set_cooldown(ALICE, SpellId::from("expelliarmus"), 12);
    book.start_hold(ALICE, SpellId::from("lumos"));
    book.record_cast(ALICE, SpellId::from("expelliarmus"), 3);

    let json = serde_json::to_string(&book.snapshot(ALICE).unwrap()).unwrap();
    let saved: ActorSpellState = serde_json::from_str(&json).unwrap();

    let mut restored = SpellBook::new();
    restored.restore_actor(ALICE, saved, &catalog);

    assert_eq!(restored.snapshot(ALICE), book.snapshot(ALICE));
    assert_eq!(restored.active_hold(ALICE), Some(SpellId::from("lumos")));
}

#[test]
fn test_restore_drops_spells_missing_from_catalog() {
    let json = r#"{
        "slots": ["stupefy", "removed_spell", null, null],
        "learned_spells": ["stupefy", "removed_spell"],
        "cooldowns": { "removed_spell": 30, "stupefy": 4 }
    }"#;
    let saved: ActorSpellState = serde_json::from_str(json).unwrap();

    let mut book = SpellBook::new();
    book.restore_actor(ALICE, saved, &catalog());

    let state = book.get(ALICE).unwrap();
    assert_eq!(state.slot(SpellSlot::Top), Some(&SpellId::from("stupefy")));
    assert_eq!(state.slot(SpellSlot::Bottom), None);
    assert!(!state.has_learned(&SpellId::from("removed_spell")));
    assert_eq!(state.cooldown(&SpellId::from("stupefy")), 4);
    assert!(!state.is_on_cooldown(&SpellId::from("removed_spell")));
}
