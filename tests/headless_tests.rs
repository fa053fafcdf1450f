//! Integration tests for headless scenario execution
//!
//! These tests verify that scripted scenarios:
//! - Run for exactly the configured number of ticks
//! - Count casts, clashes and collisions from the spell log
//! - Produce identical results for identical seeds
//! - Reject invalid configurations before running

use std::path::Path;

use spellclash::headless::{build_scenario_app, simulate_scenario, ScenarioConfig, ScenarioResult};
use spellclash::settings::ClashSettings;
use spellclash::spells::{load_spell_catalog, SpellCatalog, SpellDefinition, SpellId};

fn catalog() -> SpellCatalog {
    SpellCatalog::from_definitions([
        (
            SpellId::from("stupefy"),
            SpellDefinition::new("Stupefy", 40)
                .with_visual_intensity(0.8)
                .with_projectile(30.0, 40),
        ),
        (SpellId::from("protego"), SpellDefinition::new("Protego", 80).as_hold()),
    ])
}

const BOTH_CAST_ON_FIVE: &str = r#"[
    { "tick": 5, "actor": 1, "slot": 0 },
    { "tick": 5, "actor": 2, "slot": 0 }
]"#;

/// Two bare-handed actors ten units apart and facing each other.
fn face_off_json(casts: &str, extra: &str) -> String {
    format!(
        r#"{{
            "actors": [
                {{ "id": 1, "position": [0.0, 0.0, 0.0], "aim": [1.0, 0.0, 0.0], "loadout": {{ "Top": "stupefy" }} }},
                {{ "id": 2, "position": [10.0, 0.0, 0.0], "aim": [-1.0, 0.0, 0.0], "loadout": {{ "top": "stupefy" }} }}
            ],
            "casts": {},
            "ticks": 40,
            "random_seed": 7{}
        }}"#,
        casts, extra
    )
}

fn run(json: &str) -> ScenarioResult {
    let config = ScenarioConfig::from_json(json).expect("valid scenario");
    simulate_scenario(config, catalog(), ClashSettings::default()).expect("scenario should complete")
}

#[test]
fn test_face_off_counts() {
    let result = run(&face_off_json(BOTH_CAST_ON_FIVE, ""));

    assert_eq!(result.ticks_run, 40);
    assert_eq!(result.casts, 2);
    assert_eq!(result.miscasts, 0);
    // Tracked on tick 5, eligible through tick 25
    assert_eq!(result.duel_clashes, 21);
    // Projectiles meet in the middle on tick 7
    assert_eq!(result.projectile_collisions, 1);
    // Nothing created after tick 1 has reached 40 ticks of age
    assert_eq!(result.active_effects, 22);
    assert_eq!(result.random_seed, Some(7));
}

#[test]
fn test_disconnect_ends_the_duel() {
    let result = run(&face_off_json(
        BOTH_CAST_ON_FIVE,
        r#", "disconnects": [{ "tick": 10, "actor": 2 }]"#,
    ));

    assert_eq!(result.purged_actors, 1);
    // Ticks 5..=9 only; the purge runs before detection on tick 10
    assert_eq!(result.duel_clashes, 5);
    assert_eq!(result.projectile_collisions, 1);
}

#[test]
fn test_cooldown_blocks_scripted_recast() {
    let casts = r#"[
        { "tick": 5, "actor": 1, "slot": 0 },
        { "tick": 20, "actor": 1, "slot": 0 }
    ]"#;
    let result = run(&face_off_json(casts, ""));

    assert_eq!(result.casts, 1);
    assert_eq!(result.blocked_casts, 1);
    assert_eq!(result.duel_clashes, 0);
}

#[test]
fn test_same_seed_same_result() {
    let json = std::fs::read_to_string("demos/duel.json").expect("demo scenario");
    let catalog = load_spell_catalog(Path::new("assets/config/spells.ron")).expect("bundled catalog");

    let first = simulate_scenario(
        ScenarioConfig::from_json(&json).unwrap(),
        catalog.clone(),
        ClashSettings::default(),
    )
    .unwrap();
    let second = simulate_scenario(ScenarioConfig::from_json(&json).unwrap(), catalog, ClashSettings::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.ticks_run, 120);
    assert_eq!(first.purged_actors, 1);
}

#[test]
fn test_disabled_clashes_in_scenario() {
    let config = ScenarioConfig::from_json(&face_off_json(BOTH_CAST_ON_FIVE, "")).unwrap();
    let settings = ClashSettings {
        enabled: false,
        ..Default::default()
    };
    let result = simulate_scenario(config, catalog(), settings).unwrap();

    assert_eq!(result.casts, 2);
    assert_eq!(result.duel_clashes, 0);
    assert_eq!(result.projectile_collisions, 0);
    assert_eq!(result.active_effects, 0);
}

#[test]
fn test_unknown_spell_in_loadout_is_rejected() {
    let json = face_off_json(BOTH_CAST_ON_FIVE, "").replacen("stupefy", "avada", 1);
    let config = ScenarioConfig::from_json(&json).unwrap();

    let err = build_scenario_app(config, catalog(), ClashSettings::default()).err();
    assert!(err.is_some_and(|e| e.contains("avada")));
}

#[test]
fn test_invalid_settings_are_rejected() {
    let config = ScenarioConfig::from_json(&face_off_json(BOTH_CAST_ON_FIVE, "")).unwrap();
    let settings = ClashSettings {
        cooldown_multiplier: 50.0,
        ..Default::default()
    };

    assert!(simulate_scenario(config, catalog(), settings).is_err());
}

#[test]
fn test_invalid_scenarios_fail_to_parse() {
    assert!(ScenarioConfig::from_json(r#"{ "actors": [] }"#).is_err());
    assert!(ScenarioConfig::from_json(&face_off_json(BOTH_CAST_ON_FIVE, "").replace(r#""ticks": 40"#, r#""ticks": 0"#)).is_err());
    // Cast scheduled past the end of the run
    let late_cast = r#"[{ "tick": 41, "actor": 2, "slot": 0 }]"#;
    assert!(ScenarioConfig::from_json(&face_off_json(late_cast, "")).is_err());
}
