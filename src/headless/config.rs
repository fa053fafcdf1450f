//! JSON configuration parsing for headless mode
//!
//! A scenario places actors, gives them loadouts and scripts cast requests
//! and disconnects on specific ticks.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::spells::{ActorId, SpellCatalog, SpellId, SpellSlot, Tool};

/// One actor in the scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioActor {
    pub id: ActorId,
    /// Feet position
    pub position: [f32; 3],
    /// Aim direction (normalized on load)
    pub aim: [f32; 3],
    /// Tool in hand. Absent means the actor casts bare-handed.
    #[serde(default)]
    pub tool: Option<Tool>,
    /// Slot name ("Top", "Bottom", "Left", "Right") to spell id
    #[serde(default)]
    pub loadout: BTreeMap<String, SpellId>,
    #[serde(default)]
    pub learned: Vec<SpellId>,
}

impl ScenarioActor {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn aim(&self) -> Vec3 {
        Vec3::from_array(self.aim).normalize_or_zero()
    }

    /// Loadout with slot names resolved.
    pub fn resolved_loadout(&self) -> Result<Vec<(SpellSlot, SpellId)>, String> {
        self.loadout
            .iter()
            .map(|(name, spell)| {
                parse_slot(name)
                    .map(|slot| (slot, spell.clone()))
                    .ok_or_else(|| format!("{}: unknown slot '{}'. Valid slots: Top, Bottom, Left, Right", self.id, name))
            })
            .collect()
    }
}

/// Cast request sent on a given tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedCast {
    pub tick: u64,
    pub actor: ActorId,
    /// Raw slot index, passed through unvalidated like player input
    pub slot: i32,
}

/// Disconnect sent on a given tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedDisconnect {
    pub tick: u64,
    pub actor: ActorId,
}

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub actors: Vec<ScenarioActor>,
    #[serde(default)]
    pub casts: Vec<ScriptedCast>,
    #[serde(default)]
    pub disconnects: Vec<ScriptedDisconnect>,
    /// Number of ticks to simulate (default: 200)
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Random seed for deterministic reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the spell log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

fn default_ticks() -> u64 {
    200
}

fn parse_slot(name: &str) -> Option<SpellSlot> {
    SpellSlot::ALL.into_iter().find(|slot| slot.name().eq_ignore_ascii_case(name))
}

impl ScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, String> {
        let config: ScenarioConfig =
            serde_json::from_str(contents).map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration on its own
    pub fn validate(&self) -> Result<(), String> {
        if self.actors.is_empty() {
            return Err("scenario must have at least one actor".to_string());
        }
        if self.ticks == 0 {
            return Err("ticks must be positive".to_string());
        }

        let mut ids = HashSet::new();
        for actor in &self.actors {
            if !ids.insert(actor.id) {
                return Err(format!("duplicate actor id {}", actor.id.0));
            }
            actor.resolved_loadout()?;
        }

        // Scripted events may name unknown actors on purpose; only ticks are checked
        for cast in &self.casts {
            if cast.tick == 0 || cast.tick > self.ticks {
                return Err(format!(
                    "cast for {} at tick {} is outside 1..={}",
                    cast.actor, cast.tick, self.ticks
                ));
            }
        }
        for disconnect in &self.disconnects {
            if disconnect.tick == 0 || disconnect.tick > self.ticks {
                return Err(format!(
                    "disconnect for {} at tick {} is outside 1..={}",
                    disconnect.actor, disconnect.tick, self.ticks
                ));
            }
        }

        Ok(())
    }

    /// Check every spell the scenario mentions against the catalog
    pub fn validate_against(&self, catalog: &SpellCatalog) -> Result<(), String> {
        for actor in &self.actors {
            for spell in actor.loadout.values().chain(actor.learned.iter()) {
                if !catalog.contains(spell) {
                    return Err(format!("{}: spell '{}' is not in the catalog", actor.id, spell));
                }
            }
        }
        Ok(())
    }
}
