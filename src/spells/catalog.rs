//! Data-Driven Spell Catalog
//!
//! Read-only registry mapping a spell id to its static properties. Spells are
//! defined in `assets/config/spells.ron` instead of being hardcoded, so balance
//! changes don't require recompilation.
//!
//! The engine only consumes the catalog: membership checks when learning or
//! restoring spells, base cooldown/power when casting, and visual intensity
//! when a duel clash is spawned. A missing entry is never a hard failure.
//!
//! ## Usage
//! ```ignore
//! fn my_system(catalog: Res<SpellCatalog>) {
//!     if let Some(def) = catalog.get(&SpellId::from("stupefy")) {
//!         println!("Stupefy cooldown: {} ticks", def.cooldown);
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::combo::SequenceCombo;
use super::SpellId;

/// Default location of the catalog file, relative to the working directory.
pub const DEFAULT_CATALOG_PATH: &str = "assets/config/spells.ron";

fn default_base_power() -> f32 {
    1.0
}

fn default_visual_intensity() -> f32 {
    0.5
}

fn default_category() -> SpellCategory {
    SpellCategory::Other
}

/// Grouping used by selection screens and balance reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellCategory {
    Core,
    Utility,
    Combat,
    Defensive,
    Charm,
    Healing,
    Movement,
    Other,
}

/// Travel parameters for spells that launch a projectile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileProfile {
    /// Travel speed in units per second
    pub speed: f32,
    /// Ticks before the projectile fizzles out on its own
    pub lifetime_ticks: u32,
}

/// Static properties of one spell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpellDefinition {
    /// Display name
    pub name: String,
    /// Base cooldown in ticks (0 = no cooldown)
    #[serde(default)]
    pub cooldown: u32,
    /// Base power before affinity, mastery, combo and crit scaling
    #[serde(default = "default_base_power")]
    pub base_power: f32,
    #[serde(default = "default_category")]
    pub category: SpellCategory,
    /// How dramatic the clash visuals are (0.0 to 1.0)
    #[serde(default = "default_visual_intensity")]
    pub visual_intensity: f32,
    /// Continuously channeled rather than instantaneous
    #[serde(default)]
    pub hold: bool,
    /// Projectile launched on a successful cast (None = instant effect)
    #[serde(default)]
    pub projectile: Option<ProjectileProfile>,
}

impl SpellDefinition {
    /// Minimal definition with defaults for everything but name and cooldown.
    pub fn new(name: impl Into<String>, cooldown: u32) -> Self {
        Self {
            name: name.into(),
            cooldown,
            base_power: default_base_power(),
            category: default_category(),
            visual_intensity: default_visual_intensity(),
            hold: false,
            projectile: None,
        }
    }

    pub fn with_projectile(mut self, speed: f32, lifetime_ticks: u32) -> Self {
        self.projectile = Some(ProjectileProfile { speed, lifetime_ticks });
        self
    }

    pub fn with_base_power(mut self, base_power: f32) -> Self {
        self.base_power = base_power;
        self
    }

    pub fn with_visual_intensity(mut self, visual_intensity: f32) -> Self {
        self.visual_intensity = visual_intensity;
        self
    }

    pub fn as_hold(mut self) -> Self {
        self.hold = true;
        self
    }
}

/// Root structure for the spells.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct SpellsConfig {
    pub spells: HashMap<SpellId, SpellDefinition>,
    /// Named cast sequences, checked in file order
    #[serde(default)]
    pub combos: Vec<SequenceCombo>,
}

/// Resource containing all spell definitions.
///
/// Empty by default; `SpellCatalogPlugin` or the host inserts the real one.
#[derive(Resource, Debug, Default, Clone)]
pub struct SpellCatalog {
    definitions: HashMap<SpellId, SpellDefinition>,
    combos: Vec<SequenceCombo>,
}

impl SpellCatalog {
    pub fn new(config: SpellsConfig) -> Self {
        Self {
            definitions: config.spells,
            combos: config.combos,
        }
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = (SpellId, SpellDefinition)>) -> Self {
        Self {
            definitions: definitions.into_iter().collect(),
            combos: Vec::new(),
        }
    }

    pub fn with_combos(mut self, combos: impl IntoIterator<Item = SequenceCombo>) -> Self {
        self.combos.extend(combos);
        self
    }

    /// Registered sequence combos in priority order.
    pub fn sequence_combos(&self) -> &[SequenceCombo] {
        &self.combos
    }

    pub fn get(&self, spell: &SpellId) -> Option<&SpellDefinition> {
        self.definitions.get(spell)
    }

    pub fn contains(&self, spell: &SpellId) -> bool {
        self.definitions.contains_key(spell)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All spell ids, sorted for stable output.
    pub fn spell_ids(&self) -> Vec<&SpellId> {
        let mut ids: Vec<&SpellId> = self.definitions.keys().collect();
        ids.sort();
        ids
    }

    /// Visual intensity for a spell, neutral 0.5 when unknown.
    pub fn visual_intensity(&self, spell: &SpellId) -> f32 {
        self.get(spell)
            .map(|def| def.visual_intensity)
            .unwrap_or_else(default_visual_intensity)
    }

    /// Check every definition for out-of-range values.
    ///
    /// Returns one message per problem so a broken file reports everything at once.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();
        for id in self.spell_ids() {
            let def = &self.definitions[id];
            if def.name.trim().is_empty() {
                problems.push(format!("{}: name is empty", id));
            }
            if def.base_power < 0.0 {
                problems.push(format!("{}: base_power {} is negative", id, def.base_power));
            }
            if !(0.0..=1.0).contains(&def.visual_intensity) {
                problems.push(format!(
                    "{}: visual_intensity {} is outside 0.0..=1.0",
                    id, def.visual_intensity
                ));
            }
            if let Some(projectile) = &def.projectile {
                if projectile.speed <= 0.0 {
                    problems.push(format!("{}: projectile speed must be positive", id));
                }
                if projectile.lifetime_ticks == 0 {
                    problems.push(format!("{}: projectile lifetime must be at least one tick", id));
                }
            }
        }

        for combo in &self.combos {
            if combo.pattern.len() < 2 {
                problems.push(format!("combo '{}': pattern needs at least two spells", combo.name));
            }
            if combo.pattern.len() > crate::constants::RECENT_CAST_CAPACITY {
                problems.push(format!(
                    "combo '{}': pattern is longer than the recent-cast ring",
                    combo.name
                ));
            }
            for spell in combo.pattern.iter().filter(|spell| !self.contains(spell)) {
                problems.push(format!("combo '{}': unknown spell {}", combo.name, spell));
            }
            if combo.power_multiplier <= 0.0 {
                problems.push(format!("combo '{}': power_multiplier must be positive", combo.name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Parse and validate a catalog from RON text.
pub fn parse_spell_catalog(contents: &str) -> Result<SpellCatalog, String> {
    let config: SpellsConfig =
        ron::from_str(contents).map_err(|e| format!("Failed to parse spell catalog: {}", e))?;

    let catalog = SpellCatalog::new(config);
    catalog
        .validate()
        .map_err(|problems| format!("Invalid spell definitions: {}", problems.join("; ")))?;

    Ok(catalog)
}

/// Load spell definitions from a RON file
pub fn load_spell_catalog(path: &Path) -> Result<SpellCatalog, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let catalog = parse_spell_catalog(&contents).map_err(|e| format!("{}: {}", path.display(), e))?;

    info!("Loaded {} spell definitions from {}", catalog.len(), path.display());

    Ok(catalog)
}

/// Bevy plugin that loads the spell catalog at startup
pub struct SpellCatalogPlugin {
    pub path: PathBuf,
}

impl Default for SpellCatalogPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
        }
    }
}

impl Plugin for SpellCatalogPlugin {
    fn build(&self, app: &mut App) {
        match load_spell_catalog(&self.path) {
            Ok(catalog) => {
                app.insert_resource(catalog);
            }
            Err(e) => {
                // Casting against a half-loaded catalog silently drops spells
                panic!("Failed to load spell catalog: {}", e);
            }
        }
    }
}
