//! Clash settings
//!
//! Runtime tunables for cast tracking and clash detection, stored as RON.
//! A missing or broken file falls back to defaults with a warning so a bad
//! edit never keeps the simulation from starting.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CAST_TRACK_TICKS, CLASH_EFFECT_DURATION_TICKS, DEFAULT_CLASH_RANGE, FACING_THRESHOLD, PROJECTILE_COLLISION_DISTANCE,
};

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "assets/config/clash_settings.ron";

#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClashSettings {
    /// Master switch. When off, casts are not tracked and nothing clashes.
    pub enabled: bool,
    /// Maximum wand-to-wand distance for a duel clash
    pub clash_range: f32,
    /// Minimum aim/direction dot product for both duelists (strict)
    pub facing_threshold: f32,
    /// How long a cast stays eligible for duel clashes
    pub cast_track_ticks: u32,
    /// Lifetime of clash effects
    pub effect_duration_ticks: u32,
    /// Spell projectiles closer than this collide (strict)
    pub projectile_collision_distance: f32,
    /// Global scale on every cooldown (0.1 to 10.0)
    pub cooldown_multiplier: f32,
}

impl Default for ClashSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            clash_range: DEFAULT_CLASH_RANGE,
            facing_threshold: FACING_THRESHOLD,
            cast_track_ticks: CAST_TRACK_TICKS,
            effect_duration_ticks: CLASH_EFFECT_DURATION_TICKS,
            projectile_collision_distance: PROJECTILE_COLLISION_DISTANCE,
            cooldown_multiplier: 1.0,
        }
    }
}

impl ClashSettings {
    /// Parse and validate settings from RON text.
    pub fn load_from_str(contents: &str) -> Result<Self, String> {
        let settings: Self = ron::from_str(contents).map_err(|e| format!("Failed to parse clash settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from file, or return defaults if it is missing or invalid
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("No clash settings at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::load_from_str(&contents) {
                Ok(settings) => {
                    info!("Loaded clash settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("{}; using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read clash settings file: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.1..=10.0).contains(&self.cooldown_multiplier) {
            return Err(format!(
                "cooldown_multiplier must be between 0.1 and 10.0, got {}",
                self.cooldown_multiplier
            ));
        }
        if !(-1.0..1.0).contains(&self.facing_threshold) {
            return Err(format!(
                "facing_threshold must be in -1.0..1.0, got {}",
                self.facing_threshold
            ));
        }
        if self.clash_range <= 0.0 {
            return Err(format!("clash_range must be positive, got {}", self.clash_range));
        }
        if self.projectile_collision_distance <= 0.0 {
            return Err(format!(
                "projectile_collision_distance must be positive, got {}",
                self.projectile_collision_distance
            ));
        }
        if self.effect_duration_ticks == 0 {
            return Err("effect_duration_ticks must be at least 1".to_string());
        }
        Ok(())
    }
}
