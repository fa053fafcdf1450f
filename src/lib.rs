//! Spellclash - Spell-casting state and clash-detection engine
//!
//! Tick-driven bookkeeping for actors' spell slots, cooldowns and mastery,
//! plus detection of clashes between casters facing each other and between
//! spell projectiles meeting in flight.
//!
//! This library exposes the engine modules for embedding and testing.

pub mod clash;
pub mod cli;
pub mod constants;
pub mod events;
pub mod headless;
pub mod log;
pub mod session;
pub mod settings;
pub mod spells;
pub mod systems;

// Re-export commonly used types
pub use clash::{CastTracker, ClashEffectRegistry};
pub use headless::ScenarioConfig;
pub use log::{SpellLog, SpellLogEventType};
pub use settings::ClashSettings;
pub use spells::{ActorId, SpellBook, SpellCatalog, SpellId};
pub use systems::{SpellClashPlugin, SpellSystemPhase};
