//! Spell logging
//!
//! Records casts, clashes and session events for post-run analysis.
//!
//! Only the newest entries are kept (`MAX_LOG_ENTRIES` by default). Per-type
//! totals cover everything logged since the last `clear`, so run summaries
//! stay exact on long sessions.

use std::collections::{HashMap, VecDeque};
use std::path::Path;

use bevy::prelude::*;
use serde::Serialize;

use crate::constants::MAX_LOG_ENTRIES;
use crate::spells::{ActorId, SpellId};

/// A single entry in the spell log
#[derive(Debug, Clone, Serialize)]
pub struct SpellLogEntry {
    /// Simulation tick the entry was recorded on
    pub tick: u64,
    /// The type of event
    pub event_type: SpellLogEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell: Option<SpellId>,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of spell log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpellLogEventType {
    /// Spell cast successfully
    Cast,
    /// Cast fizzled
    Miscast,
    /// Cast refused while on cooldown
    CastBlocked,
    /// Two casters clashed face to face
    DuelClash,
    /// Two spell projectiles collided
    ProjectileCollision,
    /// Actor state dropped on disconnect
    ActorPurged,
    /// Session event (start, end, etc.)
    SessionEvent,
}

/// The spell log resource
#[derive(Resource, Debug)]
pub struct SpellLog {
    /// Retained entries in chronological order
    pub entries: VecDeque<SpellLogEntry>,
    /// Current simulation tick
    pub tick: u64,
    capacity: usize,
    totals: HashMap<SpellLogEventType, usize>,
    dropped: usize,
}

impl Default for SpellLog {
    fn default() -> Self {
        Self::with_capacity(MAX_LOG_ENTRIES)
    }
}

impl SpellLog {
    /// A log that keeps at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            tick: 0,
            capacity: capacity.max(1),
            totals: HashMap::new(),
            dropped: 0,
        }
    }

    /// Clear the log for a new session
    pub fn clear(&mut self) {
        self.entries.clear();
        self.totals.clear();
        self.dropped = 0;
        self.tick = 0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: SpellLogEventType, message: String) {
        self.log_for(event_type, None, None, message);
    }

    /// Add an entry tied to an actor and spell
    pub fn log_for(&mut self, event_type: SpellLogEventType, actor: Option<ActorId>, spell: Option<SpellId>, message: String) {
        *self.totals.entry(event_type).or_insert(0) += 1;
        self.entries.push_back(SpellLogEntry {
            tick: self.tick,
            event_type,
            actor,
            spell,
            message,
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.dropped += 1;
        }
    }

    /// Entries dropped to stay within capacity
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: SpellLogEventType) -> Vec<&SpellLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Entries of this type logged since the last `clear`, including dropped ones
    pub fn count(&self, event_type: SpellLogEventType) -> usize {
        self.totals.get(&event_type).copied().unwrap_or(0)
    }

    /// Entries involving one actor
    pub fn for_actor(&self, actor: ActorId) -> Vec<&SpellLogEntry> {
        self.entries.iter().filter(|e| e.actor == Some(actor)).collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&SpellLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Write all entries as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| format!("Failed to serialize spell log: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!("Spell log saved to {}", path.display());
        Ok(())
    }
}
