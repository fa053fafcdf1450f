//! Engine Constants
//!
//! Centralized location for the tunables used by the spell and clash systems.
//! Values that players may want to rebalance without recompiling also have a
//! field in `ClashSettings`; the constants here are the defaults for those.

// ============================================================================
// Simulation Timing
// ============================================================================

/// Conventional simulation cadence. The engine never assumes a step duration,
/// but the tick-based defaults below were tuned for 20 steps per second.
pub const TICKS_PER_SECOND: u32 = 20;

// ============================================================================
// Cast Tracking
// ============================================================================

/// How long an active cast stays eligible for duel clashes (1 second).
pub const CAST_TRACK_TICKS: u32 = 20;

/// Number of casts remembered per actor for combo detection.
pub const RECENT_CAST_CAPACITY: usize = 5;

/// Casts older than this many ticks no longer count towards combos
pub const COMBO_TIMEOUT_TICKS: u64 = 100;

/// Extra cooldown applied to a spell when the cast fizzles.
pub const MISCAST_PENALTY_TICKS: u32 = 20;

/// Power multiplier for a critical cast.
pub const CRIT_MULTIPLIER: f32 = 1.5;

// ============================================================================
// Clash Geometry
// ============================================================================

/// Maximum distance between two wand tips for a duel clash.
pub const DEFAULT_CLASH_RANGE: f32 = 16.0;

/// Both casters must aim at each other with a dot product above this value
/// (roughly a 45 degree half-angle).
pub const FACING_THRESHOLD: f32 = 0.7;

/// Two spell projectiles closer than this collide.
pub const PROJECTILE_COLLISION_DISTANCE: f32 = 1.0;

/// Eye height above an actor's feet, used to place the wand tip.
pub const EYE_HEIGHT: f32 = 1.62;

/// Distance from the eye to the wand tip along the aim direction.
pub const WAND_REACH: f32 = 0.5;

// ============================================================================
// Clash Effects
// ============================================================================

/// Lifetime of a clash effect (2 seconds).
pub const CLASH_EFFECT_DURATION_TICKS: u32 = 40;

/// A pulse is re-emitted on every tick whose age is a multiple of this.
pub const PULSE_INTERVAL_TICKS: u32 = 2;

/// Pulses are a lighter version of the initial visual.
pub const PULSE_INTENSITY_SCALE: f32 = 0.5;

/// Length of one segment of the jagged clash path.
pub const BRANCH_SEGMENT_LENGTH: f32 = 0.2;

/// Per-axis jitter applied to each path point, scaled by intensity.
pub const BRANCH_JITTER: f32 = 0.3;

/// Upper bound on path segments so a long clash can't allocate unbounded points.
pub const MAX_BRANCH_SEGMENTS: usize = 128;

// ============================================================================
// Spell Log
// ============================================================================

/// Entries kept in the spell log. Older ones are dropped, totals keep counting.
pub const MAX_LOG_ENTRIES: usize = 10_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_windows_are_positive() {
        assert!(CAST_TRACK_TICKS > 0);
        assert!(CLASH_EFFECT_DURATION_TICKS > 0);
        assert!(PULSE_INTERVAL_TICKS > 0);
    }

    #[test]
    fn test_facing_threshold_is_a_valid_cosine() {
        assert!(FACING_THRESHOLD > -1.0 && FACING_THRESHOLD < 1.0);
    }

    #[test]
    fn test_windows_match_twenty_tick_cadence() {
        assert_eq!(CAST_TRACK_TICKS, TICKS_PER_SECOND);
        assert_eq!(CLASH_EFFECT_DURATION_TICKS, TICKS_PER_SECOND * 2);
        assert_eq!(COMBO_TIMEOUT_TICKS, u64::from(TICKS_PER_SECOND) * 5);
    }
}
