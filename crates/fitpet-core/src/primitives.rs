//! # Rule Primitives
//!
//! Hardcoded rule constants for the Fitpet progression engine.
//!
//! Every number that shapes progression lives here. They are compiled into
//! the binary and are immutable at runtime.

// =============================================================================
// STAT RANGES
// =============================================================================

/// Strength consumed by one level rollover.
pub const STRENGTH_PER_LEVEL: i64 = 120;

/// Upper bound of stamina. Also the value written by every refill.
pub const STAMINA_MAX: i64 = 900;

/// Upper bound of mood.
pub const MOOD_MAX: i64 = 100;

/// Lower bound shared by all stats.
pub const STAT_MIN: i64 = 0;

/// Level of a freshly adopted pet.
pub const MIN_LEVEL: u32 = 1;

/// Level cap. Strength beyond the cap is discarded.
pub const MAX_LEVEL: u32 = 25;

/// Gate spacing: every positive multiple of this level requires a breakthrough.
pub const BREAKTHROUGH_INTERVAL: u32 = 5;

/// Stamina of a freshly adopted pet.
pub const INITIAL_STAMINA: i64 = STAMINA_MAX;

/// Mood of a freshly adopted pet.
pub const INITIAL_MOOD: i64 = MOOD_MAX;

// =============================================================================
// EXERCISE RULES
// =============================================================================

/// Seconds of exercise per point of strength gained (and stamina spent).
pub const SECONDS_PER_POINT: u64 = 10;

/// Flat mood gain per exercise submission, independent of duration.
pub const EXERCISE_MOOD_GAIN: i64 = 5;

/// Mood bonus for each level gained.
pub const LEVEL_UP_MOOD_BONUS: i64 = 10;

// =============================================================================
// DAILY RULES
// =============================================================================

/// Exercise seconds a pet needs on a day to avoid the missed-day penalty.
pub const DAILY_EXERCISE_REQUIREMENT_SECONDS: u64 = 600;

/// Mood lost when the previous day's requirement was missed.
pub const MISSED_DAY_MOOD_PENALTY: i64 = 10;

/// Strength lost when the mood penalty drives mood to zero.
pub const MISSED_DAY_STRENGTH_PENALTY: i64 = 10;

// =============================================================================
// CHECK-IN RULES
// =============================================================================

/// Strength granted by a landmark check-in.
pub const CHECKIN_STRENGTH_REWARD: i64 = 20;

/// Stamina granted by a landmark check-in.
pub const CHECKIN_STAMINA_REWARD: i64 = 0;

/// Mood granted by a landmark check-in.
pub const CHECKIN_MOOD_REWARD: i64 = 10;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for quest id strings.
pub const MAX_QUEST_ID_LENGTH: usize = 128;
