//! # Core Type Definitions
//!
//! This module contains all core types for the Fitpet progression engine:
//! - Identifiers (`UserId`, `QuestId`)
//! - The progression entity (`Pet`, `Stage`, `DailyQuests`)
//! - Append-only records (`ExerciseLog`, `CheckinRecord`)
//! - Error types (`FitpetError`)
//!
//! ## Determinism Guarantees
//!
//! All stat fields are integers. Floating-point values (exercise volume,
//! check-in coordinates) are carried as inert data and never enter a formula.

use crate::primitives::{
    INITIAL_MOOD, INITIAL_STAMINA, MIN_LEVEL, MOOD_MAX, STAMINA_MAX, STRENGTH_PER_LEVEL,
};
use crate::system::{GateState, resolve_stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque identifier of the user owning a pet.
/// Account management lives outside the engine; a user is just this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a landmark quest from the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestId(pub String);

impl QuestId {
    /// Create a new quest id from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the quest id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// STAGE
// =============================================================================

/// Visual growth stage of a pet.
///
/// Never stored independently of `(level, breakthrough_completed)`;
/// see [`resolve_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Egg,
    Chick,
    Chicken,
    BigChicken,
    BuffChicken,
}

impl Stage {
    /// All stages in growth order.
    pub const ALL: [Stage; 5] = [
        Stage::Egg,
        Stage::Chick,
        Stage::Chicken,
        Stage::BigChicken,
        Stage::BuffChicken,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Egg => "EGG",
            Stage::Chick => "CHICK",
            Stage::Chicken => "CHICKEN",
            Stage::BigChicken => "BIG_CHICKEN",
            Stage::BuffChicken => "BUFF_CHICKEN",
        }
    }

    /// Position of this stage in growth order (EGG = 0).
    #[must_use]
    pub fn tier(&self) -> usize {
        *self as usize
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<Stage> {
        Stage::ALL.get(self.tier().saturating_add(1)).copied()
    }

    /// Check if this stage is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::BuffChicken)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// DAILY QUESTS
// =============================================================================

/// The three daily-quest flags carried on a pet.
///
/// The engine only ever resets them; completing quests is a client concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuests(pub [bool; 3]);

impl DailyQuests {
    /// Pattern written by every daily reset.
    pub const RESET: DailyQuests = DailyQuests([false, true, true]);
}

impl Default for DailyQuests {
    fn default() -> Self {
        Self::RESET
    }
}

// =============================================================================
// PET
// =============================================================================

/// The per-user progression entity.
///
/// `stage` is a cache of [`resolve_stage`] and is rewritten by
/// [`Pet::refresh_stage`] after every mutation; it is never assigned directly
/// by rule code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub user: UserId,
    /// Steady state is `[0, STRENGTH_PER_LEVEL)`; may exceed it while a
    /// rollover is pending behind a breakthrough gate.
    pub strength: i64,
    pub stamina: i64,
    pub mood: i64,
    pub level: u32,
    pub stage: Stage,
    pub breakthrough_completed: bool,
    pub daily_exercise_seconds: u64,
    pub daily_steps: u64,
    pub last_reset_at: Option<DateTime<Utc>>,
    pub daily_quests: DailyQuests,
}

impl Pet {
    /// A freshly adopted pet.
    #[must_use]
    pub fn new(user: UserId) -> Self {
        let mut pet = Self {
            user,
            strength: 0,
            stamina: INITIAL_STAMINA,
            mood: INITIAL_MOOD,
            level: MIN_LEVEL,
            stage: Stage::Egg,
            breakthrough_completed: false,
            daily_exercise_seconds: 0,
            daily_steps: 0,
            last_reset_at: None,
            daily_quests: DailyQuests::RESET,
        };
        pet.refresh_stage();
        pet
    }

    /// Derived gate condition. Computed on demand, never persisted.
    #[must_use]
    pub fn gate_state(&self) -> GateState {
        GateState::of(self.level, self.breakthrough_completed)
    }

    /// True if strength gains are currently suppressed.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        self.gate_state() == GateState::Gated
    }

    /// Recompute `stage` from `(level, breakthrough_completed)`.
    pub fn refresh_stage(&mut self) {
        self.stage = resolve_stage(self.level, self.breakthrough_completed);
    }

    /// Strength still required before the next rollover.
    #[must_use]
    pub fn strength_to_next_level(&self) -> i64 {
        STRENGTH_PER_LEVEL.saturating_sub(self.strength).max(0)
    }

    /// True if every stat sits inside its steady-state range.
    #[must_use]
    pub fn stats_in_range(&self) -> bool {
        (0..=STAMINA_MAX).contains(&self.stamina)
            && (0..=MOOD_MAX).contains(&self.mood)
            && self.strength >= 0
    }
}

// =============================================================================
// EXERCISE
// =============================================================================

/// Kind of exercise reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    Stationary,
    Running,
    Walking,
}

/// Immutable record of one exercise event, holding the raw inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub user: UserId,
    pub exercise_type: ExerciseType,
    pub duration_seconds: u64,
    pub steps: u64,
    /// Intensity coefficient. Persisted as reported; no rule reads it.
    pub volume: f64,
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// CHECK-IN
// =============================================================================

/// Immutable record of a landmark visit, unique per `(user, quest)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub user: UserId,
    pub quest: QuestId,
    pub lat: f64,
    pub lng: f64,
    pub checked_in_at: DateTime<Utc>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Fitpet engine.
///
/// - No silent failures
/// - Rule arithmetic never fails; every variant comes from a lookup,
///   a precondition, an input check or the persistence layer
#[derive(Debug, Error)]
pub enum FitpetError {
    /// The user has no pet.
    #[error("No pet for user {0}")]
    NotFound(UserId),

    /// The user already checked in to this quest.
    #[error("User {user} already checked in to quest {quest}")]
    AlreadyCheckedIn { user: UserId, quest: QuestId },

    /// A precondition of the requested transition does not hold.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A request field is outside its accepted range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The user already owns a pet.
    #[error("User {0} already has a pet")]
    PetExists(UserId),

    /// The persistence layer failed; nothing was committed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FitpetError {
    /// True for failures worth retrying unchanged.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, FitpetError::Storage(_))
    }

    /// Stable machine-readable name of the variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FitpetError::NotFound(_) => "not_found",
            FitpetError::AlreadyCheckedIn { .. } => "already_checked_in",
            FitpetError::InvalidState(_) => "invalid_state",
            FitpetError::InvalidInput(_) => "invalid_input",
            FitpetError::PetExists(_) => "pet_exists",
            FitpetError::Storage(_) => "storage",
            FitpetError::Serialization(_) => "serialization",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
