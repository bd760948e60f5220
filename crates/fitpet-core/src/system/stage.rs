//! # Stat Clamp & Stage Resolver
//!
//! ## Stage Definitions
//!
//! | Stage | Levels | Gate |
//! |-------|--------|------|
//! | EGG | 1-4 | - |
//! | CHICK | 5-9 | breakthrough at 5 |
//! | CHICKEN | 10-14 | breakthrough at 10 |
//! | BIG_CHICKEN | 15-19 | breakthrough at 15 |
//! | BUFF_CHICKEN | 20-25 | breakthrough at 20 |
//!
//! A pet that reaches a gate level keeps its previous stage until the
//! breakthrough is completed. The level itself is not deferred.

use crate::primitives::{BREAKTHROUGH_INTERVAL, MAX_LEVEL, STRENGTH_PER_LEVEL};
use crate::{Pet, Stage};
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGE THRESHOLDS
// =============================================================================

/// First level of CHICK.
pub const CHICK_LEVEL: u32 = BREAKTHROUGH_INTERVAL;

/// First level of CHICKEN.
pub const CHICKEN_LEVEL: u32 = BREAKTHROUGH_INTERVAL * 2;

/// First level of BIG_CHICKEN.
pub const BIG_CHICKEN_LEVEL: u32 = BREAKTHROUGH_INTERVAL * 3;

/// First level of BUFF_CHICKEN.
pub const BUFF_CHICKEN_LEVEL: u32 = BREAKTHROUGH_INTERVAL * 4;

// =============================================================================
// CLAMP
// =============================================================================

/// Clamp `value` into `[min, max]`.
///
/// Unlike `Ord::clamp` this never panics: an inverted range collapses to `min`.
#[must_use]
pub fn clamp(value: i64, min: i64, max: i64) -> i64 {
    if value < min {
        min
    } else if value > max {
        max.max(min)
    } else {
        value
    }
}

// =============================================================================
// GATE STATE
// =============================================================================

/// True for positive multiples of the breakthrough interval.
#[must_use]
pub const fn is_gate_level(level: u32) -> bool {
    level >= BREAKTHROUGH_INTERVAL && level % BREAKTHROUGH_INTERVAL == 0
}

/// Whether strength gains currently apply.
///
/// Derived from `(level, breakthrough_completed)` on every call; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    /// Strength gains apply freely.
    Normal,
    /// Waiting on a breakthrough: strength gains are discarded.
    Gated,
}

impl GateState {
    /// Compute the gate state of a pet at `level`.
    #[must_use]
    pub const fn of(level: u32, breakthrough_completed: bool) -> Self {
        if is_gate_level(level) && !breakthrough_completed {
            GateState::Gated
        } else {
            GateState::Normal
        }
    }
}

// =============================================================================
// STAGE RESOLVER
// =============================================================================

fn stage_for_level(level: u32) -> Stage {
    if level >= BUFF_CHICKEN_LEVEL {
        Stage::BuffChicken
    } else if level >= BIG_CHICKEN_LEVEL {
        Stage::BigChicken
    } else if level >= CHICKEN_LEVEL {
        Stage::Chicken
    } else if level >= CHICK_LEVEL {
        Stage::Chick
    } else {
        Stage::Egg
    }
}

/// Map `(level, breakthrough_completed)` to a stage.
///
/// While gated, the stage is the one implied by the previous level.
#[must_use]
pub fn resolve_stage(level: u32, breakthrough_completed: bool) -> Stage {
    match GateState::of(level, breakthrough_completed) {
        GateState::Normal => stage_for_level(level),
        GateState::Gated => stage_for_level(level.saturating_sub(1)),
    }
}

/// The next gate level strictly above `level`, if below the cap.
#[must_use]
pub fn next_gate_level(level: u32) -> Option<u32> {
    let next = (level / BREAKTHROUGH_INTERVAL)
        .saturating_add(1)
        .saturating_mul(BREAKTHROUGH_INTERVAL);
    (next <= MAX_LEVEL).then_some(next)
}

// =============================================================================
// STAGE PROGRESS
// =============================================================================

/// Progress information for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    pub current: Stage,
    pub next: Option<Stage>,
    pub level: u32,
    pub gate: GateState,
    /// Strength still needed for the next rollover (0 when pending overflow).
    pub strength_to_next_level: i64,
    /// Next gate strictly above the current level, if any.
    pub next_gate_level: Option<u32>,
    /// Percent of the current level's strength bar filled (0..=100).
    pub percent: u8,
}

impl StageProgress {
    /// Build the progress report for a pet.
    #[must_use]
    pub fn of(pet: &Pet) -> Self {
        let filled = clamp(pet.strength, 0, STRENGTH_PER_LEVEL);
        let percent = (filled.saturating_mul(100) / STRENGTH_PER_LEVEL) as u8;

        Self {
            current: pet.stage,
            next: pet.stage.next(),
            level: pet.level,
            gate: pet.gate_state(),
            strength_to_next_level: pet.strength_to_next_level(),
            next_gate_level: next_gate_level(pet.level),
            percent: percent.min(100),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
