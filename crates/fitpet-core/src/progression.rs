//! # Progression Engine
//!
//! The single state-transition function for pet stats.
//!
//! Every stat change in the system (exercise, check-in rewards) is expressed
//! as a [`StatDelta`] and applied here. The daily reset writes its refill and
//! penalties directly, but through the same clamp and stage helpers.
//!
//! ## Gate
//!
//! A pet whose level is a positive multiple of 5 and whose breakthrough is not
//! completed is *gated*. A positive strength delta on a gated pet is discarded
//! before it is added, so one large delta can never jump a gate. Stamina and
//! mood still apply.
//!
//! ## Rollover
//!
//! While strength covers a full level (and the pet is below the cap and not
//! gated) one level is gained per iteration: the strength is consumed, stamina
//! is refilled and mood gets a bonus. Reaching a gate level clears
//! `breakthrough_completed` and stops the loop; any residual strength waits
//! for the next call after the breakthrough.

use crate::primitives::{
    LEVEL_UP_MOOD_BONUS, MAX_LEVEL, MOOD_MAX, STAMINA_MAX, STAT_MIN, STRENGTH_PER_LEVEL,
};
use crate::system::{clamp, is_gate_level};
use crate::Pet;
use serde::{Deserialize, Serialize};

/// Requested change to the three stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    pub strength: i64,
    pub stamina: i64,
    pub mood: i64,
}

impl StatDelta {
    /// Create a new delta.
    #[must_use]
    pub const fn new(strength: i64, stamina: i64, mood: i64) -> Self {
        Self {
            strength,
            stamina,
            mood,
        }
    }
}

/// What a single application did to the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionOutcome {
    /// The strength delta was discarded because the pet is gated.
    pub breakthrough_required: bool,
    /// Levels gained by rollover during this call.
    pub levels_gained: u32,
    /// Rollover stopped on a gate level during this call.
    pub gate_reached: bool,
}

/// The ProgressionEngine owns every stat transition.
///
/// It is a pure function over `&mut Pet`; persisting the result is the
/// caller's unit of work.
pub struct ProgressionEngine;

impl ProgressionEngine {
    /// Apply `delta` to `pet` under breakthrough gating and level rollover.
    pub fn apply(pet: &mut Pet, delta: StatDelta) -> ProgressionOutcome {
        if pet.is_gated() && delta.strength > 0 {
            Self::apply_stamina_and_mood(pet, delta);
            pet.refresh_stage();
            tracing::debug!(
                user = %pet.user,
                level = pet.level,
                discarded = delta.strength,
                "strength gain discarded at breakthrough gate"
            );
            return ProgressionOutcome {
                breakthrough_required: true,
                ..ProgressionOutcome::default()
            };
        }

        pet.strength = pet.strength.saturating_add(delta.strength).max(STAT_MIN);

        let outcome = Self::rollover(pet);

        // Nothing can consume strength at the cap.
        if pet.level >= MAX_LEVEL {
            pet.strength = pet.strength.min(STRENGTH_PER_LEVEL - 1);
        }

        Self::apply_stamina_and_mood(pet, delta);
        pet.refresh_stage();

        if outcome.levels_gained > 0 {
            tracing::info!(
                user = %pet.user,
                level = pet.level,
                gained = outcome.levels_gained,
                stage = %pet.stage,
                "pet leveled up"
            );
        }
        if outcome.gate_reached {
            tracing::info!(user = %pet.user, level = pet.level, "breakthrough gate reached");
        }

        outcome
    }

    /// Convert accumulated strength into levels.
    fn rollover(pet: &mut Pet) -> ProgressionOutcome {
        let mut outcome = ProgressionOutcome::default();

        while pet.strength >= STRENGTH_PER_LEVEL && pet.level < MAX_LEVEL && !pet.is_gated() {
            pet.strength -= STRENGTH_PER_LEVEL;
            pet.level += 1;
            pet.stamina = STAMINA_MAX;
            pet.mood = clamp(pet.mood.saturating_add(LEVEL_UP_MOOD_BONUS), STAT_MIN, MOOD_MAX);
            outcome.levels_gained += 1;

            if is_gate_level(pet.level) {
                pet.breakthrough_completed = false;
                outcome.gate_reached = true;
                break;
            }
        }

        outcome
    }

    fn apply_stamina_and_mood(pet: &mut Pet, delta: StatDelta) {
        pet.stamina = clamp(pet.stamina.saturating_add(delta.stamina), STAT_MIN, STAMINA_MAX);
        pet.mood = clamp(pet.mood.saturating_add(delta.mood), STAT_MIN, MOOD_MAX);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Stage, UserId};

    fn pet_at(level: u32, strength: i64, breakthrough_completed: bool) -> Pet {
        let mut pet = Pet::new(UserId(1));
        pet.level = level;
        pet.strength = strength;
        pet.breakthrough_completed = breakthrough_completed;
        pet.refresh_stage();
        pet
    }

    #[test]
    fn exact_threshold_levels_up_once() {
        let mut pet = pet_at(3, 0, true);
        pet.stamina = 200;
        pet.mood = 50;

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(120, 0, 0));

        assert_eq!(pet.level, 4);
        assert_eq!(pet.strength, 0);
        assert_eq!(pet.stamina, 900);
        assert_eq!(pet.mood, 60);
        assert_eq!(outcome.levels_gained, 1);
        assert!(!outcome.breakthrough_required);
    }

    #[test]
    fn level_up_mood_bonus_is_clamped() {
        let mut pet = pet_at(2, 0, true);
        pet.mood = 95;
        ProgressionEngine::apply(&mut pet, StatDelta::new(120, 0, 0));
        assert_eq!(pet.mood, 100);
    }

    #[test]
    fn gated_pet_discards_strength_but_keeps_other_deltas() {
        let mut pet = pet_at(5, 119, false);
        pet.stamina = 100;
        pet.mood = 40;

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(50, -10, 5));

        assert!(outcome.breakthrough_required);
        assert_eq!(pet.strength, 119);
        assert_eq!(pet.level, 5);
        assert_eq!(pet.stamina, 90);
        assert_eq!(pet.mood, 45);
    }

    #[test]
    fn multi_rollover_in_one_call() {
        let mut pet = pet_at(1, 0, true);
        pet.mood = 50;

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(360, 0, 0));

        assert_eq!(pet.level, 4);
        assert_eq!(pet.strength, 0);
        assert_eq!(pet.mood, 80);
        assert_eq!(outcome.levels_gained, 3);
    }

    #[test]
    fn rollover_stops_at_gate_and_keeps_residual() {
        let mut pet = pet_at(4, 0, true);

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(300, 0, 0));

        assert_eq!(pet.level, 5);
        assert_eq!(pet.strength, 180);
        assert!(!pet.breakthrough_completed);
        assert!(pet.is_gated());
        assert!(outcome.gate_reached);
        assert_eq!(pet.stage, Stage::Egg);
    }

    #[test]
    fn zero_strength_delta_on_gated_pet_does_not_roll_over() {
        let mut pet = pet_at(5, 150, false);

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(0, -3, 5));

        assert!(!outcome.breakthrough_required);
        assert_eq!(pet.level, 5);
        assert_eq!(pet.strength, 150);
    }

    #[test]
    fn pending_overflow_resolves_after_breakthrough() {
        let mut pet = pet_at(5, 150, true);

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::default());

        assert_eq!(pet.level, 6);
        assert_eq!(pet.strength, 30);
        assert_eq!(outcome.levels_gained, 1);
        assert_eq!(pet.stage, Stage::Chick);
    }

    #[test]
    fn stamina_and_mood_apply_after_rollover_refill() {
        let mut pet = pet_at(2, 100, true);
        pet.stamina = 10;

        ProgressionEngine::apply(&mut pet, StatDelta::new(30, -2, 0));

        assert_eq!(pet.level, 3);
        assert_eq!(pet.strength, 10);
        assert_eq!(pet.stamina, 898);
    }

    #[test]
    fn stamina_never_goes_negative() {
        let mut pet = pet_at(1, 0, false);
        pet.stamina = 5;
        ProgressionEngine::apply(&mut pet, StatDelta::new(0, -50, 0));
        assert_eq!(pet.stamina, 0);
    }

    #[test]
    fn strength_past_level_cap_is_discarded() {
        let mut pet = pet_at(25, 0, true);

        let outcome = ProgressionEngine::apply(&mut pet, StatDelta::new(1000, 0, 0));

        assert_eq!(pet.level, 25);
        assert_eq!(pet.strength, STRENGTH_PER_LEVEL - 1);
        assert_eq!(outcome.levels_gained, 0);
    }

    #[test]
    fn reaching_level_cap_gates_the_pet() {
        let mut pet = pet_at(24, 0, true);

        ProgressionEngine::apply(&mut pet, StatDelta::new(500, 0, 0));

        assert_eq!(pet.level, 25);
        assert!(pet.is_gated());
        assert_eq!(pet.stage, Stage::BuffChicken);
    }
}
