//! # Exercise Processor
//!
//! Converts one reported exercise event into stat deltas, accumulates the
//! daily counters, applies the deltas through the [`ProgressionEngine`] and
//! appends an immutable [`ExerciseLog`] with the raw inputs.
//!
//! ## Reward Rules
//!
//! - strength: `+floor(duration / 10)`
//! - stamina: `-floor(duration / 10)`
//! - mood: `+5` per submission, whatever the duration (a 1-second session
//!   still earns the mood)
//!
//! `volume` is validated and logged but no rule reads it.

use crate::primitives::{EXERCISE_MOOD_GAIN, SECONDS_PER_POINT};
use crate::progression::{ProgressionEngine, StatDelta};
use crate::store::PetStore;
use crate::{ExerciseLog, ExerciseType, FitpetError, Pet, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One exercise event as reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInput {
    pub exercise_type: ExerciseType,
    pub duration_seconds: u64,
    pub steps: u64,
    pub volume: f64,
}

/// Result of an exercise submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseOutcome {
    pub pet: Pet,
    pub breakthrough_required: bool,
    pub levels_gained: u32,
}

/// Strength gained for `duration_seconds` of exercise.
#[must_use]
pub fn strength_gain(duration_seconds: u64) -> i64 {
    i64::try_from(duration_seconds / SECONDS_PER_POINT).unwrap_or(i64::MAX)
}

/// Stamina spent for `duration_seconds` of exercise (never positive).
#[must_use]
pub fn stamina_cost(duration_seconds: u64) -> i64 {
    strength_gain(duration_seconds).saturating_neg()
}

/// The full delta for one exercise event.
#[must_use]
pub fn exercise_deltas(duration_seconds: u64) -> StatDelta {
    StatDelta::new(
        strength_gain(duration_seconds),
        stamina_cost(duration_seconds),
        EXERCISE_MOOD_GAIN,
    )
}

/// The ExerciseProcessor turns exercise events into progression.
pub struct ExerciseProcessor;

impl ExerciseProcessor {
    /// Reject a non-finite `volume`. Any duration is accepted.
    pub fn validate(input: &ExerciseInput) -> Result<(), FitpetError> {
        if !input.volume.is_finite() {
            return Err(FitpetError::InvalidInput(
                "volume must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply one exercise event to the pet of `user` at time `now`.
    pub fn submit<S: PetStore>(
        store: &S,
        user: UserId,
        input: &ExerciseInput,
        now: DateTime<Utc>,
    ) -> Result<ExerciseOutcome, FitpetError> {
        let delta = exercise_deltas(input.duration_seconds);

        // The pet is resolved before the input is checked.
        let (pet, outcome) = store.transact(user, |txn| {
            Self::validate(input)?;
            let pet = txn.pet_mut();
            pet.daily_exercise_seconds = pet
                .daily_exercise_seconds
                .saturating_add(input.duration_seconds);
            pet.daily_steps = pet.daily_steps.saturating_add(input.steps);

            let outcome = ProgressionEngine::apply(pet, delta);

            txn.append_exercise_log(ExerciseLog {
                user,
                exercise_type: input.exercise_type,
                duration_seconds: input.duration_seconds,
                steps: input.steps,
                volume: input.volume,
                recorded_at: now,
            });
            Ok(outcome)
        })?;

        tracing::debug!(
            user = %user,
            seconds = input.duration_seconds,
            strength = delta.strength,
            breakthrough_required = outcome.breakthrough_required,
            "exercise recorded"
        );

        Ok(ExerciseOutcome {
            pet,
            breakthrough_required: outcome.breakthrough_required,
            levels_gained: outcome.levels_gained,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
