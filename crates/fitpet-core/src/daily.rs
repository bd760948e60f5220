//! # Daily Reset Processor
//!
//! Once per UTC calendar day per pet, keyed on the stored `last_reset_at`.
//!
//! There is no background clock: the reset runs inside whichever request
//! calls it first on a new day. A day with no request is simply skipped and
//! the next call evaluates only the counters it finds.
//!
//! Day boundaries compare calendar dates, not elapsed time, so two resets can
//! land minutes apart around midnight.

use crate::primitives::{
    DAILY_EXERCISE_REQUIREMENT_SECONDS, MISSED_DAY_MOOD_PENALTY, MISSED_DAY_STRENGTH_PENALTY,
    MOOD_MAX, STAMINA_MAX, STAT_MIN,
};
use crate::store::PetStore;
use crate::system::clamp;
use crate::{DailyQuests, FitpetError, Pet, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a daily check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCheckOutcome {
    pub pet: Pet,
    /// The pet was already reset today; nothing changed.
    pub already_checked: bool,
    /// The previous day's exercise met the requirement.
    /// Always true on repeat calls within a day.
    pub met_requirement: bool,
}

/// True if `now` falls on a later calendar date than the last reset.
#[must_use]
pub fn is_new_day(last_reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_reset_at {
        None => true,
        Some(last) => last.date_naive() < now.date_naive(),
    }
}

/// The DailyReset processor.
pub struct DailyReset;

impl DailyReset {
    /// Apply the daily rules to a pet in place. Returns `(already_checked, met_requirement)`.
    pub fn apply(pet: &mut Pet, now: DateTime<Utc>) -> (bool, bool) {
        if !is_new_day(pet.last_reset_at, now) {
            return (true, true);
        }

        let met_requirement = pet.daily_exercise_seconds >= DAILY_EXERCISE_REQUIREMENT_SECONDS;

        if !met_requirement && pet.stamina > 0 {
            pet.mood = clamp(
                pet.mood.saturating_sub(MISSED_DAY_MOOD_PENALTY),
                STAT_MIN,
                MOOD_MAX,
            );
            if pet.mood == 0 && pet.strength > 0 {
                pet.strength = clamp(
                    pet.strength.saturating_sub(MISSED_DAY_STRENGTH_PENALTY),
                    STAT_MIN,
                    pet.strength,
                );
            }
        }

        pet.stamina = STAMINA_MAX;
        pet.daily_exercise_seconds = 0;
        pet.daily_steps = 0;
        pet.last_reset_at = Some(now);
        pet.daily_quests = DailyQuests::RESET;
        pet.refresh_stage();

        (false, met_requirement)
    }

    /// Run the daily check for `user` at time `now`.
    pub fn run<S: PetStore>(
        store: &S,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<DailyCheckOutcome, FitpetError> {
        let (pet, (already_checked, met_requirement)) =
            store.transact(user, |txn| Ok(Self::apply(txn.pet_mut(), now)))?;

        if !already_checked {
            tracing::info!(
                user = %user,
                met_requirement,
                mood = pet.mood,
                strength = pet.strength,
                "daily reset applied"
            );
        }

        Ok(DailyCheckOutcome {
            pet,
            already_checked,
            met_requirement,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, hour, minute, 0)
            .single()
            .expect("timestamp")
    }

    #[test]
    fn unset_last_reset_is_new_day() {
        assert!(is_new_day(None, at(1, 0, 0)));
    }

    #[test]
    fn calendar_date_not_elapsed_time() {
        assert!(is_new_day(Some(at(1, 23, 58)), at(2, 0, 1)));
        assert!(!is_new_day(Some(at(2, 0, 1)), at(2, 23, 59)));
    }

    #[test]
    fn met_requirement_refills_without_penalty() {
        let mut pet = Pet::new(UserId(1));
        pet.daily_exercise_seconds = 600;
        pet.daily_steps = 1200;
        pet.stamina = 10;
        pet.mood = 40;

        let (already, met) = DailyReset::apply(&mut pet, at(3, 8, 0));

        assert!(!already);
        assert!(met);
        assert_eq!(pet.mood, 40);
        assert_eq!(pet.stamina, 900);
        assert_eq!(pet.daily_exercise_seconds, 0);
        assert_eq!(pet.daily_steps, 0);
        assert_eq!(pet.last_reset_at, Some(at(3, 8, 0)));
    }

    #[test]
    fn missed_requirement_costs_mood() {
        let mut pet = Pet::new(UserId(1));
        pet.daily_exercise_seconds = 599;
        pet.stamina = 400;
        pet.mood = 50;
        pet.strength = 30;

        let (_, met) = DailyReset::apply(&mut pet, at(3, 8, 0));

        assert!(!met);
        assert_eq!(pet.mood, 40);
        assert_eq!(pet.strength, 30);
    }

    #[test]
    fn mood_hitting_zero_costs_strength() {
        let mut pet = Pet::new(UserId(1));
        pet.stamina = 500;
        pet.mood = 5;
        pet.strength = 7;

        DailyReset::apply(&mut pet, at(3, 8, 0));

        assert_eq!(pet.mood, 0);
        assert_eq!(pet.strength, 0);
    }

    #[test]
    fn empty_stamina_skips_penalty() {
        let mut pet = Pet::new(UserId(1));
        pet.stamina = 0;
        pet.mood = 5;
        pet.strength = 50;

        let (_, met) = DailyReset::apply(&mut pet, at(3, 8, 0));

        assert!(!met);
        assert_eq!(pet.mood, 5);
        assert_eq!(pet.strength, 50);
        assert_eq!(pet.stamina, 900);
    }

    #[test]
    fn quest_flags_reset_to_fixed_pattern() {
        let mut pet = Pet::new(UserId(1));
        pet.daily_quests = DailyQuests([true, false, false]);

        DailyReset::apply(&mut pet, at(3, 8, 0));

        assert_eq!(pet.daily_quests, DailyQuests([false, true, true]));
    }

    #[test]
    fn second_call_same_day_is_noop() {
        let store = MemoryStore::new();
        store.insert_pet(&Pet::new(UserId(1))).expect("insert");

        let first = DailyReset::run(&store, UserId(1), at(4, 7, 0)).expect("first");
        assert!(!first.already_checked);

        store
            .transact(UserId(1), |txn| {
                txn.pet_mut().stamina = 12;
                Ok(())
            })
            .expect("spend stamina");

        let second = DailyReset::run(&store, UserId(1), at(4, 21, 0)).expect("second");
        assert!(second.already_checked);
        assert!(second.met_requirement);
        assert_eq!(second.pet.stamina, 12);
        assert_eq!(second.pet.last_reset_at, Some(at(4, 7, 0)));
    }

    #[test]
    fn run_without_pet_is_not_found() {
        let store = MemoryStore::new();
        let result = DailyReset::run(&store, UserId(8), at(4, 7, 0));
        assert!(matches!(result, Err(FitpetError::NotFound(UserId(8)))));
    }
}
