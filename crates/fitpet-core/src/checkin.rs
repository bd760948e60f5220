//! # Checkin Processor
//!
//! Deduplicates landmark visits and grants the fixed visit reward through the
//! [`ProgressionEngine`].
//!
//! The existence of a [`CheckinRecord`] for `(user, quest)` is the only
//! record of a visit. The quick `checkin_exists` lookup rejects obvious
//! repeats early; the authoritative check runs again inside the store's unit
//! of work, together with the record insert and the reward.

use crate::primitives::{
    CHECKIN_MOOD_REWARD, CHECKIN_STAMINA_REWARD, CHECKIN_STRENGTH_REWARD, MAX_QUEST_ID_LENGTH,
};
use crate::progression::{ProgressionEngine, StatDelta};
use crate::store::PetStore;
use crate::{CheckinRecord, FitpetError, Pet, QuestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One landmark visit as reported by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinInput {
    pub quest_id: QuestId,
    pub lat: f64,
    pub lng: f64,
}

/// Result of an accepted check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinOutcome {
    pub pet: Pet,
    pub checkin: CheckinRecord,
    /// The strength reward was discarded at a breakthrough gate.
    pub breakthrough_required: bool,
}

/// The fixed reward for a first visit.
#[must_use]
pub const fn checkin_reward() -> StatDelta {
    StatDelta::new(
        CHECKIN_STRENGTH_REWARD,
        CHECKIN_STAMINA_REWARD,
        CHECKIN_MOOD_REWARD,
    )
}

/// The CheckinProcessor records landmark visits.
pub struct CheckinProcessor;

impl CheckinProcessor {
    /// Reject malformed quest ids and out-of-range coordinates.
    pub fn validate(input: &CheckinInput) -> Result<(), FitpetError> {
        let quest = input.quest_id.as_str();
        if quest.trim().is_empty() {
            return Err(FitpetError::InvalidInput(
                "quest id must not be empty".to_string(),
            ));
        }
        if quest.len() > MAX_QUEST_ID_LENGTH {
            return Err(FitpetError::InvalidInput(format!(
                "quest id longer than {MAX_QUEST_ID_LENGTH} bytes"
            )));
        }
        if !(-90.0..=90.0).contains(&input.lat) {
            return Err(FitpetError::InvalidInput(format!(
                "latitude {} out of range",
                input.lat
            )));
        }
        if !(-180.0..=180.0).contains(&input.lng) {
            return Err(FitpetError::InvalidInput(format!(
                "longitude {} out of range",
                input.lng
            )));
        }
        Ok(())
    }

    /// Record a visit of `user` to `input.quest_id` at time `now`.
    pub fn submit<S: PetStore>(
        store: &S,
        user: UserId,
        input: &CheckinInput,
        now: DateTime<Utc>,
    ) -> Result<CheckinOutcome, FitpetError> {
        if store.get_pet(user)?.is_none() {
            return Err(FitpetError::NotFound(user));
        }
        Self::validate(input)?;

        if store.checkin_exists(user, &input.quest_id)? {
            tracing::warn!(user = %user, quest = %input.quest_id, "duplicate check-in rejected");
            return Err(FitpetError::AlreadyCheckedIn {
                user,
                quest: input.quest_id.clone(),
            });
        }

        let checkin = CheckinRecord {
            user,
            quest: input.quest_id.clone(),
            lat: input.lat,
            lng: input.lng,
            checked_in_at: now,
        };

        let result = store.transact(user, |txn| {
            txn.append_checkin(checkin.clone());
            Ok(ProgressionEngine::apply(txn.pet_mut(), checkin_reward()))
        });

        let (pet, outcome) = match result {
            Ok(done) => done,
            Err(e @ FitpetError::AlreadyCheckedIn { .. }) => {
                tracing::warn!(user = %user, quest = %input.quest_id, "concurrent duplicate check-in rejected");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            user = %user,
            quest = %checkin.quest,
            level = pet.level,
            "check-in accepted"
        );

        Ok(CheckinOutcome {
            pet,
            checkin,
            breakthrough_required: outcome.breakthrough_required,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
