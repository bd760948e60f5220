//! # Session Module
//!
//! The request-boundary façade over a storage backend.
//!
//! Every operation takes the owning [`UserId`] explicitly; there is no
//! "current pet". Time is passed in by the caller so the engine itself never
//! reads a clock.
//!
//! ## Storage Backends
//!
//! - `InMemory`: [`MemoryStore`] (fast, volatile)
//! - `Persistent`: [`RedbStore`] (disk-backed, ACID)
//!
//! A `Session` is `Send + Sync`; share it behind an `Arc`. Each operation is
//! one unit of work on the backend, so no outer lock is needed.

use crate::breakthrough;
use crate::checkin::{CheckinInput, CheckinOutcome, CheckinProcessor};
use crate::daily::{DailyCheckOutcome, DailyReset};
use crate::exercise::{ExerciseInput, ExerciseOutcome, ExerciseProcessor};
use crate::quest::{Landmark, QuestCatalog, pick_breakthrough_quest};
use crate::storage::RedbStore;
use crate::store::{MemoryStore, PetStore};
use crate::system::StageProgress;
use crate::{CheckinRecord, ExerciseLog, FitpetError, Pet, QuestId, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage backend for a Session.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory tables (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed tables using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

/// A pet together with its derived progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetStatus {
    pub pet: Pet,
    pub progress: StageProgress,
}

impl From<Pet> for PetStatus {
    fn from(pet: Pet) -> Self {
        let progress = StageProgress::of(&pet);
        Self { pet, progress }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    backend: StorageBackend,
}

impl Session {
    /// Create a session with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with persistent redb storage at `path`.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, FitpetError> {
        Ok(Self::with_redb_store(RedbStore::open(path)?))
    }

    #[must_use]
    pub fn with_redb_store(store: RedbStore) -> Self {
        Self {
            backend: StorageBackend::Persistent(store),
        }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    // =========================================================================
    // PETS
    // =========================================================================

    /// Create the default pet for `user`.
    pub fn adopt_pet(&self, user: UserId) -> Result<Pet, FitpetError> {
        let pet = Pet::new(user);
        match &self.backend {
            StorageBackend::InMemory(store) => store.insert_pet(&pet)?,
            StorageBackend::Persistent(store) => store.insert_pet(&pet)?,
        }
        tracing::info!(user = %user, "pet adopted");
        Ok(pet)
    }

    /// Get the pet of `user`, failing with `NotFound` if there is none.
    pub fn get_pet(&self, user: UserId) -> Result<Pet, FitpetError> {
        let pet = match &self.backend {
            StorageBackend::InMemory(store) => store.get_pet(user)?,
            StorageBackend::Persistent(store) => store.get_pet(user)?,
        };
        pet.ok_or(FitpetError::NotFound(user))
    }

    /// The pet of `user` with its progress report.
    pub fn status(&self, user: UserId) -> Result<PetStatus, FitpetError> {
        self.get_pet(user).map(PetStatus::from)
    }

    /// Number of pets in the backend.
    pub fn pet_count(&self) -> Result<usize, FitpetError> {
        match &self.backend {
            StorageBackend::InMemory(store) => store.pet_count(),
            StorageBackend::Persistent(store) => store.pet_count(),
        }
    }

    // =========================================================================
    // REQUEST-BOUNDARY OPERATIONS
    // =========================================================================

    pub fn submit_exercise(
        &self,
        user: UserId,
        input: &ExerciseInput,
        now: DateTime<Utc>,
    ) -> Result<ExerciseOutcome, FitpetError> {
        match &self.backend {
            StorageBackend::InMemory(store) => ExerciseProcessor::submit(store, user, input, now),
            StorageBackend::Persistent(store) => ExerciseProcessor::submit(store, user, input, now),
        }
    }

    pub fn submit_checkin(
        &self,
        user: UserId,
        input: &CheckinInput,
        now: DateTime<Utc>,
    ) -> Result<CheckinOutcome, FitpetError> {
        match &self.backend {
            StorageBackend::InMemory(store) => CheckinProcessor::submit(store, user, input, now),
            StorageBackend::Persistent(store) => CheckinProcessor::submit(store, user, input, now),
        }
    }

    pub fn run_daily_check(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<DailyCheckOutcome, FitpetError> {
        match &self.backend {
            StorageBackend::InMemory(store) => DailyReset::run(store, user, now),
            StorageBackend::Persistent(store) => DailyReset::run(store, user, now),
        }
    }

    pub fn complete_breakthrough(&self, user: UserId) -> Result<Pet, FitpetError> {
        match &self.backend {
            StorageBackend::InMemory(store) => breakthrough::complete_breakthrough(store, user),
            StorageBackend::Persistent(store) => breakthrough::complete_breakthrough(store, user),
        }
    }

    // =========================================================================
    // HISTORY
    // =========================================================================

    /// Exercise logs of `user`, oldest first.
    pub fn exercise_history(&self, user: UserId) -> Result<Vec<ExerciseLog>, FitpetError> {
        self.get_pet(user)?;
        match &self.backend {
            StorageBackend::InMemory(store) => store.exercise_logs(user),
            StorageBackend::Persistent(store) => store.exercise_logs(user),
        }
    }

    /// Check-in records of `user`, oldest first.
    pub fn checkin_history(&self, user: UserId) -> Result<Vec<CheckinRecord>, FitpetError> {
        self.get_pet(user)?;
        match &self.backend {
            StorageBackend::InMemory(store) => store.checkins(user),
            StorageBackend::Persistent(store) => store.checkins(user),
        }
    }

    /// True if `user` already checked in at `quest`.
    pub fn has_checked_in(&self, user: UserId, quest: &QuestId) -> Result<bool, FitpetError> {
        self.get_pet(user)?;
        match &self.backend {
            StorageBackend::InMemory(store) => store.checkin_exists(user, quest),
            StorageBackend::Persistent(store) => store.checkin_exists(user, quest),
        }
    }

    // =========================================================================
    // QUESTS
    // =========================================================================

    /// Pick a landmark for the pending breakthrough of `user`.
    ///
    /// Fails with `NotFound` if the user has no pet, and with `InvalidState`
    /// if the pet is not gated or the catalog is empty.
    pub fn breakthrough_quest<'c, C, R>(
        &self,
        user: UserId,
        catalog: &'c C,
        rng: &mut R,
    ) -> Result<&'c Landmark, FitpetError>
    where
        C: QuestCatalog + ?Sized,
        R: Rng + ?Sized,
    {
        let pet = self.get_pet(user)?;
        if !pet.is_gated() {
            return Err(FitpetError::InvalidState(format!(
                "no breakthrough pending at level {}",
                pet.level
            )));
        }
        let visited: Vec<QuestId> = self
            .checkin_history(user)?
            .into_iter()
            .map(|c| c.quest)
            .collect();
        pick_breakthrough_quest(catalog, &visited, rng).ok_or_else(|| {
            FitpetError::InvalidState("landmark catalog is empty".to_string())
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::StaticCatalog;
    use crate::{ExerciseType, Stage};
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0)
            .single()
            .expect("timestamp")
    }

    fn walk(seconds: u64) -> ExerciseInput {
        ExerciseInput {
            exercise_type: ExerciseType::Walking,
            duration_seconds: seconds,
            steps: 100,
            volume: 1.0,
        }
    }

    #[test]
    fn adopt_then_status() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");

        let status = session.status(UserId(1)).expect("status");

        assert_eq!(status.pet.stage, Stage::Egg);
        assert_eq!(status.progress.strength_to_next_level, 120);
        assert_eq!(session.pet_count().expect("count"), 1);
    }

    #[test]
    fn adopt_twice_fails() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");
        assert!(matches!(
            session.adopt_pet(UserId(1)),
            Err(FitpetError::PetExists(UserId(1)))
        ));
    }

    #[test]
    fn unknown_user_is_not_found_everywhere() {
        let session = Session::new();
        let user = UserId(404);
        assert!(matches!(session.get_pet(user), Err(FitpetError::NotFound(_))));
        assert!(matches!(
            session.submit_exercise(user, &walk(60), now()),
            Err(FitpetError::NotFound(_))
        ));
        assert!(matches!(
            session.run_daily_check(user, now()),
            Err(FitpetError::NotFound(_))
        ));
        assert!(matches!(
            session.complete_breakthrough(user),
            Err(FitpetError::NotFound(_))
        ));
        assert!(matches!(
            session.exercise_history(user),
            Err(FitpetError::NotFound(_))
        ));
    }

    #[test]
    fn exercise_shows_up_in_history() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");
        session.submit_exercise(UserId(1), &walk(60), now()).expect("first");
        session.submit_exercise(UserId(1), &walk(90), now()).expect("second");

        let history = session.exercise_history(UserId(1)).expect("history");
        let durations: Vec<u64> = history.iter().map(|l| l.duration_seconds).collect();
        assert_eq!(durations, vec![60, 90]);
    }

    #[test]
    fn has_checked_in_follows_checkins() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");
        let quest = QuestId::new("bukchon");
        assert!(!session.has_checked_in(UserId(1), &quest).expect("before"));

        let visit = CheckinInput {
            quest_id: quest.clone(),
            lat: 37.5826,
            lng: 126.983,
        };
        session.submit_checkin(UserId(1), &visit, now()).expect("checkin");

        assert!(session.has_checked_in(UserId(1), &quest).expect("after"));
        assert!(!session
            .has_checked_in(UserId(1), &QuestId::new("lotte-tower"))
            .expect("other quest"));
        assert!(matches!(
            session.has_checked_in(UserId(2), &quest),
            Err(FitpetError::NotFound(UserId(2)))
        ));
    }

    #[test]
    fn breakthrough_quest_with_empty_catalog_is_invalid_state() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");
        session
            .submit_exercise(UserId(1), &walk(4_800), now())
            .expect("exercise");
        let mut rng = StdRng::seed_from_u64(1);

        let empty = StaticCatalog::new(Vec::new());
        let result = session.breakthrough_quest(UserId(1), &empty, &mut rng);

        assert!(matches!(result, Err(FitpetError::InvalidState(_))));
    }

    #[test]
    fn breakthrough_quest_requires_gate() {
        let session = Session::new();
        session.adopt_pet(UserId(1)).expect("adopt");
        let catalog = StaticCatalog::builtin();
        let mut rng = StdRng::seed_from_u64(0);

        let result = session.breakthrough_quest(UserId(1), &catalog, &mut rng);
        assert!(matches!(result, Err(FitpetError::InvalidState(_))));

        // 4 levels of strength in 600-second sessions: level 1 -> 5.
        for _ in 0..8 {
            session.submit_exercise(UserId(1), &walk(600), now()).expect("exercise");
        }
        assert!(session.get_pet(UserId(1)).expect("pet").is_gated());

        let landmark = session
            .breakthrough_quest(UserId(1), &catalog, &mut rng)
            .expect("quest");
        assert!(catalog.find(&landmark.quest_id).is_some());
    }

    #[test]
    fn redb_session_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pets.redb");
        {
            let session = Session::with_redb(&path).expect("open");
            assert!(session.is_persistent());
            session.adopt_pet(UserId(3)).expect("adopt");
            session.submit_exercise(UserId(3), &walk(300), now()).expect("exercise");
        }
        let session = Session::with_redb(&path).expect("reopen");
        let pet = session.get_pet(UserId(3)).expect("pet");
        assert_eq!(pet.strength, 30);
        assert_eq!(session.exercise_history(UserId(3)).expect("history").len(), 1);
    }
}
