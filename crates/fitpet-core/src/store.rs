//! # Pet Store
//!
//! The persistence abstraction the processors depend on.
//!
//! A store must provide:
//! - pet lookup by user
//! - a transactional read-modify-write unit on one pet ([`PetStore::transact`])
//! - append-only exercise logs
//! - append-only check-in records, unique on `(user, quest)`
//! - a check-in existence query
//!
//! ## Unit of Work
//!
//! `transact` loads the pet, hands a [`PetTxn`] to the caller's closure and
//! commits the pet together with whatever the closure staged, or nothing at
//! all. A staged check-in whose key already exists aborts the whole unit with
//! `AlreadyCheckedIn`, inside the same exclusive section, so two concurrent
//! check-ins for one quest can never both be rewarded.

use crate::{CheckinRecord, ExerciseLog, FitpetError, Pet, QuestId, UserId};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

// =============================================================================
// PET TRANSACTION
// =============================================================================

/// Working copy of one pet plus the records staged alongside it.
#[derive(Debug)]
pub struct PetTxn {
    pet: Pet,
    exercise_log: Option<ExerciseLog>,
    checkin: Option<CheckinRecord>,
}

impl PetTxn {
    /// Start a unit of work on a loaded pet.
    #[must_use]
    pub fn new(pet: Pet) -> Self {
        Self {
            pet,
            exercise_log: None,
            checkin: None,
        }
    }

    /// Mutable access to the working copy.
    pub fn pet_mut(&mut self) -> &mut Pet {
        &mut self.pet
    }

    /// Stage an exercise log to be appended on commit.
    pub fn append_exercise_log(&mut self, log: ExerciseLog) {
        self.exercise_log = Some(log);
    }

    /// Stage a check-in record to be inserted on commit.
    pub fn append_checkin(&mut self, record: CheckinRecord) {
        self.checkin = Some(record);
    }

    /// Split into the parts a store writes.
    #[must_use]
    pub fn into_parts(self) -> (Pet, Option<ExerciseLog>, Option<CheckinRecord>) {
        (self.pet, self.exercise_log, self.checkin)
    }
}

// =============================================================================
// PETSTORE TRAIT
// =============================================================================

/// Storage-agnostic persistence for pets and their records.
///
/// Implementations must be safe to share between threads and must run each
/// `transact` call exclusively with respect to other writes on the same pet.
pub trait PetStore: Send + Sync {
    /// Get the pet owned by `user`.
    fn get_pet(&self, user: UserId) -> Result<Option<Pet>, FitpetError>;

    /// Insert a new pet. Fails with `PetExists` if the user already has one.
    fn insert_pet(&self, pet: &Pet) -> Result<(), FitpetError>;

    /// True if a check-in record exists for `(user, quest)`.
    fn checkin_exists(&self, user: UserId, quest: &QuestId) -> Result<bool, FitpetError>;

    /// All exercise logs of `user`, in append order.
    fn exercise_logs(&self, user: UserId) -> Result<Vec<ExerciseLog>, FitpetError>;

    /// All check-in records of `user`, in append order.
    fn checkins(&self, user: UserId) -> Result<Vec<CheckinRecord>, FitpetError>;

    /// Run one read-modify-write unit on the pet of `user`.
    ///
    /// Fails with `NotFound` if the user has no pet. If `op` returns an error
    /// nothing is written.
    fn transact<T, F>(&self, user: UserId, op: F) -> Result<(Pet, T), FitpetError>
    where
        F: FnOnce(&mut PetTxn) -> Result<T, FitpetError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
struct MemoryTables {
    pets: BTreeMap<UserId, Pet>,
    exercise_logs: BTreeMap<UserId, Vec<ExerciseLog>>,
    checkins: BTreeMap<UserId, Vec<CheckinRecord>>,
    checkin_keys: BTreeSet<(UserId, QuestId)>,
}

/// In-memory store. Every unit of work holds one mutex for its duration.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pets held.
    pub fn pet_count(&self) -> Result<usize, FitpetError> {
        Ok(self.lock()?.pets.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryTables>, FitpetError> {
        self.tables
            .lock()
            .map_err(|_| FitpetError::Storage("memory store lock poisoned".to_string()))
    }
}

impl PetStore for MemoryStore {
    fn get_pet(&self, user: UserId) -> Result<Option<Pet>, FitpetError> {
        Ok(self.lock()?.pets.get(&user).cloned())
    }

    fn insert_pet(&self, pet: &Pet) -> Result<(), FitpetError> {
        let mut tables = self.lock()?;
        if tables.pets.contains_key(&pet.user) {
            return Err(FitpetError::PetExists(pet.user));
        }
        tables.pets.insert(pet.user, pet.clone());
        Ok(())
    }

    fn checkin_exists(&self, user: UserId, quest: &QuestId) -> Result<bool, FitpetError> {
        Ok(self.lock()?.checkin_keys.contains(&(user, quest.clone())))
    }

    fn exercise_logs(&self, user: UserId) -> Result<Vec<ExerciseLog>, FitpetError> {
        Ok(self
            .lock()?
            .exercise_logs
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    fn checkins(&self, user: UserId) -> Result<Vec<CheckinRecord>, FitpetError> {
        Ok(self.lock()?.checkins.get(&user).cloned().unwrap_or_default())
    }

    fn transact<T, F>(&self, user: UserId, op: F) -> Result<(Pet, T), FitpetError>
    where
        F: FnOnce(&mut PetTxn) -> Result<T, FitpetError>,
    {
        let mut tables = self.lock()?;

        let pet = tables
            .pets
            .get(&user)
            .cloned()
            .ok_or(FitpetError::NotFound(user))?;

        let mut txn = PetTxn::new(pet);
        let value = op(&mut txn)?;
        let (pet, exercise_log, checkin) = txn.into_parts();

        // Validate every write before applying any of them.
        if let Some(record) = &checkin
            && tables
                .checkin_keys
                .contains(&(user, record.quest.clone()))
        {
            return Err(FitpetError::AlreadyCheckedIn {
                user,
                quest: record.quest.clone(),
            });
        }

        if let Some(log) = exercise_log {
            tables.exercise_logs.entry(user).or_default().push(log);
        }
        if let Some(record) = checkin {
            tables.checkin_keys.insert((user, record.quest.clone()));
            tables.checkins.entry(user).or_default().push(record);
        }
        tables.pets.insert(user, pet.clone());

        Ok((pet, value))
    }
}

// =============================================================================
// TESTS
// =============================================================================
