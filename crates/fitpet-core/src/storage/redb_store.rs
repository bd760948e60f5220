//! # redb-backed Pet Storage
//!
//! A disk-backed [`PetStore`] using the redb embedded database, providing:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//!
//! ## Transactions
//!
//! Each [`PetStore::transact`] call runs inside exactly one redb write
//! transaction: the pet is read, modified and written back, and the staged
//! log or check-in is appended, all under the single-writer lock. Returning
//! early drops the transaction, which aborts it.

use crate::store::{PetStore, PetTxn};
use crate::{CheckinRecord, ExerciseLog, FitpetError, Pet, QuestId, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Table for pets: UserId(u64) -> serialized Pet bytes
const PETS: TableDefinition<u64, &[u8]> = TableDefinition::new("pets");

/// Table for exercise logs: (user_id, seq) -> serialized ExerciseLog bytes
const EXERCISE_LOGS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("exercise_logs");

/// Table for check-ins: (user_id, seq) -> serialized CheckinRecord bytes
const CHECKINS: TableDefinition<(u64, u64), &[u8]> = TableDefinition::new("checkins");

/// Uniqueness index for check-ins: (user_id, quest_id) -> seq
const CHECKIN_INDEX: TableDefinition<(u64, &str), u64> = TableDefinition::new("checkin_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_LOG_SEQ: &str = "next_log_seq";
const NEXT_CHECKIN_SEQ: &str = "next_checkin_seq";

fn storage_err(e: impl std::fmt::Display) -> FitpetError {
    FitpetError::Storage(e.to_string())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, FitpetError> {
    postcard::to_allocvec(value).map_err(|e| FitpetError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, FitpetError> {
    postcard::from_bytes(bytes).map_err(|e| FitpetError::Serialization(e.to_string()))
}

/// Take the next value of a metadata counter within `txn`.
fn next_seq(txn: &WriteTransaction, key: &str) -> Result<u64, FitpetError> {
    let mut meta = txn.open_table(METADATA).map_err(storage_err)?;
    let seq = meta
        .get(key)
        .map_err(storage_err)?
        .map(|v| v.value())
        .unwrap_or(0);
    meta.insert(key, seq.saturating_add(1))
        .map_err(storage_err)?;
    Ok(seq)
}

/// A disk-backed pet store using redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a pet database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FitpetError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(PETS).map_err(storage_err)?;
            let _ = write_txn.open_table(EXERCISE_LOGS).map_err(storage_err)?;
            let _ = write_txn.open_table(CHECKINS).map_err(storage_err)?;
            let _ = write_txn.open_table(CHECKIN_INDEX).map_err(storage_err)?;
            let _ = write_txn.open_table(METADATA).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        Ok(Self { db })
    }

    /// Number of pets stored.
    pub fn pet_count(&self) -> Result<usize, FitpetError> {
        use redb::ReadableTableMetadata;

        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let pets = read_txn.open_table(PETS).map_err(storage_err)?;
        Ok(pets.len().map_err(storage_err)? as usize)
    }

    fn read_records<T: DeserializeOwned>(
        &self,
        table: TableDefinition<'static, (u64, u64), &'static [u8]>,
        user: UserId,
    ) -> Result<Vec<T>, FitpetError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(table).map_err(storage_err)?;

        let mut records = Vec::new();
        for entry in table
            .range((user.0, 0u64)..=(user.0, u64::MAX))
            .map_err(storage_err)?
        {
            let (_, value) = entry.map_err(storage_err)?;
            records.push(decode(value.value())?);
        }
        Ok(records)
    }
}

// =============================================================================
// PETSTORE TRAIT IMPLEMENTATION
// =============================================================================

impl PetStore for RedbStore {
    fn get_pet(&self, user: UserId) -> Result<Option<Pet>, FitpetError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let pets = read_txn.open_table(PETS).map_err(storage_err)?;

        match pets.get(user.0).map_err(storage_err)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn insert_pet(&self, pet: &Pet) -> Result<(), FitpetError> {
        let bytes = encode(pet)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut pets = write_txn.open_table(PETS).map_err(storage_err)?;
            if pets.get(pet.user.0).map_err(storage_err)?.is_some() {
                return Err(FitpetError::PetExists(pet.user));
            }
            pets.insert(pet.user.0, bytes.as_slice())
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn checkin_exists(&self, user: UserId, quest: &QuestId) -> Result<bool, FitpetError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let index = read_txn.open_table(CHECKIN_INDEX).map_err(storage_err)?;

        Ok(index
            .get((user.0, quest.as_str()))
            .map_err(storage_err)?
            .is_some())
    }

    fn exercise_logs(&self, user: UserId) -> Result<Vec<ExerciseLog>, FitpetError> {
        self.read_records(EXERCISE_LOGS, user)
    }

    fn checkins(&self, user: UserId) -> Result<Vec<CheckinRecord>, FitpetError> {
        self.read_records(CHECKINS, user)
    }

    fn transact<T, F>(&self, user: UserId, op: F) -> Result<(Pet, T), FitpetError>
    where
        F: FnOnce(&mut PetTxn) -> Result<T, FitpetError>,
    {
        let write_txn = self.db.begin_write().map_err(storage_err)?;

        let result = {
            let mut pets = write_txn.open_table(PETS).map_err(storage_err)?;
            let pet: Pet = pets
                .get(user.0)
                .map_err(storage_err)?
                .map(|data| decode(data.value()))
                .transpose()?
                .ok_or(FitpetError::NotFound(user))?;

            let mut txn = PetTxn::new(pet);
            let value = op(&mut txn)?;
            let (pet, exercise_log, checkin) = txn.into_parts();

            if let Some(record) = &checkin {
                let mut index = write_txn.open_table(CHECKIN_INDEX).map_err(storage_err)?;
                if index
                    .get((user.0, record.quest.as_str()))
                    .map_err(storage_err)?
                    .is_some()
                {
                    return Err(FitpetError::AlreadyCheckedIn {
                        user,
                        quest: record.quest.clone(),
                    });
                }

                let seq = next_seq(&write_txn, NEXT_CHECKIN_SEQ)?;
                index
                    .insert((user.0, record.quest.as_str()), seq)
                    .map_err(storage_err)?;

                let bytes = encode(record)?;
                let mut checkins = write_txn.open_table(CHECKINS).map_err(storage_err)?;
                checkins
                    .insert((user.0, seq), bytes.as_slice())
                    .map_err(storage_err)?;
            }

            if let Some(log) = &exercise_log {
                let seq = next_seq(&write_txn, NEXT_LOG_SEQ)?;
                let bytes = encode(log)?;
                let mut logs = write_txn.open_table(EXERCISE_LOGS).map_err(storage_err)?;
                logs.insert((user.0, seq), bytes.as_slice())
                    .map_err(storage_err)?;
            }

            let bytes = encode(&pet)?;
            pets.insert(user.0, bytes.as_slice()).map_err(storage_err)?;

            (pet, value)
        };

        write_txn.commit().map_err(storage_err)?;
        Ok(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ExerciseType;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn checkin(user: u64, quest: &str) -> CheckinRecord {
        CheckinRecord {
            user: UserId(user),
            quest: QuestId::new(quest),
            lat: 35.68,
            lng: 139.76,
            checked_in_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
        }
    }

    fn log(user: u64, seconds: u64) -> ExerciseLog {
        ExerciseLog {
            user: UserId(user),
            exercise_type: ExerciseType::Running,
            duration_seconds: seconds,
            steps: seconds * 2,
            volume: 1.5,
            recorded_at: Utc.with_ymd_and_hms(2024, 5, 2, 7, 0, 0).unwrap(),
        }
    }

    #[test]
    fn basic_operations() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        store.insert_pet(&Pet::new(UserId(1))).expect("insert");
        assert_eq!(store.pet_count().expect("count"), 1);
        assert_eq!(
            store.get_pet(UserId(1)).expect("get").map(|p| p.level),
            Some(1)
        );
        assert!(store.get_pet(UserId(2)).expect("get").is_none());
    }

    #[test]
    fn insert_existing_pet_fails() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        store.insert_pet(&Pet::new(UserId(1))).expect("insert");
        let result = store.insert_pet(&Pet::new(UserId(1)));
        assert!(matches!(result, Err(FitpetError::PetExists(_))));
    }

    #[test]
    fn transact_missing_pet() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let result = store.transact(UserId(3), |_| Ok(()));
        assert!(matches!(result, Err(FitpetError::NotFound(UserId(3)))));
    }

    #[test]
    fn transact_appends_logs_in_order() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.insert_pet(&Pet::new(UserId(1))).expect("insert");

        for seconds in [30, 60, 90] {
            store
                .transact(UserId(1), |txn| {
                    txn.append_exercise_log(log(1, seconds));
                    Ok(())
                })
                .expect("transact");
        }

        let durations: Vec<u64> = store
            .exercise_logs(UserId(1))
            .expect("logs")
            .iter()
            .map(|l| l.duration_seconds)
            .collect();
        assert_eq!(durations, vec![30, 60, 90]);
        assert!(store.exercise_logs(UserId(2)).expect("logs").is_empty());
    }

    #[test]
    fn duplicate_checkin_rolls_back_pet_change() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.insert_pet(&Pet::new(UserId(1))).expect("insert");

        store
            .transact(UserId(1), |txn| {
                txn.pet_mut().strength = 20;
                txn.append_checkin(checkin(1, "castle"));
                Ok(())
            })
            .expect("first");

        let result = store.transact(UserId(1), |txn| {
            txn.pet_mut().strength = 40;
            txn.append_checkin(checkin(1, "castle"));
            Ok(())
        });

        assert!(matches!(result, Err(FitpetError::AlreadyCheckedIn { .. })));
        assert_eq!(
            store.get_pet(UserId(1)).expect("get").map(|p| p.strength),
            Some(20)
        );
        assert_eq!(store.checkins(UserId(1)).expect("checkins").len(), 1);
    }

    #[test]
    fn failed_op_aborts_transaction() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.insert_pet(&Pet::new(UserId(1))).expect("insert");

        let result: Result<(Pet, ()), _> = store.transact(UserId(1), |txn| {
            txn.pet_mut().mood = 1;
            txn.append_exercise_log(log(1, 10));
            Err(FitpetError::InvalidInput("nope".into()))
        });

        assert!(result.is_err());
        assert_eq!(store.get_pet(UserId(1)).expect("get").map(|p| p.mood), Some(100));
        assert!(store.exercise_logs(UserId(1)).expect("logs").is_empty());
    }

    #[test]
    fn recovery_persistence_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        // Phase 1: Create data
        {
            let store = RedbStore::open(&db_path).expect("open db");
            store.insert_pet(&Pet::new(UserId(1))).expect("insert");
            store
                .transact(UserId(1), |txn| {
                    txn.pet_mut().level = 7;
                    txn.pet_mut().breakthrough_completed = true;
                    txn.pet_mut().last_reset_at =
                        Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 5, 0).unwrap());
                    txn.append_checkin(checkin(1, "bridge"));
                    txn.append_exercise_log(log(1, 120));
                    Ok(())
                })
                .expect("transact");
        }
        // Store dropped here, simulating process exit

        // Phase 2: Reopen and verify all data persisted
        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            let pet = store.get_pet(UserId(1)).expect("get").unwrap();
            assert_eq!(pet.level, 7);
            assert!(pet.breakthrough_completed);
            assert_eq!(
                pet.last_reset_at,
                Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 5, 0).unwrap())
            );
            assert!(
                store
                    .checkin_exists(UserId(1), &QuestId::new("bridge"))
                    .expect("exists")
            );
            assert_eq!(store.exercise_logs(UserId(1)).expect("logs")[0].volume, 1.5);
        }
    }

    #[test]
    fn recovery_sequence_continues_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let store = RedbStore::open(&db_path).expect("open db");
            store.insert_pet(&Pet::new(UserId(1))).expect("insert");
            store
                .transact(UserId(1), |txn| {
                    txn.append_checkin(checkin(1, "a"));
                    Ok(())
                })
                .expect("transact");
        }

        {
            let store = RedbStore::open(&db_path).expect("reopen db");
            store
                .transact(UserId(1), |txn| {
                    txn.append_checkin(checkin(1, "b"));
                    Ok(())
                })
                .expect("transact");

            let quests: Vec<String> = store
                .checkins(UserId(1))
                .expect("checkins")
                .into_iter()
                .map(|c| c.quest.0)
                .collect();
            assert_eq!(quests, vec!["a".to_string(), "b".to_string()]);
        }
    }
}
