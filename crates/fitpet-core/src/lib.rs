//! # fitpet-core
//!
//! The deterministic Pet Progression Engine for Fitpet - THE RULES.
//!
//! Exercise sessions and landmark check-ins are turned into stat deltas,
//! level rollovers, breakthrough gating, daily resets and check-in
//! deduplication for a per-user virtual pet.
//!
//! ## Architectural Constraints
//!
//! The CORE:
//! - Is the only place that mutates pet stats (through `ProgressionEngine`)
//! - Never reads a clock: every operation takes its timestamp from the caller
//! - Never initiates interaction; it only reacts to explicit requests
//! - Has NO async, NO network dependencies (pure Rust)
//! - Depends on persistence only through the `PetStore` trait

// =============================================================================
// MODULES
// =============================================================================

pub mod breakthrough;
pub mod checkin;
pub mod daily;
pub mod exercise;
pub mod primitives;
pub mod progression;
pub mod quest;
pub mod session;
pub mod storage;
pub mod store;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CheckinRecord, DailyQuests, ExerciseLog, ExerciseType, FitpetError, Pet, QuestId, Stage,
    UserId,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use breakthrough::complete_breakthrough;
pub use checkin::{CheckinInput, CheckinOutcome, CheckinProcessor};
pub use daily::{DailyCheckOutcome, DailyReset, is_new_day};
pub use exercise::{ExerciseInput, ExerciseOutcome, ExerciseProcessor, exercise_deltas};
pub use progression::{ProgressionEngine, ProgressionOutcome, StatDelta};
pub use quest::{Landmark, QuestCatalog, StaticCatalog, pick_breakthrough_quest};
pub use session::{PetStatus, Session, StorageBackend};
pub use storage::RedbStore;
pub use store::{MemoryStore, PetStore, PetTxn};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::{GateState, StageProgress, clamp, is_gate_level, resolve_stage};
