//! # Breakthrough Completion
//!
//! The only way out of the gated state. Completion flips
//! `breakthrough_completed` and re-resolves the stage; it does not run the
//! rollover, so strength banked while gated stays pending until the next
//! stat-applying call.

use crate::store::PetStore;
use crate::system::GateState;
use crate::{FitpetError, Pet, UserId};

/// Mark the pending breakthrough of `pet` as completed.
pub fn complete(pet: &mut Pet) -> Result<(), FitpetError> {
    if pet.gate_state() != GateState::Gated {
        return Err(FitpetError::InvalidState(format!(
            "no breakthrough pending at level {}",
            pet.level
        )));
    }
    pet.breakthrough_completed = true;
    pet.refresh_stage();
    Ok(())
}

/// Complete the breakthrough of the pet owned by `user`.
pub fn complete_breakthrough<S: PetStore>(store: &S, user: UserId) -> Result<Pet, FitpetError> {
    let (pet, ()) = store.transact(user, |txn| complete(txn.pet_mut()))?;
    tracing::info!(user = %user, level = pet.level, stage = %pet.stage, "breakthrough completed");
    Ok(pet)
}
