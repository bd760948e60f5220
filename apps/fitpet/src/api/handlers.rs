//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Handlers read the wall clock and the RNG here, at the edge, and pass both
//! into the core.

use super::{
    AppState,
    types::{
        ApiError, BreakthroughResponse, CheckinHistoryResponse, CheckinRequest, CheckinResponse,
        CheckinStatusResponse, DailyCheckResponse, ExerciseHistoryResponse, ExerciseRequest, ExerciseResponse,
        HealthResponse, PetResponse, QuestResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use fitpet_core::{CheckinInput, ExerciseInput, QuestId, UserId};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// PET HANDLERS
// =============================================================================

/// Adopt the default pet for a user.
pub async fn adopt_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let pet = state.session.adopt_pet(UserId(user_id))?;
    Ok((StatusCode::CREATED, Json(PetResponse::new(pet))))
}

/// Get a pet and its progress report.
pub async fn pet_status_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<PetResponse>, ApiError> {
    let pet = state.session.get_pet(UserId(user_id))?;
    Ok(Json(PetResponse::new(pet)))
}

// =============================================================================
// EXERCISE HANDLER
// =============================================================================

pub async fn exercise_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(request): Json<ExerciseRequest>,
) -> Result<Json<ExerciseResponse>, ApiError> {
    let input = ExerciseInput::from(request);
    let outcome = state
        .session
        .submit_exercise(UserId(user_id), &input, Utc::now())?;

    Ok(Json(ExerciseResponse {
        success: true,
        pet: outcome.pet,
        breakthrough_required: outcome.breakthrough_required,
        levels_gained: outcome.levels_gained,
    }))
}

// =============================================================================
// CHECKIN HANDLER
// =============================================================================

pub async fn checkin_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(request): Json<CheckinRequest>,
) -> Result<Json<CheckinResponse>, ApiError> {
    let input = CheckinInput::from(request);
    let outcome = state
        .session
        .submit_checkin(UserId(user_id), &input, Utc::now())?;

    Ok(Json(CheckinResponse {
        success: true,
        pet: outcome.pet,
        checkin: outcome.checkin,
        breakthrough_required: outcome.breakthrough_required,
    }))
}

// =============================================================================
// DAILY CHECK / BREAKTHROUGH HANDLERS
// =============================================================================

pub async fn daily_check_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<DailyCheckResponse>, ApiError> {
    let outcome = state.session.run_daily_check(UserId(user_id), Utc::now())?;

    Ok(Json(DailyCheckResponse {
        success: true,
        pet: outcome.pet,
        already_checked: outcome.already_checked,
        met_requirement: outcome.met_requirement,
    }))
}

pub async fn breakthrough_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<BreakthroughResponse>, ApiError> {
    let pet = state.session.complete_breakthrough(UserId(user_id))?;
    Ok(Json(BreakthroughResponse { success: true, pet }))
}

// =============================================================================
// HISTORY HANDLERS
// =============================================================================

pub async fn exercises_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<ExerciseHistoryResponse>, ApiError> {
    let exercises = state.session.exercise_history(UserId(user_id))?;
    Ok(Json(ExerciseHistoryResponse {
        success: true,
        user_id,
        exercises,
    }))
}

pub async fn checkins_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<CheckinHistoryResponse>, ApiError> {
    let checkins = state.session.checkin_history(UserId(user_id))?;
    Ok(Json(CheckinHistoryResponse {
        success: true,
        user_id,
        checkins,
    }))
}

/// Whether the user has already checked in at `quest_id`.
pub async fn checkin_status_handler(
    State(state): State<AppState>,
    Path((user_id, quest_id)): Path<(u64, String)>,
) -> Result<Json<CheckinStatusResponse>, ApiError> {
    let quest_id = QuestId::new(quest_id);
    let checked_in = state.session.has_checked_in(UserId(user_id), &quest_id)?;
    Ok(Json(CheckinStatusResponse {
        success: true,
        user_id,
        quest_id,
        checked_in,
    }))
}

// =============================================================================
// QUEST HANDLER
// =============================================================================

/// Pick a landmark for the user's pending breakthrough.
pub async fn breakthrough_quest_handler(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Result<Json<QuestResponse>, ApiError> {
    let landmark = {
        let mut rng = rand::thread_rng();
        state
            .session
            .breakthrough_quest(UserId(user_id), state.catalog.as_ref(), &mut rng)?
            .clone()
    };
    Ok(Json(QuestResponse {
        success: true,
        landmark,
    }))
}
