//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use fitpet_core::{
    CheckinInput, CheckinRecord, ExerciseInput, ExerciseLog, ExerciseType, FitpetError, Landmark,
    Pet, QuestId, StageProgress,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub kind: String,
}

/// A core error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub FitpetError);

impl From<FitpetError> for ApiError {
    fn from(e: FitpetError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FitpetError::NotFound(_) => StatusCode::NOT_FOUND,
            FitpetError::AlreadyCheckedIn { .. }
            | FitpetError::InvalidState(_)
            | FitpetError::PetExists(_) => StatusCode::CONFLICT,
            FitpetError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FitpetError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            FitpetError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// PET RESPONSES
// =============================================================================

/// Pet plus its progress report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetResponse {
    pub success: bool,
    pub pet: Pet,
    pub progress: StageProgress,
}

impl PetResponse {
    pub fn new(pet: Pet) -> Self {
        let progress = StageProgress::of(&pet);
        Self {
            success: true,
            pet,
            progress,
        }
    }
}

// =============================================================================
// EXERCISE REQUEST/RESPONSE
// =============================================================================

fn default_volume() -> f64 {
    1.0
}

/// Exercise submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRequest {
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub duration_seconds: u64,
    #[serde(default)]
    pub steps: u64,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

impl From<ExerciseRequest> for ExerciseInput {
    fn from(r: ExerciseRequest) -> Self {
        Self {
            exercise_type: r.exercise_type,
            duration_seconds: r.duration_seconds,
            steps: r.steps,
            volume: r.volume,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseResponse {
    pub success: bool,
    pub pet: Pet,
    pub breakthrough_required: bool,
    pub levels_gained: u32,
}

// =============================================================================
// CHECKIN REQUEST/RESPONSE
// =============================================================================

/// Landmark check-in submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinRequest {
    pub quest_id: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<CheckinRequest> for CheckinInput {
    fn from(r: CheckinRequest) -> Self {
        Self {
            quest_id: QuestId::new(r.quest_id),
            lat: r.lat,
            lng: r.lng,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinResponse {
    pub success: bool,
    pub pet: Pet,
    pub checkin: CheckinRecord,
    pub breakthrough_required: bool,
}

// =============================================================================
// DAILY CHECK / BREAKTHROUGH
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCheckResponse {
    pub success: bool,
    pub pet: Pet,
    pub already_checked: bool,
    pub met_requirement: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakthroughResponse {
    pub success: bool,
    pub pet: Pet,
}

// =============================================================================
// HISTORY / QUESTS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseHistoryResponse {
    pub success: bool,
    pub user_id: u64,
    pub exercises: Vec<ExerciseLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinHistoryResponse {
    pub success: bool,
    pub user_id: u64,
    pub checkins: Vec<CheckinRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinStatusResponse {
    pub success: bool,
    pub user_id: u64,
    pub quest_id: QuestId,
    pub checked_in: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestResponse {
    pub success: bool,
    pub landmark: Landmark,
}
