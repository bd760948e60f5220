//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use fitpet::api::{
    ApiError, CheckinRequest, ErrorResponse, ExerciseRequest, HealthResponse, PetResponse,
};
use fitpet_core::{CheckinInput, ExerciseInput, ExerciseType, FitpetError, Pet, QuestId, UserId};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// EXERCISE REQUEST TESTS
// =============================================================================

#[test]
fn test_exercise_request_uses_type_key() {
    let json = r#"{"type":"RUNNING","duration_seconds":300,"steps":450,"volume":1.5}"#;
    let request: ExerciseRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.exercise_type, ExerciseType::Running);
    assert_eq!(request.duration_seconds, 300);
    assert_eq!(request.steps, 450);
}

#[test]
fn test_exercise_request_defaults() {
    let json = r#"{"type":"STATIONARY","duration_seconds":60}"#;
    let request: ExerciseRequest = serde_json::from_str(json).unwrap();
    let input = ExerciseInput::from(request);

    assert_eq!(input.steps, 0);
    assert_eq!(input.volume.to_bits(), 1.0f64.to_bits());
}

#[test]
fn test_exercise_request_rejects_unknown_type() {
    let json = r#"{"type":"SWIMMING","duration_seconds":60}"#;
    assert!(serde_json::from_str::<ExerciseRequest>(json).is_err());
}

#[test]
fn test_exercise_request_rejects_negative_duration() {
    let json = r#"{"type":"WALKING","duration_seconds":-5}"#;
    assert!(serde_json::from_str::<ExerciseRequest>(json).is_err());
}

// =============================================================================
// CHECKIN REQUEST TESTS
// =============================================================================

#[test]
fn test_checkin_request_into_input() {
    let json = r#"{"quest_id":"namsan-tower","lat":37.55,"lng":126.98}"#;
    let request: CheckinRequest = serde_json::from_str(json).unwrap();
    let input = CheckinInput::from(request);

    assert_eq!(input.quest_id, QuestId::new("namsan-tower"));
}

// =============================================================================
// PET RESPONSE TESTS
// =============================================================================

#[test]
fn test_pet_response_serialization() {
    let response = PetResponse::new(Pet::new(UserId(9)));
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["pet"]["user"], 9);
    assert_eq!(json["pet"]["stage"], "EGG");
    assert_eq!(json["pet"]["stamina"], 900);
    assert_eq!(json["pet"]["daily_quests"], serde_json::json!([false, true, true]));
    assert_eq!(json["progress"]["gate"], "normal");
    assert_eq!(json["progress"]["strength_to_next_level"], 120);
}

#[test]
fn test_pet_response_roundtrip() {
    let response = PetResponse::new(Pet::new(UserId(3)));
    let json = serde_json::to_string(&response).unwrap();
    let back: PetResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pet, response.pet);
}

// =============================================================================
// ERROR MAPPING TESTS
// =============================================================================

#[test]
fn test_error_status_mapping() {
    let cases = [
        (FitpetError::NotFound(UserId(1)), StatusCode::NOT_FOUND),
        (
            FitpetError::AlreadyCheckedIn {
                user: UserId(1),
                quest: QuestId::new("q"),
            },
            StatusCode::CONFLICT,
        ),
        (FitpetError::InvalidState("x".into()), StatusCode::CONFLICT),
        (FitpetError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
        (FitpetError::PetExists(UserId(1)), StatusCode::CONFLICT),
        (FitpetError::Storage("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        (
            FitpetError::Serialization("x".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, status) in cases {
        assert_eq!(ApiError(error).status(), status);
    }
}

#[test]
fn test_error_response_deserialization() {
    let json = r#"{"success":false,"error":"pet not found","kind":"not_found"}"#;
    let error: ErrorResponse = serde_json::from_str(json).unwrap();
    assert!(!error.success);
    assert_eq!(error.kind, "not_found");
}
