//! # Fitpet HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /pets/{user_id}` - Adopt a pet
//! - `GET /pets/{user_id}` - Pet status and progress
//! - `POST /pets/{user_id}/exercise` - Submit an exercise session
//! - `POST /pets/{user_id}/checkin` - Check in at a landmark
//! - `POST /pets/{user_id}/daily-check` - Run the daily reset
//! - `POST /pets/{user_id}/breakthrough` - Complete a pending breakthrough
//! - `GET /pets/{user_id}/exercises` - Exercise history
//! - `GET /pets/{user_id}/checkins` - Check-in history
//! - `GET /pets/{user_id}/checkins/{quest_id}` - Whether a landmark was visited
//! - `GET /pets/{user_id}/breakthrough-quest` - Random landmark for the gate
//!
//! ## Configuration (Environment Variables)
//!
//! - `FITPET_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `FITPET_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)

mod handlers;
mod middleware;
mod types;

pub use middleware::{
    DEFAULT_RATE_LIMIT, create_rate_limiter, get_rate_limit_from_env, parse_rate_limit,
};
pub use types::{
    ApiError, BreakthroughResponse, CheckinHistoryResponse, CheckinRequest, CheckinResponse,
    CheckinStatusResponse, DailyCheckResponse, ErrorResponse, ExerciseHistoryResponse,
    ExerciseRequest, ExerciseResponse, HealthResponse, PetResponse, QuestResponse,
};

use crate::AppError;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use fitpet_core::{QuestCatalog, Session, StaticCatalog};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are tiny; anything larger is malformed.
const MAX_BODY_BYTES: usize = 16 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// `Session` serializes each operation inside its storage backend, so it is
/// shared without an outer lock.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub catalog: Arc<dyn QuestCatalog>,
}

impl AppState {
    /// State with the built-in landmark catalog.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self::with_catalog(session, StaticCatalog::builtin())
    }

    #[must_use]
    pub fn with_catalog(session: Session, catalog: impl QuestCatalog + 'static) -> Self {
        Self {
            session: Arc::new(session),
            catalog: Arc::new(catalog),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from a `FITPET_CORS_ORIGINS` value.
///
/// - `"*"`: allow all origins
/// - unset or no valid entries: localhost only
/// - otherwise: the comma-separated list
pub fn build_cors_layer(origins_env: Option<&str>) -> CorsLayer {
    match origins_env {
        Some("*") => {
            tracing::warn!("CORS: allowing ALL origins (FITPET_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|s| match s.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!(origin = s, "CORS: allowing origin");
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!(origin = s, error = %e, "CORS: invalid origin");
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!("CORS: no valid origins in FITPET_CORS_ORIGINS, using localhost");
                build_localhost_cors()
            } else {
                cors_for(allowed)
            }
        }
        None => build_localhost_cors(),
    }
}

fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    cors_for(origins)
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit, rate limiting.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(std::env::var("FITPET_CORS_ORIGINS").ok().as_deref());

    let rate_limit = get_rate_limit_from_env();

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/pets/{user_id}",
            get(handlers::pet_status_handler).post(handlers::adopt_handler),
        )
        .route("/pets/{user_id}/exercise", post(handlers::exercise_handler))
        .route("/pets/{user_id}/checkin", post(handlers::checkin_handler))
        .route(
            "/pets/{user_id}/daily-check",
            post(handlers::daily_check_handler),
        )
        .route(
            "/pets/{user_id}/breakthrough",
            post(handlers::breakthrough_handler),
        )
        .route("/pets/{user_id}/exercises", get(handlers::exercises_handler))
        .route("/pets/{user_id}/checkins", get(handlers::checkins_handler))
        .route(
            "/pets/{user_id}/checkins/{quest_id}",
            get(handlers::checkin_status_handler),
        )
        .route(
            "/pets/{user_id}/breakthrough-quest",
            get(handlers::breakthrough_quest_handler),
        );

    if rate_limit > 0 {
        tracing::info!(rps = rate_limit, "rate limiting enabled");
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("rate limiting disabled");
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), AppError> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr, "Fitpet HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
