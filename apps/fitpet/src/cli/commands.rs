//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{Backend, HistoryKind};
use crate::{AppError, api, catalog};
use chrono::Utc;
use fitpet_core::{
    CheckinInput, ExerciseInput, ExerciseType, Pet, PetStatus, QuestCatalog, QuestId, Session,
    UserId,
};
use serde::Serialize;
use std::path::PathBuf;

/// Global options every command runs with.
#[derive(Debug, Clone)]
pub struct Context {
    pub database: PathBuf,
    pub backend: Backend,
    pub json_mode: bool,
    pub catalog: Option<PathBuf>,
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// One-shot commands need state that outlives the process.
fn require_redb(ctx: &Context) -> Result<(), AppError> {
    match ctx.backend {
        Backend::Redb => Ok(()),
        Backend::Memory => Err(AppError::Usage(
            "--backend memory only applies to `server`; other commands need a database file"
                .to_string(),
        )),
    }
}

/// Open the redb session for a one-shot command.
pub fn open_session(ctx: &Context) -> Result<Session, AppError> {
    require_redb(ctx)?;
    Ok(Session::with_redb(&ctx.database)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_pet(pet: &Pet) {
    println!("Pet of user {}", pet.user);
    println!("==================");
    println!("Stage:    {}", pet.stage);
    println!("Level:    {}", pet.level);
    println!("Strength: {}", pet.strength);
    println!("Stamina:  {}", pet.stamina);
    println!("Mood:     {}", pet.mood);
    if pet.is_gated() {
        println!("Breakthrough required to keep leveling.");
    }
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(ctx: &Context, host: &str, port: u16) -> Result<(), AppError> {
    let session = match ctx.backend {
        Backend::Redb => Session::with_redb(&ctx.database)?,
        Backend::Memory => {
            tracing::warn!("using the in-memory backend; nothing will be saved");
            Session::new()
        }
    };
    let landmarks = catalog::load_catalog(ctx.catalog.as_deref())?;

    println!("Fitpet Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", host);
    println!("  Port:      {}", port);
    println!("  Backend:   {:?}", ctx.backend);
    println!("  Database:  {:?}", ctx.database);
    println!("  Landmarks: {}", landmarks.len());
    println!();
    println!("Endpoints:");
    println!("  GET  /health");
    println!("  POST /pets/{{user_id}}               - Adopt a pet");
    println!("  GET  /pets/{{user_id}}               - Pet status");
    println!("  POST /pets/{{user_id}}/exercise      - Record exercise");
    println!("  POST /pets/{{user_id}}/checkin       - Landmark check-in");
    println!("  POST /pets/{{user_id}}/daily-check   - Daily reset");
    println!("  POST /pets/{{user_id}}/breakthrough  - Complete breakthrough");
    println!("  GET  /pets/{{user_id}}/exercises     - Exercise history");
    println!("  GET  /pets/{{user_id}}/checkins      - Check-in history");
    println!("  GET  /pets/{{user_id}}/checkins/{{quest_id}}");
    println!("  GET  /pets/{{user_id}}/breakthrough-quest");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, api::AppState::with_catalog(session, landmarks)).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), AppError> {
    require_redb(ctx)?;
    if ctx.database.exists() {
        if !force {
            return Err(AppError::Usage(
                "database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(&ctx.database)?;
    }
    let _session = Session::with_redb(&ctx.database)?;
    println!("Initialized new redb database at {:?}", ctx.database);
    Ok(())
}

// =============================================================================
// PET COMMANDS
// =============================================================================

/// Adopt a pet.
pub fn cmd_adopt(ctx: &Context, user: u64) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let pet = session.adopt_pet(UserId(user))?;

    if ctx.json_mode {
        print_json(&PetStatus::from(pet))?;
    } else {
        println!("Adopted a new pet for user {}", user);
        print_pet(&pet);
    }
    Ok(())
}

/// Show a pet and its progress.
pub fn cmd_status(ctx: &Context, user: u64) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let status = session.status(UserId(user))?;

    if ctx.json_mode {
        print_json(&status)?;
        return Ok(());
    }

    print_pet(&status.pet);
    println!();
    let progress = &status.progress;
    println!("Progress: {}%", progress.percent);
    println!("To next level: {} strength", progress.strength_to_next_level);
    match progress.next_gate_level {
        Some(gate) => println!("Next breakthrough: level {}", gate),
        None => println!("Next breakthrough: none"),
    }
    if let Some(next) = progress.next {
        println!("Next stage: {}", next);
    }
    Ok(())
}

// =============================================================================
// EXERCISE COMMAND
// =============================================================================

/// Record an exercise session.
pub fn cmd_exercise(
    ctx: &Context,
    user: u64,
    exercise_type: ExerciseType,
    duration: u64,
    steps: u64,
    volume: f64,
) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let input = ExerciseInput {
        exercise_type,
        duration_seconds: duration,
        steps,
        volume,
    };
    let outcome = session.submit_exercise(UserId(user), &input, Utc::now())?;

    if ctx.json_mode {
        print_json(&outcome)?;
        return Ok(());
    }

    println!("Recorded {} s of {:?}", duration, exercise_type);
    if outcome.levels_gained > 0 {
        println!("Level up! +{} level(s)", outcome.levels_gained);
    }
    if outcome.breakthrough_required {
        println!("Strength gain held back: complete a breakthrough first.");
    }
    print_pet(&outcome.pet);
    Ok(())
}

// =============================================================================
// CHECKIN COMMAND
// =============================================================================

/// Check in at a landmark.
pub fn cmd_checkin(
    ctx: &Context,
    user: u64,
    quest: &str,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<(), AppError> {
    let quest_id = QuestId::new(quest);
    let (lat, lng) = match (lat, lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            let landmarks = catalog::load_catalog(ctx.catalog.as_deref())?;
            let landmark = landmarks.find(&quest_id).ok_or_else(|| {
                AppError::Usage(format!(
                    "quest '{}' is not in the catalog; pass --lat and --lng",
                    quest
                ))
            })?;
            (lat.unwrap_or(landmark.lat), lng.unwrap_or(landmark.lng))
        }
    };

    let session = open_session(ctx)?;
    let input = CheckinInput { quest_id, lat, lng };
    let outcome = session.submit_checkin(UserId(user), &input, Utc::now())?;

    if ctx.json_mode {
        print_json(&outcome)?;
        return Ok(());
    }

    println!("Checked in at '{}'", outcome.checkin.quest);
    if outcome.breakthrough_required {
        println!("Strength reward held back: complete a breakthrough first.");
    }
    print_pet(&outcome.pet);
    Ok(())
}

// =============================================================================
// DAILY / BREAKTHROUGH COMMANDS
// =============================================================================

/// Run the daily reset.
pub fn cmd_daily(ctx: &Context, user: u64) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let outcome = session.run_daily_check(UserId(user), Utc::now())?;

    if ctx.json_mode {
        print_json(&outcome)?;
        return Ok(());
    }

    if outcome.already_checked {
        println!("Already reset today.");
    } else if outcome.met_requirement {
        println!("New day: yesterday's exercise goal was met.");
    } else {
        println!("New day: yesterday's exercise goal was missed.");
    }
    print_pet(&outcome.pet);
    Ok(())
}

/// Complete a pending breakthrough.
pub fn cmd_breakthrough(ctx: &Context, user: u64) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let pet = session.complete_breakthrough(UserId(user))?;

    if ctx.json_mode {
        print_json(&pet)?;
    } else {
        println!("Breakthrough completed!");
        print_pet(&pet);
    }
    Ok(())
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// Show exercise and check-in history.
pub fn cmd_history(ctx: &Context, user: u64, kind: HistoryKind) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let user = UserId(user);

    let exercises = match kind {
        HistoryKind::Exercises | HistoryKind::All => session.exercise_history(user)?,
        HistoryKind::Checkins => Vec::new(),
    };
    let checkins = match kind {
        HistoryKind::Checkins | HistoryKind::All => session.checkin_history(user)?,
        HistoryKind::Exercises => Vec::new(),
    };

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "user_id": user.0,
            "exercises": exercises,
            "checkins": checkins,
        }))?;
        return Ok(());
    }

    if kind != HistoryKind::Checkins {
        println!("Exercises ({})", exercises.len());
        for log in &exercises {
            println!(
                "  {}  {:?}  {} s  {} steps",
                log.recorded_at.to_rfc3339(),
                log.exercise_type,
                log.duration_seconds,
                log.steps
            );
        }
    }
    if kind != HistoryKind::Exercises {
        println!("Check-ins ({})", checkins.len());
        for record in &checkins {
            println!(
                "  {}  {}  ({}, {})",
                record.checked_in_at.to_rfc3339(),
                record.quest,
                record.lat,
                record.lng
            );
        }
    }
    Ok(())
}

// =============================================================================
// QUEST COMMAND
// =============================================================================

/// Pick a landmark for a pending breakthrough.
pub fn cmd_quest(ctx: &Context, user: u64) -> Result<(), AppError> {
    let session = open_session(ctx)?;
    let landmarks = catalog::load_catalog(ctx.catalog.as_deref())?;
    let mut rng = rand::thread_rng();
    let landmark = session.breakthrough_quest(UserId(user), &landmarks, &mut rng)?;

    if ctx.json_mode {
        print_json(landmark)?;
    } else {
        println!("Breakthrough quest: {}", landmark.name);
        println!("  id:       {}", landmark.quest_id);
        println!("  location: {}, {}", landmark.lat, landmark.lng);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
