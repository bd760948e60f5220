//! # Fitpet CLI Module
//!
//! This module implements the CLI interface for Fitpet.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `adopt` - Adopt a pet for a user
//! - `status` - Show a pet and its progress
//! - `exercise` - Record an exercise session
//! - `checkin` - Check in at a landmark
//! - `daily` - Run the daily reset
//! - `breakthrough` - Complete a pending breakthrough
//! - `history` - Show exercise and check-in history
//! - `quest` - Pick a landmark for a pending breakthrough

mod commands;

use crate::AppError;
use clap::{Parser, Subcommand, ValueEnum};
use fitpet_core::ExerciseType;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Fitpet - exercise and landmark check-ins grow a virtual pet.
#[derive(Parser, Debug)]
#[command(name = "fitpet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the pet database
    #[arg(short = 'D', long, global = true, default_value = "fitpet.redb")]
    pub database: PathBuf,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum, default_value_t = Backend::Redb)]
    pub backend: Backend,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Landmark catalog (TOML); the built-in catalog is used when absent
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// ACID database file (redb)
    Redb,
    /// Volatile in-memory tables (`server` only)
    Memory,
}

/// Exercise kind as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExerciseKind {
    Stationary,
    Running,
    Walking,
}

impl From<ExerciseKind> for ExerciseType {
    fn from(kind: ExerciseKind) -> Self {
        match kind {
            ExerciseKind::Stationary => ExerciseType::Stationary,
            ExerciseKind::Running => ExerciseType::Running,
            ExerciseKind::Walking => ExerciseType::Walking,
        }
    }
}

/// Which history to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryKind {
    Exercises,
    Checkins,
    All,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Adopt a pet for a user
    Adopt { user: u64 },

    /// Show a pet and its progress
    Status { user: u64 },

    /// Record an exercise session
    Exercise {
        user: u64,

        /// Kind of exercise
        #[arg(short = 't', long = "type", value_enum, default_value_t = ExerciseKind::Walking)]
        exercise_type: ExerciseKind,

        /// Duration in seconds
        #[arg(short, long)]
        duration: u64,

        /// Steps taken
        #[arg(short, long, default_value = "0")]
        steps: u64,

        /// Intensity coefficient (recorded only)
        #[arg(long, default_value = "1.0")]
        volume: f64,
    },

    /// Check in at a landmark
    Checkin {
        user: u64,

        /// Quest (landmark) id
        #[arg(long)]
        quest: String,

        /// Latitude; defaults to the catalog landmark's
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; defaults to the catalog landmark's
        #[arg(long, allow_negative_numbers = true)]
        lng: Option<f64>,
    },

    /// Run the daily reset
    Daily { user: u64 },

    /// Complete a pending breakthrough
    Breakthrough { user: u64 },

    /// Show exercise and check-in history
    History {
        user: u64,

        #[arg(short, long, value_enum, default_value_t = HistoryKind::All)]
        kind: HistoryKind,
    },

    /// Pick a landmark for a pending breakthrough
    Quest { user: u64 },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let ctx = Context {
        database: cli.database,
        backend: cli.backend,
        json_mode: cli.json_mode,
        catalog: cli.catalog,
    };

    match cli.command {
        Commands::Server { host, port } => cmd_server(&ctx, &host, port).await,
        Commands::Init { force } => cmd_init(&ctx, force),
        Commands::Adopt { user } => cmd_adopt(&ctx, user),
        Commands::Status { user } => cmd_status(&ctx, user),
        Commands::Exercise {
            user,
            exercise_type,
            duration,
            steps,
            volume,
        } => cmd_exercise(&ctx, user, exercise_type.into(), duration, steps, volume),
        Commands::Checkin {
            user,
            quest,
            lat,
            lng,
        } => cmd_checkin(&ctx, user, &quest, lat, lng),
        Commands::Daily { user } => cmd_daily(&ctx, user),
        Commands::Breakthrough { user } => cmd_breakthrough(&ctx, user),
        Commands::History { user, kind } => cmd_history(&ctx, user, kind),
        Commands::Quest { user } => cmd_quest(&ctx, user),
    }
}
