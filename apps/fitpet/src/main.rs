//! # Fitpet Server
//!
//! The main binary for the Fitpet progression engine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               apps/fitpet (THE BINARY)           │
//! │                                                  │
//! │   ┌─────────────┐          ┌─────────────┐       │
//! │   │    CLI      │          │  HTTP API   │       │
//! │   │   (clap)    │          │   (axum)    │       │
//! │   └──────┬──────┘          └──────┬──────┘       │
//! │          └──────────┬─────────────┘              │
//! │                     ▼                            │
//! │             ┌───────────────┐                    │
//! │             │  fitpet-core  │                    │
//! │             │  (THE RULES)  │                    │
//! │             └───────────────┘                    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! fitpet server --host 0.0.0.0 --port 8080
//! fitpet adopt 42
//! fitpet exercise 42 --type running --duration 900 --steps 1800
//! fitpet checkin 42 --quest namsan-tower
//! fitpet status 42
//! ```

use clap::Parser;
use fitpet::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "fitpet=info,fitpet_core=info,tower_http=debug";
const VERBOSE_FILTER: &str = "fitpet=debug,fitpet_core=debug,tower_http=debug";

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // FITPET_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FITPET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Fitpet startup banner.
fn print_banner() {
    println!(
        r#"
   ___ _ _               _
  | __(_) |_ _ __  ___ _| |_
  | _|| |  _| '_ \/ -_)_   _|
  |_| |_|\__| .__/\___| |_|
            |_|

  Fitpet v{}

  Move • Explore • Evolve
"#,
        env!("CARGO_PKG_VERSION")
    );
}
