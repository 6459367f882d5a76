//! # Cabfare CLI
//!
//! ```text
//! cabfare [--rates FILE] [--format table|json] <command>
//!
//!   quote one-way --km 345 --vehicle "Swift Dzire" --border
//!   quote round-trip --km 300 --days 2 --vehicle innova
//!   quote local --hours 5
//!   quote acting-driver --plan outstation --days 2
//!   quote relocation --km 1000 --method carrier
//!   quote json trip.json
//!   allowance "Toyota Innova" --days 3
//!   verify
//!   rates
//!   notify --token <device> --title "Driver assigned" --data booking_id=BK-1
//! ```
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG` to change the
//! filter.

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod output;
mod scenarios;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    debug!(format = %cli.format, "Starting cabfare");

    let load_rates =
        || config::load_rates(cli.rates.as_deref()).context("Failed to load rate table");

    match &cli.command {
        Commands::Quote { trip } => commands::quote(&load_rates()?, trip, cli.format),
        Commands::Allowance { model, days, manual } => {
            commands::allowance(&load_rates()?, model, *days, *manual, cli.format)
        }
        Commands::Verify => commands::verify(&load_rates()?, cli.format),
        Commands::Rates => commands::rates(&load_rates()?, cli.format),
        Commands::Notify(args) => commands::notify(args, cli.format).await,
    }
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - Default: info for dependencies, debug for cabfare crates
/// - Override with RUST_LOG environment variable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cabfare=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
