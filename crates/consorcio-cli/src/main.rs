//! Consorcio CLI - Building expense administration
//!
//! Usage:
//!   consorcio serve --port 3000       Start the dashboard API server
//!   consorcio status                  Check data-store connectivity
//!   consorcio summary --building B    Print a building's expense summary

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            origin,
        } => commands::cmd_serve(&host, port, static_dir.as_deref(), origin).await,
        Commands::Status { json } => commands::cmd_status(json).await,
        Commands::Summary {
            building,
            month,
            json,
        } => commands::cmd_summary(&building, month.as_deref(), json).await,
    }
}
