//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use clap::{Parser, Subcommand};

/// Consorcio - Building expense administration
#[derive(Parser)]
#[command(name = "consorcio")]
#[command(about = "Expense administration service for managed buildings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing the dashboard frontend (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<String>,

        /// Allowed CORS origin (repeatable)
        ///
        /// When omitted, the server only answers same-origin requests.
        #[arg(long)]
        origin: Vec<String>,
    },

    /// Show data-store connectivity and configuration status
    Status {
        /// Emit machine-readable JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Print a building's expense summary for a reporting month
    Summary {
        /// Building id to summarize
        #[arg(short, long)]
        building: String,

        /// Reporting month (YYYY-MM), "all", or omitted for the most recent
        #[arg(short, long)]
        month: Option<String>,

        /// Emit machine-readable JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },
}
