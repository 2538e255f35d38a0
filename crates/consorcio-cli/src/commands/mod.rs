//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `serve` - Web server command
//! - `status` - Data-store connectivity and configuration status
//! - `summary` - Expense summary report for one building

pub mod serve;
pub mod status;
pub mod summary;

// Re-export command functions for main.rs
pub use serve::*;
pub use status::*;
pub use summary::*;

use anyhow::{Context, Result};
use consorcio_core::{StoreClient, StoreConfig};

/// Build a store client from the environment.
///
/// Fails when the data-store URL or API key is unset; commands never
/// fall back to built-in credentials.
pub fn store_from_env() -> Result<StoreClient> {
    let config = StoreConfig::from_env().context("Data store is not configured")?;
    StoreClient::new(config).context("Failed to build store client")
}

/// Truncate a string to a maximum character count, adding "..." if
/// truncated. Counts characters, not bytes; descriptions are Spanish.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
