//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, config) and shared utilities (open_db, load_config)
//! - `accounts` - Account commands (list, add, delete)
//! - `transactions` - Transaction commands (list, add, classify, delete)
//! - `goals` - Savings goal commands (list, add, contribute, delete)
//! - `profile` - Profile commands (show, rename)
//! - `serve` - Web server command
//! - `status` - Mascot status, local and from a hosted store

pub mod accounts;
pub mod core;
pub mod goals;
pub mod profile;
pub mod serve;
pub mod status;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use core::*;
pub use goals::*;
pub use profile::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Parse a YYYY-MM-DD date argument
pub fn parse_date(value: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date '{}' (expected YYYY-MM-DD)", value))
}
