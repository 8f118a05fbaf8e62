//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Load the gamification config
//! - `cmd_init` - Initialize the database
//! - `cmd_config` - Print the effective gamification config

use std::path::Path;

use anyhow::{Context, Result};
use capling_core::config::default_config_path;
use capling_core::db::Database;
use capling_core::GamificationConfig;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load the gamification config from an explicit path or the default location
pub fn load_config(path: Option<&Path>) -> Result<GamificationConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            GamificationConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => GamificationConfig::load().context("Failed to load gamification config"),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if db.is_encrypted().unwrap_or(false) {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add an account: capling accounts add \"Main Account\" --balance 500");
    println!("  2. Record spending: capling transactions add --account 1 --merchant Cafe 4.50");
    println!("  3. Check on your Capling: capling status");

    Ok(())
}

pub fn cmd_config(config: &GamificationConfig, explicit: Option<&Path>) -> Result<()> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) if path.exists() => println!("# Loaded from {}", path.display()),
        Some(path) => println!("# Built-in defaults (override at {})", path.display()),
        None => println!("# Built-in defaults"),
    }
    println!();
    print!("{}", config.to_toml().context("Failed to render config")?);
    Ok(())
}
