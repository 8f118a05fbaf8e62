//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use capling_core::GamificationConfig;

use super::open_db;

/// Parse a comma-separated list from an environment variable
fn env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
    gamification: GamificationConfig,
) -> Result<()> {
    println!("🚀 Starting Capling web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let api_keys = env_list("CAPLING_API_KEYS");

    // Trusted networks (for local network access without auth)
    let trusted_networks_str = std::env::var("CAPLING_TRUSTED_NETWORKS").unwrap_or_default();
    let trusted_networks = capling_server::parse_trusted_networks(&trusted_networks_str);

    // Trusted proxies (for extracting real client IP behind reverse proxies)
    let trusted_proxies_str = std::env::var("CAPLING_TRUSTED_PROXIES").unwrap_or_default();
    let trusted_proxies = capling_server::parse_trusted_networks(&trusted_proxies_str);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: Cloudflare Access (header)");
        if !api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (CAPLING_API_KEYS)",
                api_keys.len()
            );
        }
        if !trusted_networks.is_empty() {
            println!(
                "   🏠 Trusted networks: {} (CAPLING_TRUSTED_NETWORKS)",
                trusted_networks
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        if !trusted_proxies.is_empty() {
            println!(
                "   🔀 Trusted proxies: {} (CAPLING_TRUSTED_PROXIES)",
                trusted_proxies
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!(
        "   🐾 Levels: {} (max), mood window: {}",
        gamification.levels.max_level(),
        gamification.mood.window
    );
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = capling_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: env_list("CAPLING_ALLOWED_ORIGINS"),
        api_keys,
        trusted_networks,
        trusted_proxies,
        gamification,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    capling_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}
