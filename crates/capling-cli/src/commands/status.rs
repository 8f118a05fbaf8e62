//! Mascot status commands
//!
//! `status` derives the Capling from the local database, `remote-status` from
//! a hosted Supabase store. Both render the same text card.

use anyhow::{Context, Result};
use capling_core::db::Database;
use capling_core::profile::DEFAULT_CAPLING_NAME;
use capling_core::{
    CaplingService, CaplingStatus, ClassificationSource, GamificationConfig, SupabaseClient,
};

use super::goals::progress_bar;

/// Render the mascot card as plain text
pub fn render_status(status: &CaplingStatus) -> String {
    let view = &status.view;
    let mut lines = Vec::new();

    lines.push(String::new());
    lines.push(format!("{}  {}", view.mood.emoji, view.name));
    lines.push("   ─────────────────────────────────────────────".to_string());
    lines.push(format!("   Mood:   {}", status.mood));
    lines.push(format!("   \"{}\"", view.mood.message));
    lines.push(format!("   {} · {}", view.badge.label, view.badge.title));
    lines.push(format!("   Aura:   {}", view.aura.tier.as_str()));
    lines.push(format!(
        "   {} {:>5.1}%",
        progress_bar(view.progress.percent / 100.0, 20),
        view.progress.percent
    ));
    lines.push(format!(
        "   {} · {}",
        view.progress.xp_label, view.progress.next_label
    ));
    lines.push(format!(
        "   History: {} responsible, {} irresponsible, {} neutral",
        status.counts.responsible, status.counts.irresponsible, status.counts.neutral
    ));

    lines.join("\n")
}

fn print_status(status: &CaplingStatus, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(status)?);
    } else {
        println!("{}", render_status(status));
    }
    Ok(())
}

/// Derive the status for `user_id` from any classification source
pub async fn derive_status<S>(
    source: &S,
    user_id: &str,
    name: &str,
    config: GamificationConfig,
) -> Result<CaplingStatus>
where
    S: ClassificationSource + ?Sized,
{
    let service = CaplingService::new(config);
    service
        .status(source, user_id, name)
        .await
        .with_context(|| format!("Failed to read history from {}", source.source_name()))
}

pub async fn cmd_status(
    db: &Database,
    user: &str,
    config: GamificationConfig,
    json: bool,
) -> Result<()> {
    let profile = db.get_or_create_profile(user)?;
    let status = derive_status(db, user, &profile.capling_name, config).await?;
    print_status(&status, json)
}

pub async fn cmd_remote_status(user_id: &str, config: GamificationConfig, json: bool) -> Result<()> {
    let client = SupabaseClient::from_env().context("Hosted store is not configured")?;
    tracing::info!("Reading classifications from {}", client.base_url());

    let status = derive_status(&client, user_id, DEFAULT_CAPLING_NAME, config).await?;
    print_status(&status, json)
}
