//! Profile commands

use anyhow::Result;
use capling_core::db::Database;

pub fn cmd_profile_show(db: &Database, user: &str) -> Result<()> {
    let profile = db.get_or_create_profile(user)?;

    println!();
    println!("👤 Profile");
    println!("   ─────────────────────────────");
    println!("   User: {}", profile.id);
    if let Some(name) = &profile.full_name {
        println!("   Name: {}", name);
    }
    println!("   Capling: {}", profile.capling_name);
    println!("   Weekly budget: {:.2}", profile.weekly_budget);

    Ok(())
}

pub fn cmd_profile_rename(db: &Database, user: &str, name: &str) -> Result<()> {
    let name = db.update_capling_name(user, name)?;
    println!("✅ Your Capling is now called {}", name);
    Ok(())
}
