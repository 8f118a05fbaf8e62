//! Savings goal commands

use anyhow::{Context, Result};
use capling_core::db::Database;
use capling_core::models::NewGoal;

use super::parse_date;

/// Render a fixed-width progress bar for a fraction in [0, 1]
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn cmd_goals_list(db: &Database, user: &str) -> Result<()> {
    let goals = db.list_goals(user)?;

    if goals.is_empty() {
        println!("No goals yet. Create one with:");
        println!("  capling goals add \"Emergency fund\" 1000");
        return Ok(());
    }

    println!();
    println!("🎯 Goals");
    println!("   ─────────────────────────────────────────────────────────────");

    for goal in &goals {
        let status = if goal.is_completed { " ✅" } else { "" };
        println!(
            "   [{}] {} {}{}",
            goal.id, goal.emoji, goal.title, status
        );
        println!(
            "       {} {:>5.1}%  {:.2} / {:.2}",
            progress_bar(goal.progress(), 20),
            goal.progress() * 100.0,
            goal.current_amount,
            goal.target_amount
        );
        if let Some(date) = goal.target_date {
            println!("       by {}", date);
        }
    }

    Ok(())
}

pub fn cmd_goals_add(
    db: &Database,
    user: &str,
    title: &str,
    target: f64,
    emoji: Option<&str>,
    by: Option<&str>,
) -> Result<()> {
    let mut goal = NewGoal::new(title, target);
    if let Some(emoji) = emoji {
        goal.emoji = emoji.to_string();
    }
    goal.target_date = by.map(parse_date).transpose()?;

    let id = db.create_goal(user, &goal).context("Failed to create goal")?;

    println!(
        "✅ Created goal {} '{}' (ID: {}) targeting {:.2}",
        goal.emoji, title, id, target
    );

    Ok(())
}

pub fn cmd_goals_contribute(db: &Database, user: &str, id: i64, amount: f64) -> Result<()> {
    let goal = db.contribute_to_goal(user, id, amount)?;

    println!(
        "💰 Added {:.2} to '{}': {:.2} / {:.2}",
        amount, goal.title, goal.current_amount, goal.target_amount
    );
    if goal.is_completed {
        println!("🎉 Goal reached!");
    }

    Ok(())
}

pub fn cmd_goals_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    db.delete_goal(user, id)?;
    println!("🗑️  Deleted goal {}", id);
    Ok(())
}
