//! Account commands

use anyhow::{Context, Result};
use capling_core::db::Database;
use capling_core::models::{AccountType, NewAccount};

pub fn cmd_accounts_list(db: &Database, user: &str) -> Result<()> {
    let accounts = db.list_accounts(user)?;

    if accounts.is_empty() {
        println!("No accounts found. Add one with:");
        println!("  capling accounts add \"Main Account\" --balance 500");
        return Ok(());
    }

    println!();
    println!("📁 Accounts");
    println!("   ─────────────────────────────────────────────");

    for account in &accounts {
        println!(
            "   [{}] {} ({}) {:>12.2}",
            account.id,
            super::truncate(&account.account_name, 24),
            account.account_type,
            account.balance
        );
    }

    let total: f64 = accounts.iter().map(|a| a.balance).sum();
    println!("   ─────────────────────────────────────────────");
    println!("   Total: {:.2}", total);

    Ok(())
}

pub fn cmd_accounts_add(
    db: &Database,
    user: &str,
    name: &str,
    account_type: &str,
    balance: f64,
) -> Result<()> {
    let account_type: AccountType = account_type.parse().map_err(anyhow::Error::msg)?;

    let account = NewAccount {
        account_name: name.to_string(),
        account_type,
        balance,
    };
    let id = db
        .create_account(user, &account)
        .context("Failed to create account")?;

    println!(
        "✅ Created {} account '{}' (ID: {}) with balance {:.2}",
        account_type, name, id, balance
    );

    Ok(())
}

pub fn cmd_accounts_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    let account = db
        .get_account(user, id)?
        .ok_or_else(|| anyhow::anyhow!("Account {} not found", id))?;

    db.delete_account(user, id)?;

    println!(
        "🗑️  Deleted account '{}' (ID: {}) and its transactions",
        account.account_name, id
    );

    Ok(())
}
