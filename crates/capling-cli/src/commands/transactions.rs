//! Transaction commands (list, add, classify, delete)

use anyhow::{Context, Result};
use capling_core::db::Database;
use capling_core::models::{
    Category, Classification, NewTransaction, TransactionType, TransactionUpdate,
};
use capling_core::TransactionFilter;

use super::{parse_date, truncate};

/// Arguments for recording a transaction from the command line
pub struct TransactionInput<'a> {
    pub account_id: i64,
    pub merchant: &'a str,
    pub amount: f64,
    pub category: &'a str,
    pub classification: &'a str,
    pub transaction_type: &'a str,
    pub date: Option<&'a str>,
    pub reflection: Option<&'a str>,
}

fn classification_icon(classification: Classification) -> &'static str {
    match classification {
        Classification::Responsible => "✅",
        Classification::Irresponsible => "⚠️ ",
        Classification::Neutral => "➖",
    }
}

pub fn cmd_transactions_list(
    db: &Database,
    user: &str,
    limit: i64,
    account_id: Option<i64>,
    classification: Option<&str>,
) -> Result<()> {
    let classification = classification
        .map(str::parse::<Classification>)
        .transpose()
        .map_err(anyhow::Error::msg)?;

    let filter = TransactionFilter::new()
        .account_id(account_id)
        .classification(classification)
        .page(limit.max(1), 0);

    let transactions = db.list_transactions(user, &filter)?;

    if transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    let total = db.count_transactions(user, &filter)?;

    println!();
    println!("💳 Transactions ({} of {})", transactions.len(), total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &transactions {
        let signed = tx.transaction_type.signed(tx.amount);
        println!(
            "   {} [{:>4}] {}  {:<28} {:>10.2}  {}",
            classification_icon(tx.classification),
            tx.id,
            tx.date,
            truncate(&tx.merchant, 28),
            signed,
            tx.category
        );
    }

    Ok(())
}

pub fn cmd_transactions_add(db: &Database, user: &str, input: TransactionInput<'_>) -> Result<()> {
    let category: Category = input.category.parse().map_err(anyhow::Error::msg)?;
    let classification: Classification =
        input.classification.parse().map_err(anyhow::Error::msg)?;
    let transaction_type: TransactionType =
        input.transaction_type.parse().map_err(anyhow::Error::msg)?;
    let date = match input.date {
        Some(d) => parse_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    let tx = NewTransaction {
        account_id: input.account_id,
        merchant: input.merchant.to_string(),
        amount: input.amount,
        category,
        classification,
        reflection: input.reflection.map(str::to_string),
        description: None,
        date,
        timestamp: None,
        transaction_type,
    };

    let id = db
        .insert_transaction(user, &tx)
        .context("Failed to record transaction")?;

    let balance = db
        .get_account(user, input.account_id)?
        .map(|a| a.balance)
        .unwrap_or_default();

    println!(
        "{} Recorded {} of {:.2} at {} (ID: {})",
        classification_icon(classification),
        transaction_type,
        input.amount,
        input.merchant,
        id
    );
    println!("   Account balance: {:.2}", balance);

    Ok(())
}

pub fn cmd_transactions_classify(
    db: &Database,
    user: &str,
    id: i64,
    classification: &str,
) -> Result<()> {
    let classification: Classification = classification.parse().map_err(anyhow::Error::msg)?;

    let update = TransactionUpdate {
        classification: Some(classification),
        ..Default::default()
    };
    let tx = db.update_transaction(user, id, &update)?;

    println!(
        "{} Transaction {} ({}) is now {}",
        classification_icon(tx.classification),
        id,
        tx.merchant,
        tx.classification
    );

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, user: &str, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(user, id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(user, id)?;

    println!(
        "🗑️  Deleted transaction {} ({} {:.2})",
        id, tx.merchant, tx.amount
    );

    Ok(())
}
