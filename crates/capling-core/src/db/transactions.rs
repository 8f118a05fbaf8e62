//! Transaction operations
//!
//! Inserting, editing and deleting a transaction posts its signed amount to
//! the owning account's balance inside the same SQL transaction, so the
//! balance always matches the transactions that remain.

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use super::transaction_filter::TransactionFilter;
use super::{in_transaction, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{
    Classification, ClassificationCounts, NewTransaction, Transaction, TransactionUpdate,
};

const TRANSACTION_COLUMNS: &str = "id, user_id, account_id, merchant, amount, category, \
     classification, reflection, description, date, timestamp, type, created_at, updated_at";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let category_str: String = row.get(5)?;
    let classification_str: String = row.get(6)?;
    let date_str: String = row.get(9)?;
    let type_str: String = row.get(11)?;
    let created_at_str: String = row.get(12)?;
    let updated_at_str: String = row.get(13)?;

    let category = category_str.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
    })?;
    let date = chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_id: row.get(2)?,
        merchant: row.get(3)?,
        amount: row.get(4)?,
        category,
        classification: classification_str.parse().unwrap_or_default(),
        reflection: row.get(7)?,
        description: row.get(8)?,
        date,
        timestamp: row.get(10)?,
        transaction_type: type_str.parse().unwrap_or_default(),
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

/// Move an account balance by `delta`
fn post_to_balance(conn: &Connection, user_id: &str, account_id: i64, delta: f64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE accounts SET balance = balance + ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ? AND user_id = ?",
        params![delta, account_id, user_id],
    )?;
    if updated == 0 {
        return Err(Error::NotFound(format!("account {}", account_id)));
    }
    Ok(())
}

fn fetch_transaction(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Transaction>> {
    let tx = conn
        .query_row(
            &format!(
                "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
                TRANSACTION_COLUMNS
            ),
            params![id, user_id],
            row_to_transaction,
        )
        .optional()?;
    Ok(tx)
}

impl Database {
    /// Insert a transaction and post it to its account balance
    pub fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<i64> {
        tx.validate()?;
        let conn = self.conn()?;
        let timestamp = tx
            .timestamp
            .unwrap_or_else(|| Utc::now().timestamp_millis());

        let id = in_transaction(&conn, |conn| {
            // Posting first also verifies the account belongs to this user
            post_to_balance(
                conn,
                user_id,
                tx.account_id,
                tx.transaction_type.signed(tx.amount),
            )?;

            conn.execute(
                r#"
                INSERT INTO transactions (user_id, account_id, merchant, amount, category,
                    classification, reflection, description, date, timestamp, type)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    user_id,
                    tx.account_id,
                    tx.merchant.trim(),
                    tx.amount,
                    tx.category.as_str(),
                    tx.classification.as_str(),
                    tx.reflection,
                    tx.description,
                    tx.date.to_string(),
                    timestamp,
                    tx.transaction_type.as_str(),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        debug!(id, user_id, classification = %tx.classification, "Transaction posted");
        Ok(id)
    }

    /// Get one of a user's transactions by ID
    pub fn get_transaction(&self, user_id: &str, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        fetch_transaction(&conn, user_id, id)
    }

    /// List transactions, most recent first
    pub fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = filter.build(user_id);

        let sql = format!(
            "SELECT {} FROM transactions {} ORDER BY date DESC, timestamp DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS, built.where_clause
        );

        let mut params = built.params;
        params.push(Box::new(filter.limit));
        params.push(Box::new(filter.offset));

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params_from_iter(params.iter().map(|p| p.as_ref())), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count transactions matching a filter (ignores pagination)
    pub fn count_transactions(&self, user_id: &str, filter: &TransactionFilter) -> Result<i64> {
        let conn = self.conn()?;
        let built = filter.build(user_id);
        let sql = format!("SELECT COUNT(*) FROM transactions {}", built.where_clause);

        let count = conn.query_row(
            &sql,
            params_from_iter(built.params.iter().map(|p| p.as_ref())),
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Apply an explicit user edit, re-posting the balance effect
    pub fn update_transaction(
        &self,
        user_id: &str,
        id: i64,
        update: &TransactionUpdate,
    ) -> Result<Transaction> {
        update.validate()?;
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            let existing = fetch_transaction(conn, user_id, id)?
                .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

            let amount = update.amount.unwrap_or(existing.amount);
            let transaction_type = update.transaction_type.unwrap_or(existing.transaction_type);
            let delta = transaction_type.signed(amount)
                - existing.transaction_type.signed(existing.amount);
            if delta != 0.0 {
                post_to_balance(conn, user_id, existing.account_id, delta)?;
            }

            conn.execute(
                r#"
                UPDATE transactions SET
                    merchant = ?, amount = ?, category = ?, classification = ?,
                    reflection = ?, description = ?, date = ?, type = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ? AND user_id = ?
                "#,
                params![
                    update
                        .merchant
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(&existing.merchant),
                    amount,
                    update.category.unwrap_or(existing.category).as_str(),
                    update
                        .classification
                        .unwrap_or(existing.classification)
                        .as_str(),
                    update.reflection.as_ref().unwrap_or(&existing.reflection),
                    update.description.as_ref().unwrap_or(&existing.description),
                    update.date.unwrap_or(existing.date).to_string(),
                    transaction_type.as_str(),
                    id,
                    user_id,
                ],
            )?;

            fetch_transaction(conn, user_id, id)?
                .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
        })
    }

    /// Delete a transaction and reverse its balance effect
    pub fn delete_transaction(&self, user_id: &str, id: i64) -> Result<()> {
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            let existing = fetch_transaction(conn, user_id, id)?
                .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))?;

            post_to_balance(
                conn,
                user_id,
                existing.account_id,
                -existing.transaction_type.signed(existing.amount),
            )?;
            conn.execute(
                "DELETE FROM transactions WHERE id = ? AND user_id = ?",
                params![id, user_id],
            )?;
            Ok(())
        })
    }

    /// Classifications of the most recent transactions, most recent first
    pub fn recent_classifications(&self, user_id: &str, limit: usize) -> Result<Vec<Classification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT classification FROM transactions
            WHERE user_id = ?
            ORDER BY date DESC, timestamp DESC, id DESC
            LIMIT ?
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let values = stmt
            .query_map(params![user_id, limit], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value.parse() {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Skipping transaction: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Classification tallies over a user's whole history
    pub fn classification_counts(&self, user_id: &str) -> Result<ClassificationCounts> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT classification, COUNT(*) FROM transactions WHERE user_id = ? GROUP BY classification",
        )?;

        let mut counts = ClassificationCounts::default();
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (classification, count) = row?;
            let count = u32::try_from(count).unwrap_or(u32::MAX);
            match classification.parse::<Classification>() {
                Ok(Classification::Responsible) => counts.responsible = count,
                Ok(Classification::Irresponsible) => counts.irresponsible = count,
                Ok(Classification::Neutral) => counts.neutral = count,
                Err(e) => warn!("Skipping {} transactions: {}", count, e),
            }
        }

        Ok(counts)
    }
}
