//! Account operations

use rusqlite::{params, OptionalExtension, Row};

use super::{in_transaction, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Account, AccountType, NewAccount};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, account_name, account_type, balance, created_at, updated_at";

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    let account_type_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        account_name: row.get(2)?,
        account_type: account_type_str.parse().unwrap_or_default(),
        balance: row.get(4)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    /// Create an account for a user
    pub fn create_account(&self, user_id: &str, account: &NewAccount) -> Result<i64> {
        account.validate()?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO accounts (user_id, account_name, account_type, balance) VALUES (?, ?, ?, ?)",
            params![
                user_id,
                account.account_name.trim(),
                account.account_type.as_str(),
                account.balance
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List a user's accounts
    pub fn list_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY account_name, id",
            ACCOUNT_COLUMNS
        ))?;

        let accounts = stmt
            .query_map(params![user_id], row_to_account)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(accounts)
    }

    /// Get one of a user's accounts by ID
    pub fn get_account(&self, user_id: &str, id: i64) -> Result<Option<Account>> {
        let conn = self.conn()?;
        let account = conn
            .query_row(
                &format!(
                    "SELECT {} FROM accounts WHERE id = ? AND user_id = ?",
                    ACCOUNT_COLUMNS
                ),
                params![id, user_id],
                row_to_account,
            )
            .optional()?;

        Ok(account)
    }

    /// Rename an account or change its type
    pub fn update_account(
        &self,
        user_id: &str,
        id: i64,
        account_name: &str,
        account_type: AccountType,
    ) -> Result<()> {
        if account_name.trim().is_empty() {
            return Err(Error::Validation("account name cannot be empty".into()));
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE accounts SET account_name = ?, account_type = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND user_id = ?",
            params![account_name.trim(), account_type.as_str(), id, user_id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("account {}", id)));
        }
        Ok(())
    }

    /// Delete an account and all its transactions
    pub fn delete_account(&self, user_id: &str, id: i64) -> Result<()> {
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            conn.execute(
                "DELETE FROM transactions WHERE account_id = ? AND user_id = ?",
                params![id, user_id],
            )?;
            let deleted = conn.execute(
                "DELETE FROM accounts WHERE id = ? AND user_id = ?",
                params![id, user_id],
            )?;
            if deleted == 0 {
                return Err(Error::NotFound(format!("account {}", id)));
            }
            Ok(())
        })
    }
}
