//! User profile operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ProfileUpdate, UserProfile};
use crate::profile::validate_capling_name;

const PROFILE_COLUMNS: &str =
    "id, full_name, avatar_url, weekly_budget, capling_name, created_at, updated_at";

fn row_to_profile(row: &Row<'_>) -> rusqlite::Result<UserProfile> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(UserProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        avatar_url: row.get(2)?,
        weekly_budget: row.get(3)?,
        capling_name: row.get(4)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

impl Database {
    /// Get a user's profile if one exists
    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                &format!("SELECT {} FROM user_profiles WHERE id = ?", PROFILE_COLUMNS),
                params![user_id],
                row_to_profile,
            )
            .optional()?;

        Ok(profile)
    }

    /// Get a user's profile, creating a default one on first access
    pub fn get_or_create_profile(&self, user_id: &str) -> Result<UserProfile> {
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT OR IGNORE INTO user_profiles (id) VALUES (?)",
                params![user_id],
            )?;
        }

        self.get_profile(user_id)?
            .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))
    }

    /// Apply a partial profile update
    pub fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        update.validate()?;
        let existing = self.get_or_create_profile(user_id)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE user_profiles SET
                full_name = ?, avatar_url = ?, weekly_budget = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                update.full_name.as_ref().unwrap_or(&existing.full_name),
                update.avatar_url.as_ref().unwrap_or(&existing.avatar_url),
                update.weekly_budget.unwrap_or(existing.weekly_budget),
                user_id,
            ],
        )?;
        drop(conn);

        self.get_or_create_profile(user_id)
    }

    /// Rename the user's mascot. Returns the stored (trimmed) name.
    pub fn update_capling_name(&self, user_id: &str, name: &str) -> Result<String> {
        let name = validate_capling_name(name)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO user_profiles (id, capling_name) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET
                capling_name = excluded.capling_name,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![user_id, name],
        )?;

        Ok(name)
    }
}
