//! Savings goal operations

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::{in_transaction, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Goal, GoalUpdate, NewGoal};

const GOAL_COLUMNS: &str = "id, user_id, title, description, target_amount, current_amount, \
     emoji, category, target_date, is_completed, created_at, updated_at";

fn row_to_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let target_date_str: Option<String> = row.get(8)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        target_amount: row.get(4)?,
        current_amount: row.get(5)?,
        emoji: row.get(6)?,
        category: row.get(7)?,
        target_date: target_date_str
            .and_then(|s| chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        is_completed: row.get(9)?,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

fn fetch_goal(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Goal>> {
    let goal = conn
        .query_row(
            &format!(
                "SELECT {} FROM goals WHERE id = ? AND user_id = ?",
                GOAL_COLUMNS
            ),
            params![id, user_id],
            row_to_goal,
        )
        .optional()?;
    Ok(goal)
}

impl Database {
    /// Create a savings goal
    pub fn create_goal(&self, user_id: &str, goal: &NewGoal) -> Result<i64> {
        goal.validate()?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO goals (user_id, title, description, target_amount, current_amount,
                emoji, category, target_date, is_completed)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                goal.title.trim(),
                goal.description,
                goal.target_amount,
                goal.current_amount,
                goal.emoji,
                goal.category,
                goal.target_date.map(|d| d.to_string()),
                goal.current_amount >= goal.target_amount,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List a user's goals, open goals first
    pub fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM goals WHERE user_id = ? ORDER BY is_completed, created_at DESC, id DESC",
            GOAL_COLUMNS
        ))?;

        let goals = stmt
            .query_map(params![user_id], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(goals)
    }

    /// Get one of a user's goals by ID
    pub fn get_goal(&self, user_id: &str, id: i64) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        fetch_goal(&conn, user_id, id)
    }

    /// Apply a partial update to a goal
    pub fn update_goal(&self, user_id: &str, id: i64, update: &GoalUpdate) -> Result<Goal> {
        update.validate()?;
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            let existing = fetch_goal(conn, user_id, id)?
                .ok_or_else(|| Error::NotFound(format!("goal {}", id)))?;

            let target_amount = update.target_amount.unwrap_or(existing.target_amount);
            let current_amount = update.current_amount.unwrap_or(existing.current_amount);
            let is_completed = update
                .is_completed
                .unwrap_or(current_amount >= target_amount);

            conn.execute(
                r#"
                UPDATE goals SET
                    title = ?, description = ?, target_amount = ?, current_amount = ?,
                    emoji = ?, category = ?, target_date = ?, is_completed = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ? AND user_id = ?
                "#,
                params![
                    update
                        .title
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(&existing.title),
                    update.description.as_ref().unwrap_or(&existing.description),
                    target_amount,
                    current_amount,
                    update.emoji.as_ref().unwrap_or(&existing.emoji),
                    update.category.as_ref().unwrap_or(&existing.category),
                    update
                        .target_date
                        .unwrap_or(existing.target_date)
                        .map(|d| d.to_string()),
                    is_completed,
                    id,
                    user_id,
                ],
            )?;

            fetch_goal(conn, user_id, id)?.ok_or_else(|| Error::NotFound(format!("goal {}", id)))
        })
    }

    /// Add money to a goal, completing it once the target is reached
    pub fn contribute_to_goal(&self, user_id: &str, id: i64, amount: f64) -> Result<Goal> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation(
                "contribution must be a positive number".into(),
            ));
        }

        let conn = self.conn()?;
        let goal = in_transaction(&conn, |conn| {
            let updated = conn.execute(
                r#"
                UPDATE goals SET
                    current_amount = current_amount + ?,
                    is_completed = CASE
                        WHEN current_amount + ? >= target_amount THEN 1
                        ELSE is_completed
                    END,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ? AND user_id = ?
                "#,
                params![amount, amount, id, user_id],
            )?;
            if updated == 0 {
                return Err(Error::NotFound(format!("goal {}", id)));
            }

            fetch_goal(conn, user_id, id)?.ok_or_else(|| Error::NotFound(format!("goal {}", id)))
        })?;

        if goal.is_completed {
            info!(goal_id = id, title = %goal.title, "Goal reached");
        }
        Ok(goal)
    }

    /// Delete a goal
    pub fn delete_goal(&self, user_id: &str, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM goals WHERE id = ? AND user_id = ?",
            params![id, user_id],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("goal {}", id)));
        }
        Ok(())
    }
}
