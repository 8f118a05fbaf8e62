//! Savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, read_json, AppError, AppState, SuccessResponse};
use capling_core::models::{Goal, GoalUpdate, NewGoal};

/// Request body for contributing to a goal
#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    pub amount: f64,
}

/// GET /api/goals - List the caller's goals
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Goal>>, AppError> {
    let user_email = get_user_email(request.headers());

    let goals = state.db.list_goals(&user_email)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("goal"),
        None,
        Some(&format!("count={}", goals.len())),
    )?;

    Ok(Json(goals))
}

/// POST /api/goals - Create a goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Goal>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewGoal = read_json(request).await?;

    let id = state.db.create_goal(&user_email, &req)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("goal"),
        Some(id),
        Some(&format!("title={}, target={}", req.title, req.target_amount)),
    )?;

    let goal = state
        .db
        .get_goal(&user_email, id)?
        .ok_or_else(|| AppError::internal("Goal not found after creation"))?;

    Ok(Json(goal))
}

/// GET /api/goals/:id - Get a single goal
pub async fn get_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Goal>, AppError> {
    let user_email = get_user_email(request.headers());

    let goal = state
        .db
        .get_goal(&user_email, id)?
        .ok_or_else(|| AppError::not_found(&format!("Goal {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "get", Some("goal"), Some(id), None)?;

    Ok(Json(goal))
}

/// PATCH /api/goals/:id - Update a goal
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Goal>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: GoalUpdate = read_json(request).await?;

    let goal = state.db.update_goal(&user_email, id, &req)?;

    state
        .db
        .log_audit(&user_email, "update", Some("goal"), Some(id), None)?;

    Ok(Json(goal))
}

/// POST /api/goals/:id/contribute - Add money to a goal
pub async fn contribute_to_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Goal>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: ContributeRequest = read_json(request).await?;

    let goal = state.db.contribute_to_goal(&user_email, id, req.amount)?;

    state.db.log_audit(
        &user_email,
        "contribute",
        Some("goal"),
        Some(id),
        Some(&format!(
            "amount={}, completed={}",
            req.amount, goal.is_completed
        )),
    )?;

    Ok(Json(goal))
}

/// DELETE /api/goals/:id - Delete a goal
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    state.db.delete_goal(&user_email, id)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("goal"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
