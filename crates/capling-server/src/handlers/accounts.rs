//! Account management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Deserialize;

use crate::{get_user_email, read_json, AppError, AppState, SuccessResponse};
use capling_core::models::{Account, AccountType, NewAccount};

/// Request body for updating an account
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub account_name: String,
    #[serde(default)]
    pub account_type: AccountType,
}

/// GET /api/accounts - List the caller's accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Account>>, AppError> {
    let user_email = get_user_email(request.headers());

    let accounts = state.db.list_accounts(&user_email)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("account"),
        None,
        Some(&format!("count={}", accounts.len())),
    )?;

    Ok(Json(accounts))
}

/// POST /api/accounts - Create a new account
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Account>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewAccount = read_json(request).await?;

    let account_id = state.db.create_account(&user_email, &req)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("account"),
        Some(account_id),
        Some(&format!(
            "name={}, type={}",
            req.account_name, req.account_type
        )),
    )?;

    let account = state
        .db
        .get_account(&user_email, account_id)?
        .ok_or_else(|| AppError::internal("Account not found after creation"))?;

    Ok(Json(account))
}

/// GET /api/accounts/:id - Get a single account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Account>, AppError> {
    let user_email = get_user_email(request.headers());

    let account = state
        .db
        .get_account(&user_email, id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "get", Some("account"), Some(id), None)?;

    Ok(Json(account))
}

/// PUT /api/accounts/:id - Rename an account or change its type
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Account>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: UpdateAccountRequest = read_json(request).await?;

    state
        .db
        .update_account(&user_email, id, &req.account_name, req.account_type)?;

    state.db.log_audit(
        &user_email,
        "update",
        Some("account"),
        Some(id),
        Some(&format!(
            "name={}, type={}",
            req.account_name, req.account_type
        )),
    )?;

    let account = state
        .db
        .get_account(&user_email, id)?
        .ok_or_else(|| AppError::not_found(&format!("Account {} not found", id)))?;

    Ok(Json(account))
}

/// DELETE /api/accounts/:id - Delete an account and its transactions
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    state.db.delete_account(&user_email, id)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("account"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
