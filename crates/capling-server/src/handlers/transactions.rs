//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{get_user_email, read_json, AppError, AppState, SuccessResponse, MAX_PAGE_LIMIT};
use capling_core::models::{
    Category, Classification, NewTransaction, Transaction, TransactionType, TransactionUpdate,
};
use capling_core::TransactionFilter;

/// Query parameters for listing transactions
#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub account_id: Option<i64>,
    pub classification: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Merchant search (case-insensitive substring)
    pub search: Option<String>,
    /// Start date (YYYY-MM-DD), requires `to`
    pub from: Option<String>,
    /// End date (YYYY-MM-DD), requires `from`
    pub to: Option<String>,
}

fn default_limit() -> i64 {
    50
}

#[derive(Serialize)]
pub struct TransactionResponse {
    pub transactions: Vec<Transaction>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

fn parse_param<T: std::str::FromStr<Err = String>>(
    value: Option<&str>,
) -> Result<Option<T>, AppError> {
    value
        .map(|v| v.parse::<T>().map_err(|e| AppError::bad_request(&e)))
        .transpose()
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::bad_request(&format!("Invalid date (expected YYYY-MM-DD): {}", value)))
}

/// GET /api/transactions - List transactions, most recent first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
    request: Request,
) -> Result<Json<TransactionResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    // Input validation: clamp pagination parameters
    let limit = params.limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = params.offset.max(0);

    let date_range = match (params.from.as_deref(), params.to.as_deref()) {
        (Some(from), Some(to)) => Some((parse_date(from)?, parse_date(to)?)),
        (None, None) => None,
        _ => return Err(AppError::bad_request("Both 'from' and 'to' are required")),
    };

    let filter = TransactionFilter::new()
        .account_id(params.account_id)
        .classification(parse_param::<Classification>(params.classification.as_deref())?)
        .category(parse_param::<Category>(params.category.as_deref())?)
        .transaction_type(parse_param::<TransactionType>(
            params.transaction_type.as_deref(),
        )?)
        .date_range(date_range)
        .search(params.search.clone())
        .page(limit, offset);

    let transactions = state.db.list_transactions(&user_email, &filter)?;
    let total = state.db.count_transactions(&user_email, &filter)?;

    state.db.log_audit(
        &user_email,
        "list",
        Some("transaction"),
        None,
        Some(&format!(
            "limit={}, offset={}, account_id={:?}, classification={:?}, search={:?}, returned={}",
            limit,
            offset,
            params.account_id,
            params.classification,
            params.search,
            transactions.len()
        )),
    )?;

    Ok(Json(TransactionResponse {
        transactions,
        total,
        limit,
        offset,
    }))
}

/// POST /api/transactions - Record a transaction and post it to its account
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: NewTransaction = read_json(request).await?;

    let id = state.db.insert_transaction(&user_email, &req)?;

    state.db.log_audit(
        &user_email,
        "create",
        Some("transaction"),
        Some(id),
        Some(&format!(
            "account_id={}, amount={}, type={}, classification={}",
            req.account_id, req.amount, req.transaction_type, req.classification
        )),
    )?;

    let tx = state
        .db
        .get_transaction(&user_email, id)?
        .ok_or_else(|| AppError::internal("Transaction not found after creation"))?;

    Ok(Json(tx))
}

/// GET /api/transactions/:id - Get a single transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let user_email = get_user_email(request.headers());

    let tx = state
        .db
        .get_transaction(&user_email, id)?
        .ok_or_else(|| AppError::not_found(&format!("Transaction {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "get", Some("transaction"), Some(id), None)?;

    Ok(Json(tx))
}

/// PATCH /api/transactions/:id - Edit a transaction (including its classification)
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Transaction>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: TransactionUpdate = read_json(request).await?;

    let tx = state.db.update_transaction(&user_email, id, &req)?;

    state.db.log_audit(
        &user_email,
        "update",
        Some("transaction"),
        Some(id),
        Some(&format!(
            "amount={:?}, classification={:?}, type={:?}",
            req.amount, req.classification, req.transaction_type
        )),
    )?;

    Ok(Json(tx))
}

/// DELETE /api/transactions/:id - Delete a transaction and reverse its posting
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    state.db.delete_transaction(&user_email, id)?;

    state
        .db
        .log_audit(&user_email, "delete", Some("transaction"), Some(id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
