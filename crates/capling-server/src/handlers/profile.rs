//! Profile and mascot name handlers

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{get_user_email, read_json, AppError, AppState};
use capling_core::models::{ProfileUpdate, UserProfile};

/// Request body for renaming the mascot
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct RenameResponse {
    pub capling_name: String,
}

/// GET /api/profile - Get the caller's profile, creating it on first access
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UserProfile>, AppError> {
    let user_email = get_user_email(request.headers());

    let profile = state.db.get_or_create_profile(&user_email)?;

    state
        .db
        .log_audit(&user_email, "get", Some("profile"), None, None)?;

    Ok(Json(profile))
}

/// PATCH /api/profile - Update name, avatar or weekly budget
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<UserProfile>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: ProfileUpdate = read_json(request).await?;

    let profile = state.db.update_profile(&user_email, &req)?;

    state.db.log_audit(
        &user_email,
        "update",
        Some("profile"),
        None,
        Some(&format!("weekly_budget={:?}", req.weekly_budget)),
    )?;

    Ok(Json(profile))
}

/// PUT /api/profile/capling-name - Rename the mascot
pub async fn rename_capling(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<RenameResponse>, AppError> {
    let user_email = get_user_email(request.headers());
    let req: RenameRequest = read_json(request).await?;

    let capling_name = state.db.update_capling_name(&user_email, &req.name)?;

    state.db.log_audit(
        &user_email,
        "rename",
        Some("capling"),
        None,
        Some(&capling_name),
    )?;

    Ok(Json(RenameResponse { capling_name }))
}
