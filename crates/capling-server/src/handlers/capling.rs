//! Mascot handlers: derived mood, level and view

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    Json,
};
use serde::Serialize;

use crate::{get_user_email, AppError, AppState};
use capling_core::{CaplingStatus, LevelInfo, Mood};

#[derive(Serialize)]
pub struct MoodResponse {
    pub mood: Mood,
}

/// GET /api/capling - Full mascot status for the caller
pub async fn get_capling(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CaplingStatus>, AppError> {
    let user_email = get_user_email(request.headers());

    let profile = state.db.get_or_create_profile(&user_email)?;
    let status = state
        .capling
        .status(&state.db, &user_email, &profile.capling_name)
        .await?;

    state.db.log_audit(
        &user_email,
        "get",
        Some("capling"),
        None,
        Some(&format!(
            "mood={}, level={}",
            status.mood, status.level.level
        )),
    )?;

    Ok(Json(status))
}

/// GET /api/capling/level - Level and XP progress
pub async fn get_capling_level(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<LevelInfo>, AppError> {
    let user_email = get_user_email(request.headers());

    let level = state.capling.level(&state.db, &user_email).await?;

    state
        .db
        .log_audit(&user_email, "get", Some("capling_level"), None, None)?;

    Ok(Json(level))
}

/// GET /api/capling/mood - Current mood
pub async fn get_capling_mood(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<MoodResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let mood = state.capling.mood(&state.db, &user_email).await?;

    state
        .db
        .log_audit(&user_email, "get", Some("capling_mood"), None, None)?;

    Ok(Json(MoodResponse { mood }))
}
