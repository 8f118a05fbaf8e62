//! Authentication-related handlers

use axum::extract::Request;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{get_client_ip, get_user_email, AppState};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: String,
}

/// Get the currently authenticated user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    connect_info: Option<axum::extract::ConnectInfo<std::net::SocketAddr>>,
    request: Request,
) -> Json<MeResponse> {
    let user = get_user_email(request.headers());

    let client_ip = get_client_ip(
        &request,
        connect_info.as_ref(),
        &state.config.trusted_proxies,
    );

    // Passed auth with no identifying headers: must be a trusted network
    let is_trusted_network = user == "local-dev"
        && state.config.require_auth
        && client_ip
            .map(|ip| {
                state
                    .config
                    .trusted_networks
                    .iter()
                    .any(|net| net.contains(&ip))
            })
            .unwrap_or(false);

    let auth_method = if is_trusted_network {
        "trusted_network"
    } else if user == "api-key" {
        "api_key"
    } else if user == "local-dev" {
        "none"
    } else {
        "cloudflare_header"
    };

    Json(MeResponse {
        user,
        auth_method: auth_method.to_string(),
    })
}
