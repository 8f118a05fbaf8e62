//! Test utilities for capling-core
//!
//! Provides a mock PostgREST server that answers the hosted-store reads made
//! by [`crate::remote::SupabaseClient`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::oneshot;

/// API key the mock server accepts
pub const MOCK_API_KEY: &str = "test-key";

type History = Arc<Mutex<HashMap<String, Vec<Option<String>>>>>;

#[derive(Clone, Default)]
struct MockState {
    history: History,
    /// Server-side row cap per response, like PostgREST's `max-rows`
    max_rows: Arc<Mutex<Option<usize>>>,
    requests: Arc<Mutex<usize>>,
}

/// Mock Supabase (PostgREST) server for testing and development
pub struct MockSupabaseServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSupabaseServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new()
            .route("/rest/v1/transactions", get(handle_transactions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Replace a user's classifications, most recent first
    pub fn set_history(&self, user_id: &str, classifications: &[Option<&str>]) {
        self.state.history.lock().unwrap().insert(
            user_id.to_string(),
            classifications
                .iter()
                .map(|c| c.map(str::to_string))
                .collect(),
        );
    }

    /// Cap every response at `max_rows` rows, whatever `limit` asks for
    pub fn set_max_rows(&self, max_rows: usize) {
        *self.state.max_rows.lock().unwrap() = Some(max_rows);
    }

    /// Number of requests served so far
    pub fn request_count(&self) -> usize {
        *self.state.requests.lock().unwrap()
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSupabaseServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Serialize)]
struct ClassificationRow {
    classification: Option<String>,
}

/// PostgREST transactions endpoint. Supports `user_id=eq.<id>`, `limit`
/// and `offset`.
async fn handle_transactions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let authorized = headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(MOCK_API_KEY)
        && headers.get("authorization").and_then(|v| v.to_str().ok())
            == Some(&*format!("Bearer {}", MOCK_API_KEY));
    *state.requests.lock().unwrap() += 1;
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "Invalid API key" })),
        )
            .into_response();
    }

    let user_id = params
        .get("user_id")
        .and_then(|v| v.strip_prefix("eq."))
        .unwrap_or_default();
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let limit = match *state.max_rows.lock().unwrap() {
        Some(max_rows) => limit.min(max_rows),
        None => limit,
    };
    let offset = params
        .get("offset")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    let rows: Vec<ClassificationRow> = state
        .history
        .lock()
        .unwrap()
        .get(user_id)
        .map(|entries| {
            entries
                .iter()
                .skip(offset)
                .take(limit)
                .map(|c| ClassificationRow {
                    classification: c.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Json(rows).into_response()
}
