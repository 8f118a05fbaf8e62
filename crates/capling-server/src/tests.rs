//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use capling_core::db::Database;
use http_body_util::BodyExt;
use tower::ServiceExt;

const USER: &str = "alex@example.com";

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    };
    create_router(db, None, config)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(CF_ACCESS_USER_HEADER, USER)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CF_ACCESS_USER_HEADER, USER)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(CF_ACCESS_USER_HEADER, USER)
        .body(Body::empty())
        .unwrap()
}

async fn create_account(app: &Router, balance: f64) -> i64 {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/accounts",
            serde_json::json!({ "account_name": "Everyday", "balance": balance }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await["id"].as_i64().unwrap()
}

async fn create_transaction(app: &Router, account_id: i64, classification: &str, ts: i64) -> i64 {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/transactions",
            serde_json::json!({
                "account_id": account_id,
                "merchant": "Corner Shop",
                "amount": 25.0,
                "category": "shopping",
                "classification": classification,
                "date": "2024-04-01",
                "timestamp": ts,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    get_body_json(response).await["id"].as_i64().unwrap()
}

// ========== Auth Tests ==========

#[tokio::test]
async fn test_auth_required_by_default() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db, None, ServerConfig::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cf_access_header_authenticates() {
    let db = Database::in_memory().unwrap();
    let app = create_router(db, None, ServerConfig::default());

    let response = app.oneshot(get("/api/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["user"], USER);
    assert_eq!(json["auth_method"], "cloudflare_header");
}

#[tokio::test]
async fn test_api_key_auth() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router(db, None, config);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["auth_method"], "api_key");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc123".to_string(), "longer-key".to_string()];
    assert!(validate_api_key("abc123", &keys));
    assert!(validate_api_key("longer-key", &keys));
    assert!(!validate_api_key("abc124", &keys));
    assert!(!validate_api_key("abc", &keys));
    assert!(!validate_api_key("abc123", &[]));
}

#[test]
fn test_parse_trusted_networks() {
    let nets = parse_trusted_networks("192.168.1.0/24, 10.0.0.5,,not-an-ip");
    assert_eq!(nets.len(), 2);
    assert!(is_ip_trusted(&"192.168.1.77".parse().unwrap(), &nets));
    assert!(is_ip_trusted(&"10.0.0.5".parse().unwrap(), &nets));
    assert!(!is_ip_trusted(&"10.0.0.6".parse().unwrap(), &nets));
}

#[test]
fn test_get_user_email() {
    let mut headers = axum::http::HeaderMap::new();
    assert_eq!(get_user_email(&headers), "local-dev");

    headers.insert("authorization", "Bearer k".parse().unwrap());
    assert_eq!(get_user_email(&headers), "api-key");

    headers.insert(CF_ACCESS_USER_HEADER, USER.parse().unwrap());
    assert_eq!(get_user_email(&headers), USER);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/me")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("content-security-policy").is_some());
}

// ========== Account Tests ==========

#[tokio::test]
async fn test_account_crud() {
    let app = setup_test_app();
    let id = create_account(&app, 200.0).await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/accounts/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["account_name"], "Everyday");
    assert_eq!(json["account_type"], "checking");
    assert_eq!(json["balance"], 200.0);

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/accounts/{}", id),
            serde_json::json!({ "account_name": "Savings Pot", "account_type": "savings" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["account_type"], "savings");

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/accounts/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/accounts/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_accounts_isolated_between_users() {
    let app = setup_test_app();
    let id = create_account(&app, 0.0).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/accounts/{}", id))
                .header(CF_ACCESS_USER_HEADER, "someone-else@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/accounts")
                .header(CF_ACCESS_USER_HEADER, USER)
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Transaction Tests ==========

#[tokio::test]
async fn test_transaction_posting_and_balance() {
    let app = setup_test_app();
    let account_id = create_account(&app, 100.0).await;
    let tx_id = create_transaction(&app, account_id, "neutral", 1).await;

    let balance = move |app: Router| async move {
        let response = app
            .oneshot(get(&format!("/api/accounts/{}", account_id)))
            .await
            .unwrap();
        get_body_json(response).await["balance"].as_f64().unwrap()
    };
    assert_eq!(balance(app.clone()).await, 75.0);

    let response = app
        .clone()
        .oneshot(send_json(
            "PATCH",
            &format!("/api/transactions/{}", tx_id),
            serde_json::json!({ "amount": 10.0, "classification": "responsible" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["classification"], "responsible");
    assert_eq!(json["type"], "debit");
    assert_eq!(balance(app.clone()).await, 90.0);

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/transactions/{}", tx_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(balance(app.clone()).await, 100.0);
}

#[tokio::test]
async fn test_negative_amount_rejected() {
    let app = setup_test_app();
    let account_id = create_account(&app, 0.0).await;

    let response = app
        .oneshot(send_json(
            "POST",
            "/api/transactions",
            serde_json::json!({
                "account_id": account_id,
                "merchant": "Refund?",
                "amount": -5.0,
                "category": "shopping",
                "date": "2024-04-01",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_transactions_with_filters() {
    let app = setup_test_app();
    let account_id = create_account(&app, 0.0).await;
    create_transaction(&app, account_id, "responsible", 1).await;
    create_transaction(&app, account_id, "irresponsible", 2).await;
    create_transaction(&app, account_id, "irresponsible", 3).await;

    let response = app
        .clone()
        .oneshot(get("/api/transactions?classification=irresponsible&limit=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["limit"], 1);
    assert_eq!(json["transactions"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/api/transactions?classification=splurge"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/transactions?from=2024-04-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_transaction_is_not_found() {
    let app = setup_test_app();

    let response = app
        .oneshot(send_json(
            "PATCH",
            "/api/transactions/999",
            serde_json::json!({ "classification": "neutral" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Goal Tests ==========

#[tokio::test]
async fn test_goal_contribution_completes_goal() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/goals",
            serde_json::json!({ "title": "Concert tickets", "target_amount": 120.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let goal = get_body_json(response).await;
    assert_eq!(goal["emoji"], "🎯");
    let id = goal["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/api/goals/{}/contribute", id),
            serde_json::json!({ "amount": 120.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let goal = get_body_json(response).await;
    assert_eq!(goal["is_completed"], true);
    assert_eq!(goal["current_amount"], 120.0);

    let response = app
        .oneshot(send_json(
            "POST",
            &format!("/api/goals/{}/contribute", id),
            serde_json::json!({ "amount": -1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Profile / Name Editor Tests ==========

#[tokio::test]
async fn test_profile_get_or_create() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/profile")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["id"], USER);
    assert_eq!(json["capling_name"], "Capling");
    assert_eq!(json["weekly_budget"], 0.0);
}

#[tokio::test]
async fn test_rename_capling() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/profile/capling-name",
            serde_json::json!({ "name": "  Biscuit  " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["capling_name"], "Biscuit");

    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/profile/capling-name",
            serde_json::json!({ "name": "x".repeat(31) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/api/capling")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["name"], "Biscuit");
    assert_eq!(json["view"]["name"], "Biscuit");
}

// ========== Capling Tests ==========

#[tokio::test]
async fn test_capling_fresh_user() {
    let app = setup_test_app();

    let response = app.clone().oneshot(get("/api/capling")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["mood"], "neutral");
    assert_eq!(json["level"]["level"], 1);
    assert_eq!(json["level"]["xp"], 0);
    assert_eq!(json["level"]["isMaxLevel"], false);
    assert_eq!(json["view"]["badge"]["label"], "Level 1");
    assert_eq!(json["view"]["aura"]["tier"], "minimal");

    let response = app.oneshot(get("/api/capling/level")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["progressPercentage"], 0.0);
    assert_eq!(json["xpForNextLevel"], 50);
}

#[tokio::test]
async fn test_capling_mood_follows_spending() {
    let app = setup_test_app();
    let account_id = create_account(&app, 500.0).await;
    for ts in 0..5 {
        create_transaction(&app, account_id, "irresponsible", ts).await;
    }

    let response = app.clone().oneshot(get("/api/capling/mood")).await.unwrap();
    assert_eq!(get_body_json(response).await["mood"], "depressed");

    for ts in 5..10 {
        create_transaction(&app, account_id, "responsible", ts).await;
    }

    let response = app.oneshot(get("/api/capling")).await.unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["mood"], "happy");
    assert_eq!(json["level"]["xp"], 50);
    assert_eq!(json["level"]["level"], 2);
    assert_eq!(json["counts"]["irresponsible"], 5);
}

// ========== Audit Tests ==========

#[tokio::test]
async fn test_audit_log_records_reads_and_writes() {
    let app = setup_test_app();
    create_account(&app, 0.0).await;
    app.clone().oneshot(get("/api/accounts")).await.unwrap();

    let response = app.oneshot(get("/api/audit")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let actions: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["list", "create"]);
}
