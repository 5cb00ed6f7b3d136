//! Integration tests for registration, login, approval and the admin console.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use devcore::config::Config;
use devcore::services::TokenSigner;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

const TEST_SECRET: &str = "integration-test-secret";

async fn spawn_app() -> Router {
    let db_path =
        std::env::temp_dir().join(format!("devcore-api-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.security.jwt_secret = TEST_SECRET.to_string();

    let state = devcore::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    devcore::api::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/register",
            &json!({
                "username": username,
                "password": password,
                "aiName": "Ava",
                "devName": "Bob",
            }),
            None,
        ),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/login",
            &json!({ "username": username, "password": password }),
            None,
        ),
    )
    .await
}

async fn admin_token(app: &Router) -> String {
    let (status, _) = register(app, "dap", "123").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(app, "dap", "123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isAdmin"], true);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_register_then_login_uses_default_names() {
    let app = spawn_app().await;

    let (status, body) = register(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registered. Waiting for approval.");

    let (status, body) = login(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["isAdmin"], false);
    assert_eq!(body["user"]["aiName"], "DevCORE");
    assert_eq!(body["user"]["devName"], "XdpzQ");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let app = spawn_app().await;

    let (status, _) = register(&app, "alice", "pw1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = register(&app, "alice", "other").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("alice"));
    assert_eq!(body["message"], body["error"]);
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let app = spawn_app().await;
    register(&app, "alice", "pw1").await;

    let (status, body) = login(&app, "alice", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, _) = login(&app, "nobody", "pw1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_bootstrap_pair_registers_admin() {
    let app = spawn_app().await;

    register(&app, "dap", "123").await;
    register(&app, "carol", "123").await;

    let (_, body) = login(&app, "dap", "123").await;
    assert_eq!(body["user"]["isAdmin"], true);

    let (_, body) = login(&app, "carol", "123").await;
    assert_eq!(body["user"]["isAdmin"], false);
}

#[tokio::test]
async fn test_admin_routes_require_admin_token() {
    let app = spawn_app().await;

    let (status, _) = send(&app, get("/api/admin/data", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/admin/data", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    register(&app, "alice", "pw1").await;
    let (_, body) = login(&app, "alice", "pw1").await;
    let user_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, get("/api/admin/data", Some(&user_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/approve",
            &json!({ "userId": 1, "approve": true }),
            Some(&user_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approval_switches_names_on_next_login_only() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    register(&app, "alice", "pw1").await;
    let (_, before) = login(&app, "alice", "pw1").await;
    let alice_id = before["user"]["id"].as_i64().unwrap();
    let old_token = before["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/approve",
            &json!({ "userId": alice_id, "approve": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, after) = login(&app, "alice", "pw1").await;
    assert_eq!(after["user"]["aiName"], "Ava");
    assert_eq!(after["user"]["devName"], "Bob");

    // A token issued before approval still carries the default names
    let signer = TokenSigner::new(TEST_SECRET, Duration::from_secs(3600));
    let old_claims = signer.verify(&old_token).unwrap();
    assert_eq!(old_claims.ai_name, "DevCORE");
    let new_claims = signer.verify(after["token"].as_str().unwrap()).unwrap();
    assert_eq!(new_claims.ai_name, "Ava");
    assert_eq!(new_claims.sub, i32::try_from(alice_id).unwrap());

    send(
        &app,
        post_json(
            "/api/admin/approve",
            &json!({ "userId": alice_id, "approve": false }),
            Some(&admin),
        ),
    )
    .await;
    let (_, revoked) = login(&app, "alice", "pw1").await;
    assert_eq!(revoked["user"]["aiName"], "DevCORE");
}

#[tokio::test]
async fn test_approve_unknown_identity_is_not_found() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/admin/approve",
            &json!({ "userId": 9999, "approve": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_admin_data_lists_non_admins_and_settings() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;
    register(&app, "alice", "pw1").await;
    register(&app, "bob", "pw2").await;

    let (status, body) = send(&app, get("/api/admin/data", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().unwrap();
    let names: Vec<&str> = users
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
    assert_eq!(users[0]["aiNameRequest"], "Ava");
    assert_eq!(users[0]["isApproved"], false);

    let settings = &body["settings"];
    assert_eq!(settings["maintenanceMode"], false);
    assert_eq!(settings["imageGenEnabled"], true);
    assert_eq!(settings["apiKeys"], json!([]));
    assert_eq!(settings["quotes"], json!([]));
    assert_eq!(settings["version"], 0);
}

#[tokio::test]
async fn test_settings_replace_and_public_quotes() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = send(&app, get("/api/quotes", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let update = json!({
        "apiKeys": ["k1", "k2"],
        "maintenanceMode": false,
        "imageGenEnabled": false,
        "quotes": [{ "text": "Stay curious", "author": "System" }],
        "customPersona": "You are {{AI_NAME}}",
    });
    let (status, body) = send(&app, post_json("/api/admin/settings", &update, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["version"], 1);

    let (_, body) = send(&app, get("/api/quotes", None)).await;
    assert_eq!(body, json!([{ "text": "Stay curious", "author": "System" }]));

    let (_, body) = send(&app, get("/api/admin/data", Some(&admin))).await;
    assert_eq!(body["settings"]["apiKeys"], json!(["k1", "k2"]));
    assert_eq!(body["settings"]["imageGenEnabled"], false);
    assert_eq!(body["settings"]["customPersona"], "You are {{AI_NAME}}");

    // Wholesale replace: omitted fields fall back to their defaults
    let (status, _) = send(
        &app,
        post_json("/api/admin/settings", &json!({ "maintenanceMode": true }), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, get("/api/admin/data", Some(&admin))).await;
    assert_eq!(body["settings"]["quotes"], json!([]));
    assert_eq!(body["settings"]["maintenanceMode"], true);
    assert_eq!(body["settings"]["customPersona"], Value::Null);
    assert_eq!(body["settings"]["version"], 2);
}

#[tokio::test]
async fn test_settings_stale_version_conflicts() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let first = json!({ "quotes": [], "expectedVersion": 0 });
    let (status, body) = send(&app, post_json("/api/admin/settings", &first, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], 1);

    let stale = json!({ "maintenanceMode": true, "expectedVersion": 0 });
    let (status, body) = send(&app, post_json("/api/admin/settings", &stale, Some(&admin))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (_, body) = send(&app, get("/api/admin/data", Some(&admin))).await;
    assert_eq!(body["settings"]["maintenanceMode"], false);
    assert_eq!(body["settings"]["version"], 1);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app().await;

    let (status, body) = send(&app, get("/api/health/live", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "alive");

    let (status, body) = send(&app, get("/api/health/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/quotes", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    let request_id = headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
}
