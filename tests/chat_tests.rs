//! Integration tests for the chat flow, maintenance mode and history.

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use devcore::config::{Config, ReplyProvider};
use devcore::db::Store;
use devcore::models::identity::DisplayNames;
use devcore::models::settings::SettingsUpdate;
use devcore::services::chat_service::ChatMessage;
use devcore::services::persona::CODING_INSTRUCTION;
use devcore::services::reply::{ReplyError, ReplyGenerator, ReplyRequest};
use devcore::services::{ChatService, SeaOrmChatService};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

fn temp_db_url() -> String {
    let db_path =
        std::env::temp_dir().join(format!("devcore-chat-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", db_path.display())
}

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    spawn_app_with(config).await
}

async fn spawn_app_with(config: Config) -> Router {
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

async fn chat(app: &Router, user_id: i32, message: &str) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            "/api/chat",
            &json!({
                "message": message,
                "userId": user_id,
                "aiName": "Ava",
                "devName": "Bob",
            }),
            None,
        ),
    )
    .await
}

async fn history(app: &Router, user_id: i32) -> Vec<Value> {
    let request = Request::builder()
        .uri(format!("/api/history/{user_id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().cloned().unwrap_or_default()
}

async fn admin_token(app: &Router) -> String {
    let registration = json!({
        "username": "dap",
        "password": "123",
        "aiName": "Root",
        "devName": "Ops",
    });
    send(app, post_json("/api/register", &registration, None)).await;
    let (_, body) = send(
        app,
        post_json(
            "/api/login",
            &json!({ "username": "dap", "password": "123" }),
            None,
        ),
    )
    .await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_script_request_returns_code() {
    let app = spawn_app().await;

    for message in ["write a script", "SCRIPT please", "an Html page", "some python"] {
        let (status, body) = chat(&app, 1, message).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isCode"], true, "message: {message}");
        let reply = body["reply"].as_str().unwrap();
        assert!(reply.contains("```"));
        assert!(reply.contains("Bob"));
        assert!(reply.contains("Ava"));
    }
}

#[tokio::test]
async fn test_plain_request_returns_text() {
    let app = spawn_app().await;

    let (status, body) = chat(&app, 1, "hello there").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isCode"], false);
    assert_eq!(
        body["reply"],
        "[Ava]: Command received. Processing \"hello there\"..."
    );
}

#[tokio::test]
async fn test_missing_names_fall_back_to_defaults() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        post_json("/api/chat", &json!({ "message": "ping", "userId": 3 }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().starts_with("[DevCORE]"));
}

#[tokio::test]
async fn test_turns_are_persisted_with_code_flags() {
    let app = spawn_app().await;

    chat(&app, 1, "hello").await;
    chat(&app, 1, "need a script").await;

    let turns = history(&app, 1).await;
    assert_eq!(turns.len(), 4);

    let roles: Vec<&str> = turns.iter().map(|t| t["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);

    assert_eq!(turns[0]["content"], "hello");
    assert_eq!(turns[0]["isCode"], false);
    assert_eq!(turns[1]["isCode"], false);
    assert_eq!(turns[1]["codeLanguage"], "text");
    assert_eq!(turns[3]["isCode"], true);
    assert_eq!(turns[3]["codeLanguage"], "javascript");
    assert!(turns.iter().all(|t| t["userId"] == 1));
}

#[tokio::test]
async fn test_history_is_ordered_and_scoped() {
    let app = spawn_app().await;

    chat(&app, 1, "first").await;
    chat(&app, 2, "other user").await;
    chat(&app, 1, "second").await;

    let turns = history(&app, 1).await;
    assert_eq!(turns.len(), 4);
    assert!(turns.iter().all(|t| t["userId"] == 1));

    let timestamps: Vec<&str> = turns
        .iter()
        .map(|t| t["timestamp"].as_str().unwrap())
        .collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(turns[0]["content"], "first");
    assert_eq!(turns[2]["content"], "second");

    assert_eq!(history(&app, 2).await.len(), 2);
    assert!(history(&app, 42).await.is_empty());
}

#[tokio::test]
async fn test_maintenance_mode_short_circuits() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/admin/settings",
            &json!({ "maintenanceMode": true }),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = chat(&app, 5, "write a script").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "SYSTEM: SERVER UNDER MAINTENANCE.");
    assert_eq!(body["isCode"], false);

    let turns = history(&app, 5).await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["role"], "user");
    assert_eq!(turns[0]["content"], "write a script");
}

async fn update_settings(app: &Router, token: &str, settings: &Value) {
    let (status, _) = send(app, post_json("/api/admin/settings", settings, Some(token))).await;
    assert_eq!(status, StatusCode::OK);
}

async fn key_cursor(app: &Router, token: &str) -> i64 {
    let request = Request::builder()
        .uri("/api/admin/data")
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    body["settings"]["currentKeyIndex"].as_i64().unwrap()
}

/// Completion endpoint that only accepts the key `good`.
async fn fake_completions(headers: HeaderMap) -> Response {
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("Bearer good") => Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "hi ```x```" } }]
        }))
        .into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn spawn_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/v1/chat/completions", post(fake_completions));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

#[tokio::test]
async fn test_upstream_rotates_past_failing_credentials() {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    config.assistant.provider = ReplyProvider::Upstream;
    config.assistant.base_url = spawn_upstream().await;
    config.assistant.request_timeout_seconds = 5;

    let app = spawn_app_with(config).await;
    let admin = admin_token(&app).await;

    update_settings(&app, &admin, &json!({ "apiKeys": ["bad", "good"] })).await;
    assert_eq!(key_cursor(&app, &admin).await, 0);

    let (status, body) = chat(&app, 7, "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "hi ```x```");
    assert_eq!(body["isCode"], true);

    // The working credential is remembered
    assert_eq!(key_cursor(&app, &admin).await, 1);
    let (status, _) = chat(&app, 7, "again").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(key_cursor(&app, &admin).await, 1);

    // Cursor past the end of a shorter list falls back to the first key
    update_settings(&app, &admin, &json!({ "apiKeys": ["good"] })).await;
    assert_eq!(key_cursor(&app, &admin).await, 0);
    let (status, _) = chat(&app, 7, "still there?").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upstream_failure_keeps_user_turn() {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    config.assistant.provider = ReplyProvider::Upstream;
    config.assistant.base_url = spawn_upstream().await;
    config.assistant.request_timeout_seconds = 5;

    let app = spawn_app_with(config).await;
    let admin = admin_token(&app).await;

    update_settings(&app, &admin, &json!({ "apiKeys": ["bad", "worse"] })).await;

    let (status, body) = chat(&app, 8, "hello").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("HTTP 401"));

    let turns = history(&app, 8).await;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0]["role"], "user");

    update_settings(&app, &admin, &json!({ "apiKeys": [] })).await;
    let (status, body) = chat(&app, 8, "anyone?").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("No upstream credentials")
    );
    assert_eq!(history(&app, 8).await.len(), 2);
}

/// Keeps every system prompt it is asked to answer.
#[derive(Default)]
struct RecordingGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ReplyGenerator for RecordingGenerator {
    async fn generate(&self, request: &ReplyRequest<'_>) -> Result<String, ReplyError> {
        self.prompts
            .lock()
            .unwrap()
            .push(request.system_prompt.to_string());
        Ok("noted".to_string())
    }
}

fn session_message(message: &str) -> ChatMessage {
    ChatMessage {
        identity_id: 1,
        message: message.to_string(),
        names: DisplayNames {
            ai_name: "Ava".to_string(),
            dev_name: "Bob".to_string(),
        },
    }
}

#[tokio::test]
async fn test_persona_is_rendered_into_system_prompt() {
    let store = Store::new(&temp_db_url()).await.unwrap();
    let generator = Arc::new(RecordingGenerator::default());
    let service = SeaOrmChatService::new(store.clone(), generator.clone());

    // No persona: the prompt is only the coding instruction
    let reply = service.chat(session_message("hi")).await.unwrap();
    assert_eq!(reply.reply, "noted");
    assert!(!reply.is_code);

    store
        .replace_settings(&SettingsUpdate {
            custom_persona: Some(
                "You are {{AI_NAME}}. {{DEV_NAME}} built {{AI_NAME}} for {{DEV_NAME}}.".to_string(),
            ),
            ..SettingsUpdate::default()
        })
        .await
        .unwrap();

    service.chat(session_message("who are you?")).await.unwrap();

    let prompts = generator.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], CODING_INSTRUCTION);
    assert_eq!(
        prompts[1],
        format!("You are Ava. Bob built Ava for Bob.{CODING_INSTRUCTION}")
    );
    assert!(!prompts[1].contains("{{"));
}
