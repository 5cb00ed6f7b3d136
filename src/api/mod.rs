use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod admin;
pub mod auth;
mod chat;
mod error;
mod observability;
mod quotes;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use crate::services::{AuthService, ChatService, SettingsService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn chat_service(&self) -> &Arc<dyn ChatService> {
        &self.shared.chat_service
    }

    #[must_use]
    pub fn settings_service(&self) -> &Arc<dyn SettingsService> {
        &self.shared.settings_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let admin_routes = create_admin_router(state.clone());

    let api_router = Router::new()
        .merge(admin_routes)
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/chat", post(chat::chat))
        .route("/history/{user_id}", get(chat::history))
        .route("/quotes", get(quotes::list_quotes))
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready));

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/data", get(admin::get_admin_data))
        .route("/admin/approve", post(admin::approve))
        .route("/admin/settings", post(admin::update_settings))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}
