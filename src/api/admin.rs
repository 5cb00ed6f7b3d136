//! Admin console endpoints. Mounted behind [`super::auth::require_admin`].

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, Empty, VersionBody};
use crate::models::settings::SettingsUpdate;
use crate::services::settings_service::{AdminData, SettingsError};
use crate::services::token::Claims;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub user_id: i32,
    pub approve: bool,
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Conflict { .. } => Self::Conflict(err.to_string()),
            SettingsError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

/// GET /admin/data
pub async fn get_admin_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AdminData>, ApiError> {
    let data = state.settings_service().admin_data().await?;
    Ok(Json(data))
}

/// POST /admin/approve
/// Flip the approval flag. Tokens issued earlier keep their names.
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Claims>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .auth_service()
        .approve(payload.user_id, payload.approve)
        .await?;

    tracing::info!(
        admin = %admin.username,
        identity_id = payload.user_id,
        approve = payload.approve,
        "Approval changed by admin"
    );

    Ok(Json(ApiResponse::success(Empty {})))
}

/// POST /admin/settings
/// Replace the global settings record
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Claims>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<ApiResponse<VersionBody>>, ApiError> {
    let version = state.settings_service().update(payload).await?;
    tracing::info!(admin = %admin.username, version, "Settings replaced by admin");
    Ok(Json(ApiResponse::success(VersionBody { version })))
}
