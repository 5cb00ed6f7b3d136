use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageBody};
use crate::services::auth_service::{AuthError, Registration};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub ai_name: Option<String>,
    #[serde(default)]
    pub dev_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginBody {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub ai_name: String,
    pub dev_name: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateIdentity(_) | AuthError::Validation(_) => {
                Self::validation(err.to_string())
            }
            AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::NotFound(id) => Self::not_found("Identity", id),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Admin gate for the console routes.
///
/// Requires `Authorization: Bearer <token>` carrying an admin identity.
/// The decoded claims are stored in the request extensions.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_bearer(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.auth_service().verify_token(&token)?;

    tracing::Span::current().record("user_id", claims.sub);

    if !claims.is_admin {
        return Err(ApiError::Forbidden("Admin privileges required".to_string()));
    }

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer` header
fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("Authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    (!token.is_empty()).then(|| token.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /register
/// Create an identity that waits for admin approval
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<MessageBody>>, ApiError> {
    state
        .auth_service()
        .register(Registration {
            username: payload.username,
            password: payload.password,
            ai_name: payload.ai_name,
            dev_name: payload.dev_name,
        })
        .await?;

    Ok(Json(ApiResponse::success(MessageBody {
        message: "Registered. Waiting for approval.".to_string(),
    })))
}

/// POST /login
/// Authenticate with username and password, returns a signed token on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginBody>>, ApiError> {
    let result = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    tracing::info!(username = %result.identity.username, "Login succeeded");

    Ok(Json(ApiResponse::success(LoginBody {
        token: result.token,
        user: SessionUser {
            id: result.identity.id,
            username: result.identity.username,
            is_admin: result.identity.is_admin,
            ai_name: result.names.ai_name,
            dev_name: result.names.dev_name,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_is_extracted_and_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer  abc.def "));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("Authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_none());

        assert!(extract_bearer(&HeaderMap::new()).is_none());
    }
}
