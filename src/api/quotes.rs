use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::models::settings::Quote;

/// GET /quotes
/// Public read of the quotes list
pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let quotes = state.settings_service().quotes().await?;
    Ok(Json(quotes))
}
