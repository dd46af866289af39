//! Push token registration handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use semt_core::error::AppError;

use crate::dto::request::RegisterTokenRequest;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// PUT /api/push-token
pub async fn register_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RegisterTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    state
        .token_directory
        .register(auth.user_id, &req.token)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Token registered" } }),
    ))
}

/// DELETE /api/push-token
pub async fn unregister_token(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.token_directory.unregister(auth.user_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "message": "Token removed" } }),
    ))
}
