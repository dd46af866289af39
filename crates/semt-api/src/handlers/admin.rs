//! Admin broadcast handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use semt_core::error::AppError;
use semt_entity::trigger::TriggerContext;

use crate::dto::request::BroadcastRequest;
use crate::dto::response::{ApiResponse, SubmittedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/broadcast
pub async fn send_broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<SubmittedResponse>>, ApiError> {
    auth.require_admin()?;
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    // The broadcast row is the committed business write; its id is the
    // fan-out's source_ref.
    let broadcast = state
        .notification_service
        .record_broadcast(auth.user_id, req.target_user_id, &req.title, &req.body)
        .await?;

    let mut trigger = TriggerContext::broadcast(
        auth.user_id,
        req.target_user_id,
        req.title,
        req.body,
        broadcast.id,
    );
    if let Some(data) = req.data {
        trigger = trigger.with_data(data);
    }

    let job = state.fanout_service.submit(&trigger).await?;
    Ok(Json(ApiResponse::ok(SubmittedResponse { job_id: job.id })))
}

/// GET /api/admin/broadcasts
pub async fn broadcast_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth.require_admin()?;
    let broadcasts = state.notification_service.broadcast_history(50).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": broadcasts }),
    ))
}
