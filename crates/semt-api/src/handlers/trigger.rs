//! Trigger call sites: report, follow, and direct message.
//!
//! Each handler is invoked *after* the triggering business write has
//! committed in its own service. The handler only validates the trigger
//! and queues the fan-out; a queue failure surfaces here but can never
//! roll the business write back.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use semt_core::error::AppError;
use semt_entity::trigger::TriggerContext;

use crate::dto::request::{FollowTriggerRequest, MessageTriggerRequest, ReportTriggerRequest};
use crate::dto::response::{ApiResponse, SubmittedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/triggers/report
pub async fn report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ReportTriggerRequest>,
) -> Result<Json<ApiResponse<SubmittedResponse>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let mut trigger = TriggerContext::report(
        auth.user_id,
        req.severity,
        req.city,
        req.district,
        req.category,
        req.title,
        req.body,
        req.source_ref,
    );
    if let Some(data) = req.data {
        trigger = trigger.with_data(data);
    }

    let job = state.fanout_service.submit(&trigger).await?;
    Ok(Json(ApiResponse::ok(SubmittedResponse { job_id: job.id })))
}

/// POST /api/triggers/follow
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<FollowTriggerRequest>,
) -> Result<Json<ApiResponse<SubmittedResponse>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let trigger = TriggerContext::follow(
        auth.user_id,
        req.followed_user_id,
        req.title,
        req.body,
        req.source_ref,
    );

    let job = state.fanout_service.submit(&trigger).await?;
    Ok(Json(ApiResponse::ok(SubmittedResponse { job_id: job.id })))
}

/// POST /api/triggers/message
pub async fn message(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MessageTriggerRequest>,
) -> Result<Json<ApiResponse<SubmittedResponse>>, ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let mut trigger = TriggerContext::message(
        auth.user_id,
        req.conversation_id,
        req.title,
        req.body,
        req.source_ref,
    );
    if let Some(data) = req.data {
        trigger = trigger.with_data(data);
    }

    let job = state.fanout_service.submit(&trigger).await?;
    Ok(Json(ApiResponse::ok(SubmittedResponse { job_id: job.id })))
}
