//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use semt_core::config::AppConfig;
use semt_database::repositories::{JobRepository, NotificationRepository, PushTokenRepository};
use semt_service::{FanoutService, NotificationService, TokenDirectory};

use crate::auth::JwtDecoder;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Notification repository.
    pub notification_repo: Arc<NotificationRepository>,
    /// Push token repository.
    pub push_token_repo: Arc<PushTokenRepository>,
    /// Job repository.
    pub job_repo: Arc<JobRepository>,
    /// Token directory (cached token lookups and registration).
    pub token_directory: TokenDirectory,
    /// Recipient-facing notification service.
    pub notification_service: Arc<NotificationService>,
    /// Shared fan-out entry point for all trigger call sites.
    pub fanout_service: Arc<FanoutService>,
}
