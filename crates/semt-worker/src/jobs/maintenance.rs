//! Store maintenance jobs: retention cleanup and stale-token sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::info;

use semt_core::config::notifications::NotificationsConfig;
use semt_database::repositories::{NotificationRepository, PushTokenRepository};
use semt_entity::job::model::Job;

use crate::executor::{JobExecutionError, JobHandler};

/// Removes notifications past the retention window and trims per-user
/// overflow.
#[derive(Debug)]
pub struct NotificationCleanupHandler {
    notifications: Arc<NotificationRepository>,
    config: NotificationsConfig,
}

impl NotificationCleanupHandler {
    /// Create a new cleanup handler.
    pub fn new(notifications: Arc<NotificationRepository>, config: NotificationsConfig) -> Self {
        Self {
            notifications,
            config,
        }
    }
}

#[async_trait]
impl JobHandler for NotificationCleanupHandler {
    fn job_type(&self) -> &str {
        "notification_cleanup"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days as i64);

        let expired = self.notifications.delete_older_than(cutoff).await?;
        let overflow = self
            .notifications
            .trim_per_recipient(self.config.max_stored_per_user)
            .await?;

        info!(
            expired,
            overflow,
            retention_days = self.config.retention_days,
            "Notification cleanup complete"
        );

        Ok(Some(serde_json::json!({
            "expired_removed": expired,
            "overflow_removed": overflow,
        })))
    }
}

/// Removes push tokens that have not been re-registered within the
/// staleness window.
#[derive(Debug)]
pub struct TokenSweepHandler {
    tokens: Arc<PushTokenRepository>,
    config: NotificationsConfig,
}

impl TokenSweepHandler {
    /// Create a new token sweep handler.
    pub fn new(tokens: Arc<PushTokenRepository>, config: NotificationsConfig) -> Self {
        Self { tokens, config }
    }
}

#[async_trait]
impl JobHandler for TokenSweepHandler {
    fn job_type(&self) -> &str {
        "token_sweep"
    }

    async fn execute(&self, _job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let cutoff = Utc::now() - Duration::days(self.config.stale_token_days as i64);
        let swept = self.tokens.delete_stale(cutoff).await?;

        info!(swept, stale_days = self.config.stale_token_days, "Token sweep complete");

        Ok(Some(serde_json::json!({ "swept": swept })))
    }
}
