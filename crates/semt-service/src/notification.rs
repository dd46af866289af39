//! Recipient-facing notification operations and broadcast records.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use semt_core::result::AppResult;
use semt_core::types::pagination::{PageRequest, PageResponse};
use semt_database::repositories::NotificationRepository;
use semt_entity::broadcast::Broadcast;
use semt_entity::notification::Notification;

use crate::context::RequestContext;

/// Read/unread and soft-delete operations, scoped to the requesting
/// recipient. The push axis is owned by the dispatcher and never
/// touched here.
#[derive(Debug, Clone)]
pub struct NotificationService {
    notifications: Arc<NotificationRepository>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(notifications: Arc<NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Lists the current user's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notifications
            .find_by_recipient(ctx.user_id, page)
            .await
    }

    /// Counts the current user's unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.notifications.count_unread(ctx.user_id).await
    }

    /// Marks one notification as read.
    pub async fn mark_read(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        self.notifications
            .mark_read(notification_id, ctx.user_id, Utc::now())
            .await
    }

    /// Marks all of the current user's notifications as read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.notifications
            .mark_all_read(ctx.user_id, Utc::now())
            .await
    }

    /// Soft-deletes one notification.
    pub async fn delete(&self, ctx: &RequestContext, notification_id: Uuid) -> AppResult<()> {
        self.notifications
            .soft_delete(notification_id, ctx.user_id)
            .await
    }

    /// Soft-deletes all of the current user's notifications.
    pub async fn delete_all(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.notifications.soft_delete_all(ctx.user_id).await
    }

    /// Records an admin broadcast and returns the row that becomes the
    /// fan-out's `source_ref`.
    pub async fn record_broadcast(
        &self,
        admin_id: Uuid,
        target_user_id: Option<Uuid>,
        title: &str,
        body: &str,
    ) -> AppResult<Broadcast> {
        let broadcast = Broadcast {
            id: Uuid::new_v4(),
            admin_id,
            target_user_id,
            title: title.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };
        let saved = self.notifications.create_broadcast(&broadcast).await?;
        info!(broadcast_id = %saved.id, "Broadcast recorded");
        Ok(saved)
    }

    /// Lists recent broadcasts for the admin history screen.
    pub async fn broadcast_history(&self, limit: i64) -> AppResult<Vec<Broadcast>> {
        self.notifications.find_broadcasts(limit).await
    }
}
