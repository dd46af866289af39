//! Notification repository implementation.
//!
//! The Notification Writer and the delivery-state tracking both live
//! here: batch record creation with the idempotency constraint, the
//! monotonic `push_sent` flip, and the recipient-scoped read/delete
//! operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use semt_core::error::{AppError, ErrorKind};
use semt_core::result::AppResult;
use semt_core::types::pagination::{PageRequest, PageResponse};
use semt_entity::broadcast::Broadcast;
use semt_entity::notification::{Notification, NotificationKind};

/// Rows per INSERT statement. Keeps each statement well under the
/// PostgreSQL bind-parameter limit for city-wide audiences.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Repository for notification records and admin broadcasts.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one record per recipient for a trigger, all-or-nothing.
    ///
    /// Runs inside a single transaction so a storage failure midway leaves
    /// no half-notified audience. `ON CONFLICT DO NOTHING` on
    /// `(source_ref, recipient_id, kind)` makes a whole-trigger retry
    /// idempotent: records written by an earlier attempt are skipped.
    ///
    /// Returns the number of rows actually inserted.
    pub async fn insert_batch(&self, records: &[Notification]) -> AppResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut inserted = 0u64;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
                "INSERT INTO notifications \
                 (id, recipient_id, kind, title, body, data, source_ref, push_sent, created_at) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.id)
                    .push_bind(record.recipient_id)
                    .push_bind(record.kind)
                    .push_bind(&record.title)
                    .push_bind(&record.body)
                    .push_bind(&record.data)
                    .push_bind(record.source_ref)
                    .push_bind(record.push_sent)
                    .push_bind(record.created_at);
            });
            builder.push(" ON CONFLICT (source_ref, recipient_id, kind) DO NOTHING");

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert notifications", e)
            })?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit notifications", e)
        })?;

        Ok(inserted)
    }

    /// All records of a trigger that still await push delivery.
    ///
    /// Used after the write so that a retried trigger also re-covers
    /// records left unsent by an earlier, partially-dispatched run.
    pub async fn find_unsent_for_source(
        &self,
        source_ref: Uuid,
        kind: NotificationKind,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications \
             WHERE source_ref = $1 AND kind = $2 AND push_sent = FALSE",
        )
        .bind(source_ref)
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load unsent notifications", e)
        })
    }

    /// Load the still-unsent records among a known id set (push retry).
    pub async fn find_unsent_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = ANY($1) AND push_sent = FALSE",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load notifications by id", e)
        })
    }

    /// Flip `push_sent` for a confirmed-delivered id set.
    ///
    /// Keyed by notification id, not recipient, so overlapping runs can
    /// never mark a record that was not in the confirmed chunk. The flag
    /// only ever goes false → true.
    pub async fn mark_push_sent(&self, ids: &[Uuid]) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET push_sent = TRUE WHERE id = ANY($1) AND push_sent = FALSE",
        )
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark notifications sent", e)
        })?;
        Ok(result.rows_affected())
    }

    /// List a recipient's notifications, newest first, soft-deleted
    /// excluded.
    pub async fn find_by_recipient(
        &self,
        recipient_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_deleted = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
        })?;

        let notifs = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 AND is_deleted = FALSE \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(recipient_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list notifications", e)
        })?;

        Ok(PageResponse::new(
            notifs,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count a recipient's unread, non-deleted notifications.
    pub async fn count_unread(&self, recipient_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE recipient_id = $1 AND read_at IS NULL AND is_deleted = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Mark one notification as read.
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        recipient_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET read_at = $3 \
             WHERE id = $1 AND recipient_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(())
    }

    /// Mark all of a recipient's notifications as read.
    pub async fn mark_all_read(
        &self,
        recipient_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = $2 \
             WHERE recipient_id = $1 AND read_at IS NULL AND is_deleted = FALSE",
        )
        .bind(recipient_id)
        .bind(read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Soft-delete one notification for its recipient.
    pub async fn soft_delete(&self, notification_id: Uuid, recipient_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE notifications SET is_deleted = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(notification_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete notification", e)
        })?;
        Ok(())
    }

    /// Soft-delete all of a recipient's notifications.
    pub async fn soft_delete_all(&self, recipient_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_deleted = TRUE \
             WHERE recipient_id = $1 AND is_deleted = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete notifications", e)
        })?;
        Ok(result.rows_affected())
    }

    /// Physically remove notifications past the retention window.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cleanup notifications", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Keep only the latest N notifications for each recipient.
    pub async fn trim_per_recipient(&self, limit: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notifications WHERE id IN (\
                SELECT id FROM (\
                    SELECT id, ROW_NUMBER() OVER (PARTITION BY recipient_id ORDER BY created_at DESC) AS r_num \
                    FROM notifications\
                ) t WHERE t.r_num > $1\
             )",
        )
        .bind(limit)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to trim notifications", e))?;

        Ok(result.rows_affected())
    }

    /// Record an admin broadcast.
    pub async fn create_broadcast(&self, broadcast: &Broadcast) -> AppResult<Broadcast> {
        sqlx::query_as::<_, Broadcast>(
            "INSERT INTO broadcasts (id, admin_id, target_user_id, title, body, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(broadcast.id)
        .bind(broadcast.admin_id)
        .bind(broadcast.target_user_id)
        .bind(&broadcast.title)
        .bind(&broadcast.body)
        .bind(broadcast.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create broadcast", e))
    }

    /// Find recent broadcasts, newest first.
    pub async fn find_broadcasts(&self, limit: i64) -> AppResult<Vec<Broadcast>> {
        sqlx::query_as::<_, Broadcast>(
            "SELECT * FROM broadcasts ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find broadcasts", e))
    }
}
