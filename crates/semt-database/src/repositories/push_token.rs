//! Push token repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use semt_core::error::{AppError, ErrorKind};
use semt_core::result::AppResult;
use semt_entity::push_token::PushToken;

/// Repository backing the token directory.
#[derive(Debug, Clone)]
pub struct PushTokenRepository {
    pool: PgPool,
}

impl PushTokenRepository {
    /// Create a new push token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batched lookup of current tokens for a recipient set.
    ///
    /// Users without a registered token are simply absent from the
    /// result.
    pub async fn find_for_users(&self, user_ids: &[Uuid]) -> AppResult<Vec<PushToken>> {
        sqlx::query_as::<_, PushToken>("SELECT * FROM push_tokens WHERE user_id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to look up push tokens", e)
            })
    }

    /// Register or refresh a user's token.
    pub async fn upsert(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO push_tokens (user_id, token, created_at, updated_at) \
             VALUES ($1, $2, NOW(), NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET token = $2, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to upsert push token", e)
        })?;
        Ok(())
    }

    /// Remove a user's token (client unregistered).
    pub async fn delete_for_user(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM push_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete push token", e)
            })?;
        Ok(())
    }

    /// Remove a token the provider reported as no longer registered.
    pub async fn delete_by_token(&self, token: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM push_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune push token", e)
            })?;
        Ok(result.rows_affected())
    }

    /// Remove tokens not re-registered since the cutoff.
    pub async fn delete_stale(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM push_tokens WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to sweep stale tokens", e)
            })?;
        Ok(result.rows_affected())
    }
}
