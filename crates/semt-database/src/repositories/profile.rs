//! Profile repository implementation.
//!
//! Implements the read-only [`ProfileStore`] seam consumed by the
//! audience resolver. Every query filters on `status = 'active'` at the
//! store so deactivated accounts never reach an audience.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use semt_core::error::{AppError, ErrorKind};
use semt_core::result::AppResult;
use semt_core::traits::ProfileStore;
use semt_entity::profile::Profile;

/// Repository for profile and interest-subscription queries.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find profile by id", e)
            })
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn active_ids_in_city(&self, city: &str) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT id FROM profiles WHERE status = 'active' AND city = $1")
            .bind(city)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to query city audience", e)
            })
    }

    async fn active_ids_in_district(&self, city: &str, district: &str) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM profiles \
             WHERE status = 'active' AND city = $1 AND district = $2",
        )
        .bind(city)
        .bind(district)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query district audience", e)
        })
    }

    async fn active_ids_subscribed_to(&self, category: &str) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT p.id FROM profiles p \
             JOIN interest_subscriptions s ON s.user_id = p.id \
             WHERE p.status = 'active' AND s.category = $1",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to query category audience", e)
        })
    }

    async fn conversation_member_ids(&self, conversation_id: Uuid) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT m.user_id FROM conversation_members m \
             JOIN profiles p ON p.id = m.user_id \
             WHERE m.conversation_id = $1 AND p.status = 'active'",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to query conversation members",
                e,
            )
        })
    }

    async fn all_active_ids(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar("SELECT id FROM profiles WHERE status = 'active'")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to query active profiles", e)
            })
    }

    async fn is_active(&self, user_id: Uuid) -> AppResult<bool> {
        let exists: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM profiles WHERE id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check profile status", e)
        })?;
        Ok(exists.is_some())
    }
}
