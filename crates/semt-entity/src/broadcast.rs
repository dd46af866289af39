//! Admin broadcast entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A broadcast message issued by an administrator.
///
/// The broadcast row is the `source_ref` of the fan-out it triggers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Broadcast {
    /// Unique broadcast identifier.
    pub id: Uuid,
    /// The administrator who issued the broadcast.
    pub admin_id: Uuid,
    /// Single target user, or None for all active users.
    pub target_user_id: Option<Uuid>,
    /// Broadcast title.
    pub title: String,
    /// Broadcast body.
    pub body: String,
    /// When the broadcast was issued.
    pub created_at: DateTime<Utc>,
}
