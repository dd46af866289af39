//! Push token entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A device push token registered by the client's push-registration flow.
///
/// One token per user. Tokens may be absent or stale at any time; the
/// dispatcher tolerates both — a recipient without a usable token keeps
/// full in-app visibility of their records.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PushToken {
    /// Owning user.
    pub user_id: Uuid,
    /// Opaque token issued by the push provider to the device.
    pub token: String,
    /// When the token was first registered.
    pub created_at: DateTime<Utc>,
    /// When the token was last re-registered by the client.
    pub updated_at: DateTime<Utc>,
}
