//! Profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::status::ProfileStatus;

/// A user profile as seen by the notification subsystem.
///
/// Profiles are owned by the platform's account service; this service
/// only reads the fields that drive audience resolution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Role (RBAC).
    pub role: UserRole,
    /// Account status.
    pub status: ProfileStatus,
    /// Home city.
    pub city: String,
    /// Home district within the city.
    pub district: Option<String>,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Check whether this profile can receive notifications.
    pub fn is_active(&self) -> bool {
        self.status == ProfileStatus::Active
    }
}
