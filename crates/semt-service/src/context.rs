//! Request context carrying the authenticated user and their role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use semt_core::{AppError, AppResult};
use semt_entity::profile::UserRole;

/// Context for the current authenticated request.
///
/// Extracted from token claims and passed into service methods so that
/// every operation knows *who* is acting. Privilege is carried by the
/// role claim — no user ID is implicitly privileged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Rejects the request unless the user carries the admin role.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let admin = RequestContext::new(Uuid::new_v4(), UserRole::Admin);
        assert!(admin.require_admin().is_ok());

        let member = RequestContext::new(Uuid::new_v4(), UserRole::Member);
        assert!(member.require_admin().is_err());
    }
}
