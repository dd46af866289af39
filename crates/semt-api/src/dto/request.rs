//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use semt_entity::trigger::Severity;

/// Report trigger request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportTriggerRequest {
    /// Severity tier controlling the fan-out breadth.
    pub severity: Severity,
    /// City of the report.
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    /// District within the city.
    pub district: Option<String>,
    /// Topical category for interest matching.
    pub category: Option<String>,
    /// Notification title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Notification body.
    #[validate(length(max = 2000))]
    pub body: String,
    /// Identifier of the already-committed report row.
    pub source_ref: Uuid,
    /// Extra client payload.
    pub data: Option<serde_json::Value>,
}

/// Follow trigger request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FollowTriggerRequest {
    /// The user who was followed.
    pub followed_user_id: Uuid,
    /// Notification title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Notification body.
    #[validate(length(max = 2000))]
    pub body: String,
    /// Identifier of the already-committed follow edge.
    pub source_ref: Uuid,
}

/// Direct-message trigger request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageTriggerRequest {
    /// Conversation whose other members are notified.
    pub conversation_id: Uuid,
    /// Notification title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Notification body (typically a message preview).
    #[validate(length(max = 2000))]
    pub body: String,
    /// Identifier of the already-committed message row.
    pub source_ref: Uuid,
    /// Extra client payload.
    pub data: Option<serde_json::Value>,
}

/// Admin broadcast request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BroadcastRequest {
    /// Single target user, or None for every active user.
    pub target_user_id: Option<Uuid>,
    /// Broadcast title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Broadcast body.
    #[validate(length(max = 2000))]
    pub body: String,
    /// Extra client payload.
    pub data: Option<serde_json::Value>,
}

/// Push token registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterTokenRequest {
    /// Token issued by the client's push-registration flow.
    #[validate(length(min = 1, max = 512, message = "Token is required"))]
    pub token: String,
}
