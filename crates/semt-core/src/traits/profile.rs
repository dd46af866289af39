//! Read-only access to the profile store for audience resolution.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Snapshot queries over profiles, interest subscriptions, and
/// conversation membership.
///
/// The audience resolver is pure with respect to the data behind this
/// trait: it reads, it never writes. All queries return only active
/// accounts — deactivated profiles are filtered at the store.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// IDs of all active users in a city.
    async fn active_ids_in_city(&self, city: &str) -> AppResult<Vec<Uuid>>;

    /// IDs of all active users in a district of a city.
    async fn active_ids_in_district(&self, city: &str, district: &str) -> AppResult<Vec<Uuid>>;

    /// IDs of all active users subscribed to an interest category.
    async fn active_ids_subscribed_to(&self, category: &str) -> AppResult<Vec<Uuid>>;

    /// IDs of all members of a conversation.
    async fn conversation_member_ids(&self, conversation_id: Uuid) -> AppResult<Vec<Uuid>>;

    /// IDs of every active user in the system.
    async fn all_active_ids(&self) -> AppResult<Vec<Uuid>>;

    /// Whether the given user exists and is active.
    async fn is_active(&self, user_id: Uuid) -> AppResult<bool>;
}
