//! Token directory — user ID to device push token lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;
use uuid::Uuid;

use semt_core::config::notifications::NotificationsConfig;
use semt_core::result::AppResult;
use semt_database::repositories::PushTokenRepository;

/// Read-through cache in front of the push token store.
///
/// The fan-out pipeline only reads tokens; writes come from the client
/// registration endpoints and from pruning of provider-rejected tokens.
/// A short TTL bounds staleness, which the dispatcher tolerates anyway.
#[derive(Clone)]
pub struct TokenDirectory {
    repo: Arc<PushTokenRepository>,
    cache: Cache<Uuid, String>,
}

impl std::fmt::Debug for TokenDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDirectory")
            .field("cached", &self.cache.entry_count())
            .finish()
    }
}

impl TokenDirectory {
    /// Creates a directory over the token repository.
    pub fn new(repo: Arc<PushTokenRepository>, config: &NotificationsConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.token_cache_capacity)
            .time_to_live(Duration::from_secs(config.token_cache_ttl_seconds))
            .build();
        Self { repo, cache }
    }

    /// Batched lookup. Users without a registered token are absent from
    /// the result — they keep in-app visibility but are skipped for push.
    pub async fn lookup(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        let mut found = HashMap::with_capacity(user_ids.len());
        let mut misses = Vec::new();

        for &user_id in user_ids {
            match self.cache.get(&user_id).await {
                Some(token) => {
                    found.insert(user_id, token);
                }
                None => misses.push(user_id),
            }
        }

        if !misses.is_empty() {
            let rows = self.repo.find_for_users(&misses).await?;
            for row in rows {
                self.cache.insert(row.user_id, row.token.clone()).await;
                found.insert(row.user_id, row.token);
            }
        }

        debug!(
            requested = user_ids.len(),
            resolved = found.len(),
            "Token directory lookup"
        );
        Ok(found)
    }

    /// Register or refresh a user's token.
    pub async fn register(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.repo.upsert(user_id, token).await?;
        self.cache.insert(user_id, token.to_string()).await;
        Ok(())
    }

    /// Remove a user's token (client unregistered).
    pub async fn unregister(&self, user_id: Uuid) -> AppResult<()> {
        self.repo.delete_for_user(user_id).await?;
        self.cache.invalidate(&user_id).await;
        Ok(())
    }

    /// Prune a token the provider reported as unregistered.
    pub async fn prune(&self, recipient_id: Uuid, token: &str) -> AppResult<u64> {
        let removed = self.repo.delete_by_token(token).await?;
        self.cache.invalidate(&recipient_id).await;
        Ok(removed)
    }
}
