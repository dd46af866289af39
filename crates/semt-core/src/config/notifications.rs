//! Notification retention and token directory configuration.

use serde::{Deserialize, Serialize};

/// Notification store maintenance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Days after which notifications are physically removed by the
    /// maintenance job. Soft-deleted rows are subject to the same window.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Maximum stored notifications per recipient.
    #[serde(default = "default_max_stored")]
    pub max_stored_per_user: i64,
    /// Days of inactivity after which a push token is swept.
    #[serde(default = "default_stale_token_days")]
    pub stale_token_days: u32,
    /// Token directory cache time-to-live in seconds.
    #[serde(default = "default_token_cache_ttl")]
    pub token_cache_ttl_seconds: u64,
    /// Token directory cache capacity.
    #[serde(default = "default_token_cache_capacity")]
    pub token_cache_capacity: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            max_stored_per_user: default_max_stored(),
            stale_token_days: default_stale_token_days(),
            token_cache_ttl_seconds: default_token_cache_ttl(),
            token_cache_capacity: default_token_cache_capacity(),
        }
    }
}

fn default_retention_days() -> u32 {
    90
}

fn default_max_stored() -> i64 {
    1000
}

fn default_stale_token_days() -> u32 {
    120
}

fn default_token_cache_ttl() -> u64 {
    60
}

fn default_token_cache_capacity() -> u64 {
    100_000
}
