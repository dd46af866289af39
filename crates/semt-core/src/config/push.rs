//! Push gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// External push gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Gateway endpoint URL for batch sends.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// Maximum messages per gateway request (gateway-documented maximum).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Maximum chunks dispatched concurrently.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_chunks: usize,
    /// Sound hint embedded in every push message.
    #[serde(default = "default_sound")]
    pub sound: String,
    /// Retry settings for failed chunks.
    #[serde(default)]
    pub retry: PushRetryConfig,
}

/// Retry policy for failed push chunks.
///
/// A failed chunk is re-enqueued with exponential backoff until
/// `max_attempts` is reached, then dropped with a warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRetryConfig {
    /// Maximum delivery attempts per chunk (first attempt included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in seconds.
    #[serde(default = "default_base_backoff")]
    pub base_backoff_seconds: u64,
    /// Ceiling on the backoff delay in seconds.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_seconds: u64,
}

impl PushRetryConfig {
    /// Backoff delay before retry attempt `attempt` (1-based).
    ///
    /// Doubles per attempt, capped at `max_backoff_seconds`. Jitter is
    /// added by the caller.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let secs = self
            .base_backoff_seconds
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_seconds);
        Duration::from_secs(secs)
    }

    /// Whether another attempt is allowed after `attempt` attempts.
    pub fn can_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for PushRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_seconds: default_base_backoff(),
            max_backoff_seconds: default_max_backoff(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://push.gateway.invalid/v1/send".to_string()
}

fn default_chunk_size() -> usize {
    100
}

fn default_timeout() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    4
}

fn default_sound() -> String {
    "default".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff() -> u64 {
    30
}

fn default_max_backoff() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = PushRetryConfig {
            max_attempts: 5,
            base_backoff_seconds: 30,
            max_backoff_seconds: 120,
        };
        assert_eq!(retry.backoff_delay(1), Duration::from_secs(30));
        assert_eq!(retry.backoff_delay(2), Duration::from_secs(60));
        assert_eq!(retry.backoff_delay(3), Duration::from_secs(120));
        // Capped from here on
        assert_eq!(retry.backoff_delay(4), Duration::from_secs(120));
        assert_eq!(retry.backoff_delay(40), Duration::from_secs(120));
    }

    #[test]
    fn test_attempt_ceiling() {
        let retry = PushRetryConfig::default();
        assert!(retry.can_retry(1));
        assert!(retry.can_retry(4));
        assert!(!retry.can_retry(5));
        assert!(!retry.can_retry(6));
    }
}
