//! Typed job payload definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trigger::TriggerContext;

/// Typed payloads for known job types.
///
/// Serialized into the job row's JSON payload column; the tag matches
/// the row's `job_type` string so handlers can deserialize strictly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "job_type")]
pub enum JobPayload {
    /// Run the full fan-out pipeline for one trigger.
    #[serde(rename = "fanout")]
    Fanout {
        /// The trigger context captured at the call site.
        trigger: TriggerContext,
    },
    /// Retry push delivery for the unsent records of a failed chunk.
    #[serde(rename = "push_retry")]
    PushRetry {
        /// Records that were in the failed chunk.
        notification_ids: Vec<Uuid>,
        /// Delivery attempts made so far (the failed ones included).
        attempt: u32,
    },
    /// Remove notifications past the retention window and trim per-user
    /// overflow.
    #[serde(rename = "notification_cleanup")]
    NotificationCleanup,
    /// Remove push tokens that have not been re-registered recently.
    #[serde(rename = "token_sweep")]
    TokenSweep,
}

impl JobPayload {
    /// The `job_type` string of this payload.
    pub fn job_type(&self) -> &'static str {
        match self {
            Self::Fanout { .. } => "fanout",
            Self::PushRetry { .. } => "push_retry",
            Self::NotificationCleanup => "notification_cleanup",
            Self::TokenSweep => "token_sweep",
        }
    }

    /// The queue this payload belongs on.
    pub fn queue(&self) -> &'static str {
        match self {
            Self::Fanout { .. } => "fanout",
            Self::PushRetry { .. } => "push",
            Self::NotificationCleanup | Self::TokenSweep => "maintenance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Severity;

    #[test]
    fn test_tagged_roundtrip() {
        let trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::High,
            "Trabzon",
            Some("Ortahisar".to_string()),
            None,
            "Water outage",
            "Scheduled maintenance",
            Uuid::new_v4(),
        );
        let payload = JobPayload::Fanout { trigger };
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["job_type"], "fanout");

        let parsed: JobPayload = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.job_type(), "fanout");
        assert_eq!(parsed.queue(), "fanout");
    }

    #[test]
    fn test_queue_routing() {
        let retry = JobPayload::PushRetry {
            notification_ids: vec![Uuid::new_v4()],
            attempt: 1,
        };
        assert_eq!(retry.queue(), "push");
        assert_eq!(JobPayload::TokenSweep.queue(), "maintenance");
    }
}
