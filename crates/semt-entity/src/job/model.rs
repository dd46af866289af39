//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use semt_core::AppResult;

use super::payload::JobPayload;
use super::status::{JobPriority, JobStatus};
use crate::trigger::TriggerContext;

/// A background job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// Job type identifier (e.g., `"fanout"`, `"push_retry"`).
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Job priority.
    pub priority: JobPriority,
    /// Job-specific payload (JSON).
    pub payload: serde_json::Value,
    /// Result data on completion (JSON).
    pub result: Option<serde_json::Value>,
    /// Error message on failure.
    pub error_message: Option<String>,
    /// Current job status.
    pub status: JobStatus,
    /// Number of execution attempts.
    pub attempts: i32,
    /// Maximum allowed attempts.
    pub max_attempts: i32,
    /// Scheduled execution time (None = immediate).
    pub scheduled_at: Option<DateTime<Utc>>,
    /// When the job started executing.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Worker ID that picked up the job.
    pub worker_id: Option<String>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Deserialize the typed payload.
    pub fn typed_payload(&self) -> AppResult<JobPayload> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Check if the job can be retried.
    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed && self.attempts < self.max_attempts
    }
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Job type identifier.
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Priority.
    pub priority: JobPriority,
    /// Job-specific payload.
    pub payload: serde_json::Value,
    /// Maximum execution attempts for the job row itself.
    pub max_attempts: i32,
    /// Scheduled execution time.
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CreateJob {
    /// Build a job from a typed payload.
    pub fn from_payload(
        payload: &JobPayload,
        priority: JobPriority,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        Ok(Self {
            job_type: payload.job_type().to_string(),
            queue: payload.queue().to_string(),
            priority,
            payload: serde_json::to_value(payload)?,
            max_attempts: 3,
            scheduled_at,
        })
    }

    /// Fan-out job for a validated trigger, priority derived from its
    /// severity tier.
    pub fn fanout(trigger: &TriggerContext) -> AppResult<Self> {
        Self::from_payload(
            &JobPayload::Fanout {
                trigger: trigger.clone(),
            },
            trigger.job_priority(),
            None,
        )
    }

    /// Delayed push retry for the records of a failed chunk.
    pub fn push_retry(
        notification_ids: Vec<Uuid>,
        attempt: u32,
        scheduled_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Self::from_payload(
            &JobPayload::PushRetry {
                notification_ids,
                attempt,
            },
            JobPriority::Normal,
            Some(scheduled_at),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Severity;

    #[test]
    fn test_fanout_job_carries_trigger() {
        let trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::Critical,
            "Trabzon",
            None,
            None,
            "Road closed",
            "Flooding",
            Uuid::new_v4(),
        );
        let create = CreateJob::fanout(&trigger).expect("create job");
        assert_eq!(create.job_type, "fanout");
        assert_eq!(create.queue, "fanout");
        assert_eq!(create.priority, JobPriority::Critical);

        let payload: JobPayload = serde_json::from_value(create.payload).expect("payload");
        match payload {
            JobPayload::Fanout { trigger: t } => assert_eq!(t.source_ref, trigger.source_ref),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_push_retry_is_scheduled() {
        let when = Utc::now() + chrono::Duration::seconds(60);
        let create =
            CreateJob::push_retry(vec![Uuid::new_v4()], 2, when).expect("create job");
        assert_eq!(create.queue, "push");
        assert_eq!(create.scheduled_at, Some(when));
    }
}
