//! Push retry job handler — re-dispatch for the records of a failed chunk.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use semt_entity::job::model::Job;
use semt_entity::job::payload::JobPayload;
use semt_service::FanoutService;

use crate::executor::{JobExecutionError, JobHandler};

/// Executes `push_retry` jobs scheduled with exponential backoff after
/// a chunk-level gateway failure.
///
/// The records themselves carry everything needed to rebuild the
/// messages, so the original trigger is not re-resolved. Records that
/// were marked sent in the meantime are skipped.
#[derive(Debug)]
pub struct PushRetryJobHandler {
    fanout: Arc<FanoutService>,
}

impl PushRetryJobHandler {
    /// Create a new push retry job handler.
    pub fn new(fanout: Arc<FanoutService>) -> Self {
        Self { fanout }
    }
}

#[async_trait]
impl JobHandler for PushRetryJobHandler {
    fn job_type(&self) -> &str {
        "push_retry"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobPayload::PushRetry {
            notification_ids,
            attempt,
        } = job.typed_payload()?
        else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} carries a non-push-retry payload",
                job.id
            )));
        };

        let summary = self.fanout.retry_chunk(&notification_ids, attempt).await?;
        Ok(Some(serde_json::to_value(summary).map_err(|e| {
            JobExecutionError::Permanent(format!("Failed to serialize summary: {e}"))
        })?))
    }
}
