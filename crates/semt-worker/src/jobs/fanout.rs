//! Fan-out job handler — runs the full pipeline off the request path.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use semt_entity::job::model::Job;
use semt_entity::job::payload::JobPayload;
use semt_service::FanoutService;

use crate::executor::{JobExecutionError, JobHandler};

/// Executes `fanout` jobs: resolve the audience, write the records,
/// dispatch the pushes.
///
/// A re-run of the same trigger is harmless — the pipeline is
/// idempotent over the record store — so transient failures simply
/// retry the whole job.
#[derive(Debug)]
pub struct FanoutJobHandler {
    fanout: Arc<FanoutService>,
}

impl FanoutJobHandler {
    /// Create a new fan-out job handler.
    pub fn new(fanout: Arc<FanoutService>) -> Self {
        Self { fanout }
    }
}

#[async_trait]
impl JobHandler for FanoutJobHandler {
    fn job_type(&self) -> &str {
        "fanout"
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let JobPayload::Fanout { trigger } = job.typed_payload()? else {
            return Err(JobExecutionError::Permanent(format!(
                "Job {} carries a non-fanout payload",
                job.id
            )));
        };

        let summary = self.fanout.execute(&trigger).await?;
        Ok(Some(serde_json::to_value(summary).map_err(|e| {
            JobExecutionError::Permanent(format!("Failed to serialize summary: {e}"))
        })?))
    }
}
