//! Job queue abstraction for enqueuing and dequeuing background jobs.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use semt_core::error::AppError;
use semt_database::repositories::JobRepository;
use semt_entity::job::model::{CreateJob, Job};

/// Job queue for enqueuing and dequeuing work.
#[derive(Debug, Clone)]
pub struct JobQueue {
    /// Job repository for database persistence.
    repo: Arc<JobRepository>,
    /// Worker identifier for claiming jobs.
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue.
    pub fn new(repo: Arc<JobRepository>, worker_id: String) -> Self {
        Self { repo, worker_id }
    }

    /// Enqueue a new job.
    pub async fn enqueue(&self, create: CreateJob) -> Result<Job, AppError> {
        let job = self.repo.create(&create).await?;
        debug!(
            job_id = %job.id,
            job_type = %job.job_type,
            queue = %job.queue,
            priority = %job.priority,
            "Enqueued job"
        );
        Ok(job)
    }

    /// Dequeue the next available job from the given queues, in order.
    pub async fn dequeue(&self, queues: &[&str]) -> Result<Option<Job>, AppError> {
        for queue in queues {
            if let Some(job) = self.repo.dequeue(queue, &self.worker_id).await? {
                debug!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    queue = %job.queue,
                    attempt = job.attempts,
                    "Dequeued job"
                );
                return Ok(Some(job));
            }
        }
        Ok(None)
    }

    /// Mark a job as completed successfully.
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.repo.complete(job_id, result.as_ref()).await?;
        debug!(job_id = %job_id, "Job completed");
        Ok(())
    }

    /// Mark a job as failed.
    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.repo.fail(job_id, error).await?;
        debug!(job_id = %job_id, error, "Job failed");
        Ok(())
    }

    /// Reset a failed job to pending for another run.
    pub async fn retry(&self, job_id: Uuid) -> Result<(), AppError> {
        self.repo.reset_for_retry(job_id).await?;
        debug!(job_id = %job_id, "Job reset for retry");
        Ok(())
    }
}
