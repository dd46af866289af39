//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{debug, error, info};

use semt_core::error::AppError;
use semt_entity::job::model::CreateJob;
use semt_entity::job::payload::JobPayload;
use semt_entity::job::status::JobPriority;

use crate::queue::JobQueue;

/// Cron-based scheduler that enqueues periodic maintenance jobs.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Job queue for enqueuing scheduled work.
    queue: Arc<JobQueue>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(queue: Arc<JobQueue>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, queue })
    }

    /// Register all default scheduled tasks.
    pub async fn register_default_tasks(&self) -> Result<(), AppError> {
        // Retention cleanup nightly, token sweep shortly after
        self.register_maintenance("0 30 3 * * *", JobPayload::NotificationCleanup)
            .await?;
        self.register_maintenance("0 0 4 * * *", JobPayload::TokenSweep)
            .await?;

        info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }

    /// Register one maintenance payload on a cron expression.
    async fn register_maintenance(
        &self,
        schedule: &str,
        payload: JobPayload,
    ) -> Result<(), AppError> {
        let queue = Arc::clone(&self.queue);
        let job_type = payload.job_type();

        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let queue = Arc::clone(&queue);
            let payload = payload.clone();
            Box::pin(async move {
                debug!(job_type = payload.job_type(), "Scheduling maintenance job");
                match CreateJob::from_payload(&payload, JobPriority::Low, None) {
                    Ok(create) => {
                        if let Err(e) = queue.enqueue(create).await {
                            error!(
                                job_type = payload.job_type(),
                                error = %e,
                                "Failed to enqueue maintenance job"
                            );
                        }
                    }
                    Err(e) => error!(error = %e, "Failed to build maintenance job"),
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create {job_type} schedule: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {job_type} schedule: {e}")))?;

        Ok(())
    }
}
