//! Worker runner — main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing::{error, info, trace};

use semt_core::config::worker::WorkerConfig;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// Queues polled by the runner, highest urgency first.
const QUEUES: [&str; 3] = ["fanout", "push", "maintenance"];

/// Main worker runner that polls queues and executes jobs.
#[derive(Debug)]
pub struct WorkerRunner {
    /// Job queue for polling.
    queue: Arc<JobQueue>,
    /// Job executor for dispatching.
    executor: Arc<JobExecutor>,
    /// Worker configuration.
    config: WorkerConfig,
    /// Worker identifier.
    worker_id: String,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(
        queue: Arc<JobQueue>,
        executor: Arc<JobExecutor>,
        config: WorkerConfig,
        worker_id: String,
    ) -> Self {
        Self {
            queue,
            executor,
            config,
            worker_id,
        }
    }

    /// Start the worker runner — runs until the cancel signal flips.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            worker_id = %self.worker_id,
            concurrency = self.config.concurrency,
            poll_interval = self.config.poll_interval_seconds,
            queues = ?QUEUES,
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            if *cancel.borrow() {
                break;
            }

            let claimed = self.poll_and_execute(&semaphore).await;

            // Poll again immediately while work keeps coming; sleep when
            // the queues are drained.
            if !claimed {
                tokio::select! {
                    _ = cancel.changed() => {
                        if *cancel.borrow() {
                            break;
                        }
                    }
                    _ = time::sleep(poll_interval) => {}
                }
            }
        }

        info!(worker_id = %self.worker_id, "Waiting for in-flight jobs to complete...");
        let max_permits = self.config.concurrency as u32;
        let _ = tokio::time::timeout(
            Duration::from_secs(30),
            semaphore.acquire_many(max_permits),
        )
        .await;

        info!(worker_id = %self.worker_id, "Worker shut down");
    }

    /// Poll for one job and spawn its execution. Returns whether a job
    /// was claimed.
    async fn poll_and_execute(&self, semaphore: &Arc<Semaphore>) -> bool {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                trace!("All worker slots occupied");
                return false;
            }
        };

        let job = match self.queue.dequeue(&QUEUES).await {
            Ok(Some(job)) => job,
            Ok(None) => return false,
            Err(e) => {
                error!(error = %e, "Failed to poll job queue");
                return false;
            }
        };

        let queue = Arc::clone(&self.queue);
        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            let job_id = job.id;
            let outcome = executor.execute(&job).await;
            let settle = match outcome {
                Ok(result) => queue.complete(job_id, result).await,
                Err(JobExecutionError::Transient(msg)) => {
                    if job.attempts < job.max_attempts {
                        error!(job_id = %job_id, error = %msg, "Job failed, will retry");
                        queue.retry(job_id).await
                    } else {
                        error!(job_id = %job_id, error = %msg, "Job failed, retries exhausted");
                        queue.fail(job_id, &msg).await
                    }
                }
                Err(JobExecutionError::Permanent(msg)) => {
                    error!(job_id = %job_id, error = %msg, "Job failed permanently");
                    queue.fail(job_id, &msg).await
                }
            };
            if let Err(e) = settle {
                error!(job_id = %job_id, error = %e, "Failed to settle job state");
            }
            drop(permit);
        });

        true
    }
}
