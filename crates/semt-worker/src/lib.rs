//! # semt-worker
//!
//! Background job processing for the Semt notification service:
//! - A worker runner that polls for and executes queued jobs
//! - A cron scheduler for periodic maintenance tasks
//! - A job executor that dispatches jobs to the correct handler
//! - Handlers for fan-out, push retry, and store maintenance

pub mod executor;
pub mod jobs;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
