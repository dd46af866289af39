//! Semt notification service — server entry point.
//!
//! Wires configuration, database, services, worker, and the HTTP API
//! together and runs until interrupted.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use semt_core::config::AppConfig;
use semt_core::error::AppError;
use semt_database::DatabasePool;
use semt_database::repositories::{
    JobRepository, NotificationRepository, ProfileRepository, PushTokenRepository,
};
use semt_push::{HttpPushGateway, PushDispatcher};
use semt_service::{
    AudienceResolver, FanoutService, NotificationService, TokenDirectory,
};
use semt_worker::executor::JobExecutor;
use semt_worker::jobs::{
    FanoutJobHandler, NotificationCleanupHandler, PushRetryJobHandler, TokenSweepHandler,
};
use semt_worker::queue::JobQueue;
use semt_worker::{CronScheduler, WorkerRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("SEMT_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Semt notification service v{}", env!("CARGO_PKG_VERSION"));

    // Database connection + migrations
    let database = DatabasePool::connect(&config.database).await?;
    semt_database::migration::run_migrations(database.pool()).await?;
    let db_pool = database.pool().clone();

    // Repositories
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));
    let profile_repo = Arc::new(ProfileRepository::new(db_pool.clone()));
    let push_token_repo = Arc::new(PushTokenRepository::new(db_pool.clone()));
    let job_repo = Arc::new(JobRepository::new(db_pool.clone()));

    // Push gateway + dispatcher
    let gateway = Arc::new(HttpPushGateway::new(&config.push)?);
    let dispatcher = Arc::new(PushDispatcher::new(gateway, &config.push));

    // Services
    let token_directory = TokenDirectory::new(Arc::clone(&push_token_repo), &config.notifications);
    let resolver = AudienceResolver::new(profile_repo.clone());
    let fanout_service = Arc::new(FanoutService::new(
        resolver,
        Arc::clone(&notification_repo),
        token_directory.clone(),
        Arc::clone(&dispatcher),
        Arc::clone(&job_repo),
        config.push.clone(),
    ));
    let notification_service = Arc::new(NotificationService::new(Arc::clone(&notification_repo)));

    // Worker
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = if config.worker.enabled {
        let queue = Arc::new(JobQueue::new(
            Arc::clone(&job_repo),
            format!("semt-worker-{}", std::process::id()),
        ));

        let mut executor = JobExecutor::new();
        executor.register(Arc::new(FanoutJobHandler::new(Arc::clone(&fanout_service))));
        executor.register(Arc::new(PushRetryJobHandler::new(Arc::clone(&fanout_service))));
        executor.register(Arc::new(NotificationCleanupHandler::new(
            Arc::clone(&notification_repo),
            config.notifications.clone(),
        )));
        executor.register(Arc::new(TokenSweepHandler::new(
            Arc::clone(&push_token_repo),
            config.notifications.clone(),
        )));
        let executor = Arc::new(executor);

        let mut scheduler = CronScheduler::new(Arc::clone(&queue)).await?;
        scheduler.register_default_tasks().await?;
        scheduler.start().await?;

        let runner = WorkerRunner::new(
            queue,
            executor,
            config.worker.clone(),
            format!("semt-worker-{}", std::process::id()),
        );
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move {
            runner.run(rx).await;
            if let Err(e) = scheduler.shutdown().await {
                tracing::error!("Scheduler shutdown error: {e}");
            }
        }))
    } else {
        tracing::warn!("Worker disabled; fan-out jobs will queue but not execute");
        None
    };

    // HTTP API
    let config = Arc::new(config);
    let state = semt_api::AppState {
        config: Arc::clone(&config),
        db_pool,
        jwt_decoder: Arc::new(semt_api::auth::JwtDecoder::new(&config.auth)),
        notification_repo,
        push_token_repo,
        job_repo,
        token_directory,
        notification_service,
        fanout_service,
    };
    let router = semt_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // Drain the worker before exit
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        let _ = handle.await;
    }
    database.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
