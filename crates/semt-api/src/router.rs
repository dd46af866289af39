//! Route definitions for the Semt notification HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(token_routes())
        .merge(trigger_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Notification read-side endpoints.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications",
            delete(handlers::notification::delete_all_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
}

/// Push token registration endpoints.
fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/push-token", put(handlers::token::register_token))
        .route("/push-token", delete(handlers::token::unregister_token))
}

/// Trigger call sites.
fn trigger_routes() -> Router<AppState> {
    Router::new()
        .route("/triggers/report", post(handlers::trigger::report))
        .route("/triggers/follow", post(handlers::trigger::follow))
        .route("/triggers/message", post(handlers::trigger::message))
}

/// Admin endpoints.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/broadcast", post(handlers::admin::send_broadcast))
        .route(
            "/admin/broadcasts",
            get(handlers::admin::broadcast_history),
        )
}

/// Health endpoint.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
