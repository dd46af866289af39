//! # semt-api
//!
//! HTTP surface of the Semt notification service. The four trigger
//! call sites (report, follow, message, admin broadcast) submit
//! fan-outs through one shared service; the read side serves the
//! notification screens of the client apps.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
