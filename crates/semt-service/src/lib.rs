//! # semt-service
//!
//! Business logic for the Semt notification service: audience
//! resolution under the tier rules, the fan-out pipeline
//! (resolve → write → dispatch), the token directory, and the
//! recipient-facing notification operations.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod audience;
pub mod context;
pub mod fanout;
pub mod notification;
pub mod tokens;

pub use audience::AudienceResolver;
pub use context::RequestContext;
pub use fanout::{FanoutService, FanoutSummary};
pub use notification::NotificationService;
pub use tokens::TokenDirectory;
