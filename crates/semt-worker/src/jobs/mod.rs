//! Built-in job handler implementations.

pub mod fanout;
pub mod maintenance;
pub mod push_retry;

pub use fanout::FanoutJobHandler;
pub use maintenance::{NotificationCleanupHandler, TokenSweepHandler};
pub use push_retry::PushRetryJobHandler;
