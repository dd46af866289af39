//! # semt-push
//!
//! Client for the external push gateway: wire types, the gateway trait
//! with its HTTP implementation, and the chunked batch dispatcher.
//!
//! The gateway is treated as an unreliable, batch-limited dependency.
//! Delivery failures are reported, never raised — a failed push must
//! never fail the business action that triggered it.

pub mod dispatcher;
pub mod gateway;
pub mod message;

pub use dispatcher::{DispatchReport, OutboundPush, PushDispatcher};
pub use gateway::{HttpPushGateway, PushGateway};
pub use message::{PushMessage, PushTicket, TicketStatus};
