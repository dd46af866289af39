//! Push gateway wire types.

use serde::{Deserialize, Serialize};

/// Provider error string for a token that is no longer registered to a
/// device. Such tokens are pruned from the directory.
const UNREGISTERED_MARKER: &str = "DeviceNotRegistered";

/// One message in a gateway batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    /// Recipient device token.
    pub to: String,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Structured payload for client-side deep-linking.
    pub data: serde_json::Value,
    /// Sound hint.
    pub sound: String,
    /// Badge hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
}

/// Per-message delivery result, positionally aligned with the request
/// array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTicket {
    /// Delivery status for this message.
    pub status: TicketStatus,
    /// Provider error detail for `error` tickets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Gateway-reported per-message status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// The gateway accepted the message for delivery.
    Ok,
    /// The gateway rejected the message.
    Error,
}

impl PushTicket {
    /// Build a success ticket.
    pub fn ok() -> Self {
        Self {
            status: TicketStatus::Ok,
            message: None,
        }
    }

    /// Build an error ticket with a provider detail.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: TicketStatus::Error,
            message: Some(message.into()),
        }
    }

    /// Whether the gateway accepted this message.
    pub fn is_ok(&self) -> bool {
        self.status == TicketStatus::Ok
    }

    /// Whether the provider reported the token as no longer registered.
    pub fn is_unregistered_device(&self) -> bool {
        self.status == TicketStatus::Error
            && self
                .message
                .as_deref()
                .is_some_and(|m| m.contains(UNREGISTERED_MARKER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let msg = PushMessage {
            to: "ExponentPushToken[abc]".to_string(),
            title: "Road closed".to_string(),
            body: "Flooding on the coastal road".to_string(),
            data: serde_json::json!({ "kind": "event" }),
            sound: "default".to_string(),
            badge: None,
        };
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["to"], "ExponentPushToken[abc]");
        // Absent badge must not appear on the wire
        assert!(json.get("badge").is_none());
    }

    #[test]
    fn test_ticket_parsing() {
        let tickets: Vec<PushTicket> = serde_json::from_str(
            r#"[{"status":"ok"},{"status":"error","message":"DeviceNotRegistered"}]"#,
        )
        .expect("parse tickets");
        assert!(tickets[0].is_ok());
        assert!(!tickets[1].is_ok());
        assert!(tickets[1].is_unregistered_device());
    }

    #[test]
    fn test_generic_error_is_not_unregistered() {
        let ticket = PushTicket::error("MessageRateExceeded");
        assert!(!ticket.is_unregistered_device());
    }
}
