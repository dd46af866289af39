//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;
use crate::trigger::TriggerContext;

/// A durable notification record for one recipient.
///
/// At most one record exists per `(source_ref, recipient_id, kind)` —
/// enforced by a uniqueness constraint so that retried triggers cannot
/// double-notify.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Structured payload carrying trigger-specific references for
    /// client-side deep-linking.
    pub data: Option<serde_json::Value>,
    /// Identifier of the triggering business row (report, follow edge,
    /// message, broadcast). Idempotency key together with the recipient.
    pub source_ref: Uuid,
    /// Whether a push was confirmed delivered to the gateway for this
    /// record. Flips false → true exactly once, never back.
    pub push_sent: bool,
    /// When the recipient read the notification.
    pub read_at: Option<DateTime<Utc>>,
    /// Soft-delete flag, set by the recipient.
    pub is_deleted: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build the record for one recipient of a trigger.
    ///
    /// `push_sent` starts false; it is flipped by the dispatcher only on a
    /// confirmed gateway success.
    pub fn for_recipient(trigger: &TriggerContext, recipient_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind: trigger.notification_kind(),
            title: trigger.title.clone(),
            body: trigger.body.clone(),
            data: Some(trigger.client_payload()),
            source_ref: trigger.source_ref,
            push_sent: false,
            read_at: None,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    /// Check if the notification is unread.
    pub fn is_unread(&self) -> bool {
        self.read_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::Severity;

    #[test]
    fn test_for_recipient_starts_unsent_and_unread() {
        let trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::Critical,
            "Trabzon",
            None,
            None,
            "Road closed",
            "Flooding on the coastal road",
            Uuid::new_v4(),
        );
        let recipient = Uuid::new_v4();
        let record = Notification::for_recipient(&trigger, recipient);

        assert_eq!(record.recipient_id, recipient);
        assert_eq!(record.kind, NotificationKind::Event);
        assert_eq!(record.source_ref, trigger.source_ref);
        assert!(!record.push_sent);
        assert!(record.is_unread());
        assert!(!record.is_deleted);
    }

    #[test]
    fn test_client_payload_embedded() {
        let actor = Uuid::new_v4();
        let trigger = TriggerContext::follow(actor, Uuid::new_v4(), "New follower", "", Uuid::new_v4());
        let record = Notification::for_recipient(&trigger, Uuid::new_v4());
        let data = record.data.expect("payload present");

        assert_eq!(data["kind"], "follow");
        assert_eq!(data["actor_id"], actor.to_string());
        assert_eq!(data["source_ref"], trigger.source_ref.to_string());
        assert_eq!(record.kind, NotificationKind::Follow);
    }
}
