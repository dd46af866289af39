//! Trigger context carried from the call sites into the fan-out pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use semt_core::{AppError, AppResult};

use super::severity::Severity;
use crate::job::JobPriority;
use crate::notification::NotificationKind;

/// The business event kind that requires notifying other users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// A neighbourhood event/incident report.
    Report,
    /// A user followed another user.
    Follow,
    /// A direct message was sent in a conversation.
    Message,
    /// An admin broadcast to one or all users.
    Broadcast,
}

/// Everything the fan-out pipeline needs to know about one trigger.
///
/// Ephemeral — never persisted as its own entity. It travels from the
/// call site through the job queue as a JSON payload and dies after the
/// pipeline runs. `source_ref` identifies the triggering business row
/// and doubles as the idempotency key for the written records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerContext {
    /// The user whose action caused the trigger. Always excluded from
    /// the audience.
    pub actor_id: Uuid,
    /// Trigger kind.
    pub kind: TriggerKind,
    /// Report severity tier. Required for reports, absent otherwise.
    pub severity: Option<Severity>,
    /// Geographic scope: city. Required for reports.
    pub city: Option<String>,
    /// Geographic scope: district within the city.
    pub district: Option<String>,
    /// Topical category for interest matching (normal-severity reports).
    pub category: Option<String>,
    /// Follow target or broadcast target.
    pub target_user_id: Option<Uuid>,
    /// Conversation whose members receive a message trigger.
    pub conversation_id: Option<Uuid>,
    /// Human-readable notification title.
    pub title: String,
    /// Human-readable notification body.
    pub body: String,
    /// Extra payload merged into each record's client data.
    pub data: Option<serde_json::Value>,
    /// Identifier of the triggering business row.
    pub source_ref: Uuid,
}

impl TriggerContext {
    /// Build a report trigger.
    #[allow(clippy::too_many_arguments)]
    pub fn report(
        actor_id: Uuid,
        severity: Severity,
        city: impl Into<String>,
        district: Option<String>,
        category: Option<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        source_ref: Uuid,
    ) -> Self {
        Self {
            actor_id,
            kind: TriggerKind::Report,
            severity: Some(severity),
            city: Some(city.into()),
            district,
            category,
            target_user_id: None,
            conversation_id: None,
            title: title.into(),
            body: body.into(),
            data: None,
            source_ref,
        }
    }

    /// Build a follow trigger targeting the followed user.
    pub fn follow(
        actor_id: Uuid,
        followed_user_id: Uuid,
        title: impl Into<String>,
        body: impl Into<String>,
        source_ref: Uuid,
    ) -> Self {
        Self {
            actor_id,
            kind: TriggerKind::Follow,
            severity: None,
            city: None,
            district: None,
            category: None,
            target_user_id: Some(followed_user_id),
            conversation_id: None,
            title: title.into(),
            body: body.into(),
            data: None,
            source_ref,
        }
    }

    /// Build a direct-message trigger for a conversation.
    pub fn message(
        actor_id: Uuid,
        conversation_id: Uuid,
        title: impl Into<String>,
        body: impl Into<String>,
        source_ref: Uuid,
    ) -> Self {
        Self {
            actor_id,
            kind: TriggerKind::Message,
            severity: None,
            city: None,
            district: None,
            category: None,
            target_user_id: None,
            conversation_id: Some(conversation_id),
            title: title.into(),
            body: body.into(),
            data: None,
            source_ref,
        }
    }

    /// Build an admin broadcast trigger. Without a target user the
    /// broadcast reaches every active account.
    pub fn broadcast(
        actor_id: Uuid,
        target_user_id: Option<Uuid>,
        title: impl Into<String>,
        body: impl Into<String>,
        source_ref: Uuid,
    ) -> Self {
        Self {
            actor_id,
            kind: TriggerKind::Broadcast,
            severity: None,
            city: None,
            district: None,
            category: None,
            target_user_id,
            conversation_id: None,
            title: title.into(),
            body: body.into(),
            data: None,
            source_ref,
        }
    }

    /// Attach extra client payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Validate the context before any resolution or writes.
    ///
    /// A malformed trigger is rejected here so that no records exist for
    /// it anywhere.
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("Trigger title must not be empty"));
        }
        match self.kind {
            TriggerKind::Report => {
                let severity = self
                    .severity
                    .ok_or_else(|| AppError::validation("Report trigger requires a severity"))?;
                if self.city.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    return Err(AppError::validation("Report trigger requires a city"));
                }
                if severity == Severity::Normal
                    && self.district.is_none()
                    && self.category.is_none()
                {
                    return Err(AppError::validation(
                        "Normal-severity report requires a district or a category",
                    ));
                }
                Ok(())
            }
            TriggerKind::Follow => self
                .target_user_id
                .map(|_| ())
                .ok_or_else(|| AppError::validation("Follow trigger requires a target user")),
            TriggerKind::Message => self
                .conversation_id
                .map(|_| ())
                .ok_or_else(|| AppError::validation("Message trigger requires a conversation")),
            TriggerKind::Broadcast => Ok(()),
        }
    }

    /// The notification kind written for this trigger.
    pub fn notification_kind(&self) -> NotificationKind {
        match self.kind {
            TriggerKind::Report => NotificationKind::Event,
            TriggerKind::Follow => NotificationKind::Follow,
            TriggerKind::Message => NotificationKind::Message,
            TriggerKind::Broadcast => NotificationKind::System,
        }
    }

    /// Queue priority for the fan-out job, derived from the severity tier.
    pub fn job_priority(&self) -> JobPriority {
        match self.severity {
            Some(Severity::Critical) => JobPriority::Critical,
            Some(Severity::High) => JobPriority::High,
            Some(Severity::Normal) | None => JobPriority::Normal,
            Some(Severity::Low) => JobPriority::Low,
        }
    }

    /// The structured payload embedded in each record and push message,
    /// carrying the minimal identifiers for client-side deep-linking.
    pub fn client_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "kind": self.notification_kind().as_str(),
            "source_ref": self.source_ref,
            "actor_id": self.actor_id,
        });
        if let Some(conversation_id) = self.conversation_id {
            payload["conversation_id"] = serde_json::json!(conversation_id);
        }
        if let Some(extra) = &self.data
            && let (Some(obj), Some(extra_obj)) = (payload.as_object_mut(), extra.as_object())
        {
            for (k, v) in extra_obj {
                obj.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_requires_severity_and_city() {
        let mut trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::High,
            "Trabzon",
            Some("Ortahisar".to_string()),
            None,
            "Water outage",
            "Scheduled maintenance",
            Uuid::new_v4(),
        );
        assert!(trigger.validate().is_ok());

        trigger.severity = None;
        assert!(trigger.validate().is_err());

        trigger.severity = Some(Severity::High);
        trigger.city = None;
        assert!(trigger.validate().is_err());
    }

    #[test]
    fn test_normal_report_needs_district_or_category() {
        let mut trigger = TriggerContext::report(
            Uuid::new_v4(),
            Severity::Normal,
            "Trabzon",
            None,
            None,
            "Street market",
            "Opens Saturday",
            Uuid::new_v4(),
        );
        assert!(trigger.validate().is_err());

        trigger.category = Some("market".to_string());
        assert!(trigger.validate().is_ok());

        trigger.category = None;
        trigger.district = Some("Ortahisar".to_string());
        assert!(trigger.validate().is_ok());
    }

    #[test]
    fn test_follow_requires_target() {
        let trigger = TriggerContext::follow(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "New follower",
            "",
            Uuid::new_v4(),
        );
        assert!(trigger.validate().is_ok());

        let mut missing = trigger.clone();
        missing.target_user_id = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_kind_mapping() {
        let actor = Uuid::new_v4();
        let source = Uuid::new_v4();
        assert_eq!(
            TriggerContext::broadcast(actor, None, "Maintenance", "", source).notification_kind(),
            NotificationKind::System
        );
        assert_eq!(
            TriggerContext::message(actor, Uuid::new_v4(), "New message", "", source)
                .notification_kind(),
            NotificationKind::Message
        );
    }

    #[test]
    fn test_priority_follows_severity() {
        let actor = Uuid::new_v4();
        let source = Uuid::new_v4();
        let critical = TriggerContext::report(
            actor,
            Severity::Critical,
            "Trabzon",
            None,
            None,
            "t",
            "b",
            source,
        );
        assert_eq!(critical.job_priority(), JobPriority::Critical);

        let follow = TriggerContext::follow(actor, Uuid::new_v4(), "t", "b", source);
        assert_eq!(follow.job_priority(), JobPriority::Normal);
    }

    #[test]
    fn test_client_payload_merges_extra_data() {
        let trigger = TriggerContext::message(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "New message",
            "hey",
            Uuid::new_v4(),
        )
        .with_data(serde_json::json!({ "preview": "hey" }));

        let payload = trigger.client_payload();
        assert_eq!(payload["kind"], "message");
        assert_eq!(payload["preview"], "hey");
        assert!(payload.get("conversation_id").is_some());
    }
}
