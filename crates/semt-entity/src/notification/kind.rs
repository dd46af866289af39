//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a notification record, used for client-side routing and the
/// per-trigger uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A neighbourhood event or incident report.
    Event,
    /// Someone started following the recipient.
    Follow,
    /// A new direct message.
    Message,
    /// System or admin broadcast.
    System,
    /// Ride-share reservation updates.
    Reservation,
    /// Local football match announcements.
    Football,
}

impl NotificationKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Follow => "follow",
            Self::Message => "message",
            Self::System => "system",
            Self::Reservation => "reservation",
            Self::Football => "football",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = semt_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "event" => Ok(Self::Event),
            "follow" => Ok(Self::Follow),
            "message" => Ok(Self::Message),
            "system" => Ok(Self::System),
            "reservation" => Ok(Self::Reservation),
            "football" => Ok(Self::Football),
            _ => Err(semt_core::AppError::validation(format!(
                "Invalid notification kind: '{s}'"
            ))),
        }
    }
}
