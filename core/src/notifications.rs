//! Notification payload types carried over the push channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub uuid::Uuid);

impl NotificationId {
    /// Generate a new random `NotificationId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

/// One unread notification as delivered on the push channel.
///
/// The shape of the business payload beyond these fields is owned by the
/// server; presentation receives the snapshot through
/// [`SessionEvent::NotificationReceived`](crate::events::SessionEvent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,

    /// Short headline shown in the notification list.
    pub title: String,

    /// Longer description, may be empty.
    #[serde(default)]
    pub body: String,

    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}
