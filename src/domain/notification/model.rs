//! Notification routed to an explicit recipient list.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CourseId, NotificationId, Timestamp, UserId};

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    PostCreated,
    CommentAdded,
    MessageSent,
    RoleChanged,
    UserKicked,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationType::PostCreated => "post_created",
            NotificationType::CommentAdded => "comment_added",
            NotificationType::MessageSent => "message_sent",
            NotificationType::RoleChanged => "role_changed",
            NotificationType::UserKicked => "user_kicked",
        };
        write!(f, "{}", s)
    }
}

/// Outbound notification event.
///
/// Delivery is by `recipient_ids`, not by course: `course_id` is
/// informational. An empty recipient list is legal and reaches nobody.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Assigned by the notification store. `None` when persistence was
    /// skipped upstream; the hub treats it as opaque either way.
    pub id: Option<NotificationId>,
    pub notification_type: NotificationType,
    pub course_id: CourseId,
    /// Internal routing key. Never serialized to the wire.
    pub recipient_ids: Vec<UserId>,
    pub message: String,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
    pub read: bool,
}

impl Notification {
    /// Creates an unpersisted, unread notification stamped now.
    pub fn new(
        notification_type: NotificationType,
        course_id: CourseId,
        recipient_ids: Vec<UserId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            notification_type,
            course_id,
            recipient_ids,
            message: message.into(),
            data: serde_json::Value::Null,
            timestamp: Timestamp::now(),
            read: false,
        }
    }

    /// Attaches a type-specific payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Returns true if `user_id` is on the recipient list.
    pub fn is_recipient(&self, user_id: &UserId) -> bool {
        self.recipient_ids.iter().any(|id| id == user_id)
    }
}
