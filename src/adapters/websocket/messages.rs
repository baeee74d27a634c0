//! WebSocket wire format.
//!
//! Defines the JSON protocol between the hub and connected clients:
//! - Client → Server: chat candidates
//! - Server → Client: enriched chat messages, notifications
//!
//! Domain types never go on the wire directly. Recipient lists in
//! particular stay server-side.

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::chat::{ChatMessage, FrameKind};
use crate::domain::course::UserProfile;
use crate::domain::foundation::{CourseId, MessageId, NotificationId, Timestamp};
use crate::domain::notification::{Notification, NotificationType};

// ============================================
// Client → Server Messages
// ============================================

/// A structured inbound frame.
///
/// Only `chat_message` frames carry content; every other `type` decodes to
/// [`FrameKind::Unknown`] and is ignored by the inbound processor.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    #[serde(rename = "type")]
    pub kind: FrameKind,

    #[serde(default)]
    pub course_id: String,

    #[serde(default)]
    pub text: String,
}

// ============================================
// Server → Client Messages
// ============================================

/// A persisted chat message as delivered to course members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageFrame {
    #[serde(rename = "type")]
    pub kind: FrameKind,
    pub id: Option<MessageId>,
    pub course_id: CourseId,
    pub sender: Option<UserProfile>,
    pub text: String,
    pub timestamp: Option<Timestamp>,
}

impl From<&ChatMessage> for ChatMessageFrame {
    fn from(message: &ChatMessage) -> Self {
        Self {
            kind: FrameKind::ChatMessage,
            id: message.id,
            course_id: message.course_id.clone(),
            sender: message.sender.clone(),
            text: message.content.clone(),
            timestamp: message.timestamp,
        }
    }
}

/// A notification as delivered to one of its recipients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationFrame {
    /// Empty string until the notification has been persisted.
    #[serde(
        serialize_with = "serialize_notification_id",
        deserialize_with = "deserialize_notification_id"
    )]
    pub id: Option<NotificationId>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(rename = "classId")]
    pub class_id: CourseId,
    pub message: String,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
    pub read: bool,
}

impl From<&Notification> for NotificationFrame {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type,
            class_id: notification.course_id.clone(),
            message: notification.message.clone(),
            data: notification.data.clone(),
            timestamp: notification.timestamp,
            read: notification.read,
        }
    }
}

fn serialize_notification_id<S>(id: &Option<NotificationId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(id) => id.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_notification_id<'de, D>(deserializer: D) -> Result<Option<NotificationId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.is_empty() {
        return Ok(None);
    }
    let raw: serde::de::value::StringDeserializer<D::Error> = raw.into_deserializer();
    NotificationId::deserialize(raw).map(Some)
}
