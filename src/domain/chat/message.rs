//! Chat message flowing from one course member to the rest of the course.

use serde::{Deserialize, Serialize};

use crate::domain::course::UserProfile;
use crate::domain::foundation::{CourseId, MessageId, Timestamp, UserId};

/// Discriminator carried by every inbound frame.
///
/// Only [`FrameKind::ChatMessage`] is chat content. Anything else a client
/// sends decodes as [`FrameKind::Unknown`] and is dropped by the inbound
/// processor without closing the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    ChatMessage,
    #[serde(other)]
    Unknown,
}

impl FrameKind {
    /// Returns true for frames that carry chat content.
    pub fn is_chat_content(&self) -> bool {
        matches!(self, FrameKind::ChatMessage)
    }
}

/// A chat message scoped to one course.
///
/// Starts life as a candidate built from an inbound frame (no id, no
/// sender profile) and is enriched by the chat persistence collaborator
/// before the hub broadcasts it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    /// Assigned on persistence.
    pub id: Option<MessageId>,
    pub course_id: CourseId,
    /// Authenticated author. Never taken from client input.
    pub from_id: UserId,
    /// Resolved on persistence.
    pub sender: Option<UserProfile>,
    pub content: String,
    /// Stamped on persistence when absent.
    pub timestamp: Option<Timestamp>,
}

impl ChatMessage {
    /// Creates an unpersisted candidate message.
    pub fn new(course_id: CourseId, from_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: None,
            course_id,
            from_id,
            sender: None,
            content: content.into(),
            timestamp: None,
        }
    }

    /// True once persistence has assigned an id and resolved the sender.
    pub fn is_enriched(&self) -> bool {
        self.id.is_some() && self.sender.is_some()
    }
}
