//! Business events handed to a notifier.

use crate::domain::course::CourseRole;
use crate::domain::foundation::{CourseId, UserId};

use super::NotificationType;

/// Something happened in a course that some users should hear about.
///
/// A notifier resolves recipients and wording, producing zero or more
/// [`Notification`](super::Notification)s per event.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    /// A member published a post.
    PostCreated {
        course_id: CourseId,
        creator_id: UserId,
        content: String,
    },

    /// A member commented on a post. `participant_ids` are the post author
    /// and every previous commenter, in thread order, possibly repeated.
    CommentAdded {
        course_id: CourseId,
        post_id: String,
        comment_id: String,
        commenter_id: UserId,
        post_author_id: UserId,
        participant_ids: Vec<UserId>,
        data: serde_json::Value,
    },

    /// A chat message was accepted and broadcast.
    MessageSent {
        course_id: CourseId,
        sender_id: UserId,
        content: String,
    },

    /// A member's role was changed by a course admin.
    RoleChanged {
        course_id: CourseId,
        user_id: UserId,
        role: CourseRole,
    },

    /// A member was removed from the course.
    UserKicked {
        course_id: CourseId,
        admin_id: UserId,
        user_id: UserId,
        data: serde_json::Value,
    },
}

impl NotificationEvent {
    /// Course the event happened in.
    pub fn course_id(&self) -> &CourseId {
        match self {
            NotificationEvent::PostCreated { course_id, .. }
            | NotificationEvent::CommentAdded { course_id, .. }
            | NotificationEvent::MessageSent { course_id, .. }
            | NotificationEvent::RoleChanged { course_id, .. }
            | NotificationEvent::UserKicked { course_id, .. } => course_id,
        }
    }

    /// Kind of notification this event produces.
    pub fn notification_type(&self) -> NotificationType {
        match self {
            NotificationEvent::PostCreated { .. } => NotificationType::PostCreated,
            NotificationEvent::CommentAdded { .. } => NotificationType::CommentAdded,
            NotificationEvent::MessageSent { .. } => NotificationType::MessageSent,
            NotificationEvent::RoleChanged { .. } => NotificationType::RoleChanged,
            NotificationEvent::UserKicked { .. } => NotificationType::UserKicked,
        }
    }
}
