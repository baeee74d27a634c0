//! A registered client: one connection, one authenticated user, and the
//! course memberships captured when it connected.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{ConnectionId, CourseId, UserId};
use crate::domain::notification::Notification;

use super::connection::Connection;

/// One authenticated, registered connection.
///
/// The topic set is a snapshot. Membership changes after connect only take
/// effect on reconnect.
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    user_id: UserId,
    courses: Arc<HashSet<CourseId>>,
}

impl Client {
    pub fn new(connection: Connection, user_id: UserId, courses: HashSet<CourseId>) -> Self {
        Self {
            connection,
            user_id,
            courses: Arc::new(courses),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn courses(&self) -> &HashSet<CourseId> {
        &self.courses
    }

    /// Whether the course was in the snapshot taken at connect time.
    pub fn is_subscribed(&self, course_id: &CourseId) -> bool {
        self.courses.contains(course_id)
    }

    /// Notification routing: the client's user is an explicit recipient.
    pub fn wants_notification(&self, notification: &Notification) -> bool {
        wants_notification(&self.user_id, notification)
    }

    /// Chat routing: subscribed to the course and not the author.
    pub fn wants_chat(&self, message: &ChatMessage) -> bool {
        wants_chat(&self.user_id, &self.courses, message)
    }
}

pub(crate) fn wants_notification(user_id: &UserId, notification: &Notification) -> bool {
    notification.is_recipient(user_id)
}

/// Every device of the author is excluded, not just the sending connection.
pub(crate) fn wants_chat(
    user_id: &UserId,
    courses: &HashSet<CourseId>,
    message: &ChatMessage,
) -> bool {
    courses.contains(&message.course_id) && user_id != &message.from_id
}
