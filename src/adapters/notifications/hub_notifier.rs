//! Notifier that resolves recipients from the course directory, persists
//! the result and pushes it through the hub.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::adapters::websocket::HubHandle;
use crate::domain::course::CourseRole;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::notification::{Notification, NotificationEvent};
use crate::ports::{CourseDirectory, NotificationStore, Notifier};

/// `Notifier` backed by the live hub.
pub struct HubNotifier {
    hub: HubHandle,
    directory: Arc<dyn CourseDirectory>,
    store: Arc<dyn NotificationStore>,
}

impl HubNotifier {
    pub fn new(
        hub: HubHandle,
        directory: Arc<dyn CourseDirectory>,
        store: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            hub,
            directory,
            store,
        }
    }

    /// Resolve recipients and wording for `event`.
    pub async fn build(&self, event: &NotificationEvent) -> Result<Vec<Notification>, DomainError> {
        let course_id = event.course_id();
        let kind = event.notification_type();
        let course_name = self.directory.course_name(course_id).await?;

        let notification = match event {
            NotificationEvent::PostCreated {
                creator_id,
                content,
                ..
            } => {
                let members = self.directory.members(course_id).await?;
                let creator = members
                    .iter()
                    .find(|m| &m.id == creator_id)
                    .ok_or_else(|| user_not_found(creator_id))?;
                let recipients = members
                    .iter()
                    .filter(|m| &m.id != creator_id)
                    .map(|m| m.id.clone())
                    .collect();

                Notification::new(
                    kind,
                    course_id.clone(),
                    recipients,
                    format!("New post in {} by {}", course_name, creator.full_name()),
                )
                .with_data(json!({ "creatorId": creator_id, "content": content }))
            }

            NotificationEvent::CommentAdded {
                commenter_id,
                post_author_id,
                participant_ids,
                data,
                ..
            } => {
                let commenter = self.directory.user(commenter_id).await?;
                let author = self.directory.user(post_author_id).await?;

                let mut data = data.clone();
                if let Some(object) = data.as_object_mut() {
                    let profile = serde_json::to_value(&commenter).map_err(serialization_failed)?;
                    object.insert("user".to_string(), profile);
                }

                Notification::new(
                    kind,
                    course_id.clone(),
                    comment_recipients(participant_ids, commenter_id),
                    format!(
                        "{} {} just commented on {} {}'s post in \"{}\". Check out the discussion!",
                        commenter.first_name,
                        commenter.last_name,
                        author.first_name,
                        author.last_name,
                        course_name
                    ),
                )
                .with_data(data)
            }

            NotificationEvent::MessageSent {
                sender_id, content, ..
            } => {
                let sender = self.directory.user(sender_id).await?;
                let recipients = self
                    .directory
                    .members(course_id)
                    .await?
                    .into_iter()
                    .filter(|m| &m.id != sender_id)
                    .map(|m| m.id)
                    .collect();

                Notification::new(
                    kind,
                    course_id.clone(),
                    recipients,
                    format!("New message in \"{}\" from {}", course_name, sender.full_name()),
                )
                .with_data(json!({
                    "courseId": course_id,
                    "senderId": sender_id,
                    "content": content,
                }))
            }

            NotificationEvent::RoleChanged { user_id, role, .. } => {
                self.directory.user(user_id).await?;

                Notification::new(
                    kind,
                    course_id.clone(),
                    vec![user_id.clone()],
                    role_message(*role, &course_name),
                )
                .with_data(json!({ "role": role }))
            }

            NotificationEvent::UserKicked { user_id, data, .. } => {
                self.directory.user(user_id).await?;

                Notification::new(
                    kind,
                    course_id.clone(),
                    vec![user_id.clone()],
                    format!("You have been kicked out from the class \"{}\"", course_name),
                )
                .with_data(data.clone())
            }
        };

        Ok(vec![notification])
    }
}

#[async_trait]
impl Notifier for HubNotifier {
    async fn notify(&self, event: NotificationEvent) -> Result<(), DomainError> {
        let notifications = self.build(&event).await?;
        let created = self.store.create_notifications(notifications).await?;

        for notification in created {
            tracing::debug!(
                notification_type = %notification.notification_type,
                course_id = %notification.course_id,
                recipients = notification.recipient_ids.len(),
                "Publishing notification"
            );
            self.hub.notify(notification).await.map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to publish notification: {}", e),
                )
            })?;
        }

        Ok(())
    }
}

/// Thread participants, first occurrence only, without the commenter.
fn comment_recipients(participants: &[UserId], commenter_id: &UserId) -> Vec<UserId> {
    let mut seen = HashSet::new();
    participants
        .iter()
        .filter(|id| *id != commenter_id && seen.insert(*id))
        .cloned()
        .collect()
}

fn role_message(role: CourseRole, course_name: &str) -> String {
    match role {
        CourseRole::Member => {
            format!("You have been assigned as a member of the course \"{}\".", course_name)
        }
        CourseRole::Moderator => {
            format!("You have been promoted to moderator in the course \"{}\".", course_name)
        }
        CourseRole::Instructor => format!(
            "You have been appointed as an instructor for the course \"{}\".",
            course_name
        ),
        CourseRole::Admin => {
            format!("You have been designated as the admin of the course \"{}\".", course_name)
        }
    }
}

fn user_not_found(user_id: &UserId) -> DomainError {
    DomainError::new(
        ErrorCode::UserNotFound,
        format!("User with id {} not found", user_id),
    )
}

fn serialization_failed(err: serde_json::Error) -> DomainError {
    DomainError::new(ErrorCode::InternalError, format!("Failed to encode profile: {}", err))
}
