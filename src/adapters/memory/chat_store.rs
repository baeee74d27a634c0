//! In-Memory Chat Store Adapter
//!
//! Validates, enriches and keeps chat messages in memory. Sender profiles
//! and course membership come from a `CourseDirectory`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, MessageId, Timestamp, UserId};
use crate::ports::{ChatPersistence, CourseDirectory};

/// In-memory chat history backed by a course directory.
pub struct InMemoryChatStore {
    directory: Arc<dyn CourseDirectory>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryChatStore {
    pub fn new(directory: Arc<dyn CourseDirectory>) -> Self {
        Self {
            directory,
            messages: RwLock::new(Vec::new()),
        }
    }

    /// Chat history of a course, oldest first.
    ///
    /// Only members of the course may read it.
    pub async fn messages_for_course(
        &self,
        course_id: &CourseId,
        requester: &UserId,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        if !self.directory.is_member(course_id, requester).await? {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only course members can read its chat",
            ));
        }

        let mut history: Vec<ChatMessage> = self
            .messages
            .read()
            .await
            .iter()
            .filter(|m| &m.course_id == course_id)
            .cloned()
            .collect();
        history.sort_by_key(|m| m.timestamp);
        Ok(history)
    }

    /// Get the number of stored messages
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

#[async_trait]
impl ChatPersistence for InMemoryChatStore {
    async fn process_chat_message(&self, message: &mut ChatMessage) -> Result<(), DomainError> {
        if message.content.trim().is_empty() {
            return Err(DomainError::validation("text", "Message content is required"));
        }

        if !self
            .directory
            .is_member(&message.course_id, &message.from_id)
            .await?
        {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Sender is not a member of this course",
            )
            .with_detail("course_id", message.course_id.as_str())
            .with_detail("from_id", message.from_id.as_str()));
        }

        let sender = self.directory.user(&message.from_id).await?;

        message.id = Some(MessageId::new());
        message.timestamp.get_or_insert_with(Timestamp::now);
        message.sender = Some(sender);

        self.messages.write().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCourseDirectory;
    use crate::domain::course::UserProfile;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn course(id: &str) -> CourseId {
        CourseId::new(id).unwrap()
    }

    fn store() -> InMemoryChatStore {
        let directory = InMemoryCourseDirectory::new()
            .with_user(UserProfile::new(user("alice"), "a@x.io", "alice", "Alice", "Liddell"))
            .with_user(UserProfile::new(user("bob"), "b@x.io", "bob", "Bob", "Builder"))
            .with_course(course("c1"), "Algebra")
            .with_member(&course("c1"), &user("alice"));
        InMemoryChatStore::new(Arc::new(directory))
    }

    #[tokio::test]
    async fn accepted_message_is_enriched_and_stored() {
        let store = store();
        let mut msg = ChatMessage::new(course("c1"), user("alice"), "hello");

        store.process_chat_message(&mut msg).await.unwrap();

        assert!(msg.is_enriched());
        assert_eq!(msg.sender.as_ref().unwrap().first_name, "Alice");
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn existing_timestamp_is_kept() {
        let store = store();
        let stamp = Timestamp::now();
        let mut msg = ChatMessage::new(course("c1"), user("alice"), "hello");
        msg.timestamp = Some(stamp);

        store.process_chat_message(&mut msg).await.unwrap();
        assert_eq!(msg.timestamp, Some(stamp));
    }

    #[tokio::test]
    async fn blank_content_is_rejected() {
        let store = store();
        let mut msg = ChatMessage::new(course("c1"), user("alice"), "   ");
        let err = store.process_chat_message(&mut msg).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(store.message_count().await, 0);
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let store = store();
        let mut msg = ChatMessage::new(course("c1"), user("bob"), "hello");
        let err = store.process_chat_message(&mut msg).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn history_is_members_only_and_oldest_first() {
        let store = store();
        for text in ["one", "two"] {
            let mut msg = ChatMessage::new(course("c1"), user("alice"), text);
            store.process_chat_message(&mut msg).await.unwrap();
        }

        let history = store
            .messages_for_course(&course("c1"), &user("alice"))
            .await
            .unwrap();
        let texts: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);

        let err = store
            .messages_for_course(&course("c1"), &user("bob"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
