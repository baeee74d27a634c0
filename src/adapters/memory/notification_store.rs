//! In-Memory Notification Store Adapter

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, NotificationId, UserId};
use crate::domain::notification::Notification;
use crate::ports::NotificationStore;

/// Notifications kept by [`InMemoryNotificationStore::new`].
pub const DEFAULT_MAX_NOTIFICATIONS: usize = 10_000;

/// Keeps the most recent notifications in memory, in creation order.
///
/// Once `capacity` is reached the oldest notifications are evicted, so
/// history for long-running processes is partial. Deployments that need
/// full history plug in a durable [`NotificationStore`].
#[derive(Debug)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<VecDeque<Notification>>,
    capacity: usize,
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_NOTIFICATIONS)
    }
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `capacity` notifications (minimum one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            notifications: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Get the number of stored notifications
    pub async fn count(&self) -> usize {
        self.notifications.read().await.len()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create_notifications(
        &self,
        notifications: Vec<Notification>,
    ) -> Result<Vec<Notification>, DomainError> {
        let created: Vec<Notification> = notifications
            .into_iter()
            .map(|mut n| {
                n.id = Some(NotificationId::new());
                n
            })
            .collect();

        let mut notifications = self.notifications.write().await;
        notifications.extend(created.iter().cloned());
        let overflow = notifications.len().saturating_sub(self.capacity);
        notifications.drain(..overflow);
        Ok(created)
    }

    async fn notifications_for(&self, user_id: &UserId) -> Result<Vec<Notification>, DomainError> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.is_recipient(user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;
    use crate::domain::notification::NotificationType;

    fn notification(message: &str, recipients: &[&str]) -> Notification {
        Notification::new(
            NotificationType::PostCreated,
            CourseId::new("c1").unwrap(),
            recipients.iter().map(|r| UserId::new(*r).unwrap()).collect(),
            message,
        )
    }

    #[tokio::test]
    async fn create_assigns_ids_in_input_order() {
        let store = InMemoryNotificationStore::new();
        let created = store
            .create_notifications(vec![notification("a", &["u1"]), notification("b", &["u2"])])
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|n| n.id.is_some()));
        assert_ne!(created[0].id, created[1].id);
        assert_eq!(created[0].message, "a");
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn notifications_for_returns_newest_first() {
        let store = InMemoryNotificationStore::new();
        store
            .create_notifications(vec![notification("old", &["u1"])])
            .await
            .unwrap();
        store
            .create_notifications(vec![notification("other", &["u2"]), notification("new", &["u1"])])
            .await
            .unwrap();

        let mine = store
            .notifications_for(&UserId::new("u1").unwrap())
            .await
            .unwrap();
        let messages: Vec<&str> = mine.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn oldest_notifications_are_evicted_at_capacity() {
        let store = InMemoryNotificationStore::with_capacity(3);
        for message in ["1", "2", "3", "4", "5"] {
            store
                .create_notifications(vec![notification(message, &["u1"])])
                .await
                .unwrap();
        }

        assert_eq!(store.count().await, 3);
        let mine = store
            .notifications_for(&UserId::new("u1").unwrap())
            .await
            .unwrap();
        let messages: Vec<&str> = mine.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["5", "4", "3"]);
    }

    #[tokio::test]
    async fn oversized_batch_is_returned_whole_but_trimmed_in_storage() {
        let store = InMemoryNotificationStore::with_capacity(2);
        let created = store
            .create_notifications(vec![
                notification("a", &["u1"]),
                notification("b", &["u1"]),
                notification("c", &["u1"]),
            ])
            .await
            .unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(store.count().await, 2);
    }
}
