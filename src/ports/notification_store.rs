//! Notification store port.
//!
//! Persists notifications before they reach the hub so that offline users
//! find them later. The store assigns ids.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::notification::Notification;

/// Persistence for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Store a batch and return it with ids assigned, in input order.
    async fn create_notifications(
        &self,
        notifications: Vec<Notification>,
    ) -> Result<Vec<Notification>, DomainError>;

    /// Notifications addressed to `user_id`, newest first.
    async fn notifications_for(&self, user_id: &UserId) -> Result<Vec<Notification>, DomainError>;
}
