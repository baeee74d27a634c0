//! Notifier port.
//!
//! Turns a business event into zero or more notifications with resolved
//! recipients and pushes them to the hub. Callers run it off their own
//! request path: pushing blocks while the hub's notification channel is
//! full.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::notification::NotificationEvent;

/// Publishes notifications for business events.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Resolve, persist and publish the notifications for `event`.
    async fn notify(&self, event: NotificationEvent) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, UserId};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<NotificationEvent>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, event: NotificationEvent) -> Result<(), DomainError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[tokio::test]
    async fn notifier_receives_events() {
        let notifier = RecordingNotifier::default();
        notifier
            .notify(NotificationEvent::MessageSent {
                course_id: CourseId::new("c1").unwrap(),
                sender_id: UserId::new("u1").unwrap(),
                content: "hi".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(notifier.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn notifier_is_object_safe_and_send_sync() {
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn Notifier>>();
    }
}
