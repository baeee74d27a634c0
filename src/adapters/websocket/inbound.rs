//! Inbound frame processing.
//!
//! Runs for the lifetime of a connection and turns peer frames into hub
//! traffic:
//!
//! 1. Decode the frame, ignoring anything but `chat_message`
//! 2. Check the course against the client's topic snapshot
//! 3. Persist and enrich through [`ChatPersistence`]
//! 4. Hand the persisted message to the hub for fan-out
//! 5. Fire a `MessageSent` notification in the background
//!
//! Rejections at any step drop the frame and keep the connection open.
//! Only read failures end the loop.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{CourseId, DomainError};
use crate::domain::notification::NotificationEvent;
use crate::ports::{ChatPersistence, Notifier};

use super::client::Client;
use super::connection::{ConnectionError, Frame, FrameStream};
use super::hub::{HubError, HubHandle};
use super::liveness::ReadDeadline;
use super::messages::ClientFrame;

/// Why an inbound frame was dropped.
#[derive(Debug, Error)]
pub enum InboundRejection {
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Unsupported frame type")]
    UnsupportedKind,

    #[error("Not subscribed to course {0}")]
    NotSubscribed(CourseId),

    #[error("Chat message rejected: {0}")]
    Persistence(#[from] DomainError),

    #[error("Broadcast failed: {0}")]
    Hub(#[from] HubError),
}

/// Processes chat frames from connected clients.
#[derive(Clone)]
pub struct InboundProcessor {
    hub: HubHandle,
    chat: Arc<dyn ChatPersistence>,
    notifier: Arc<dyn Notifier>,
}

impl InboundProcessor {
    pub fn new(hub: HubHandle, chat: Arc<dyn ChatPersistence>, notifier: Arc<dyn Notifier>) -> Self {
        Self { hub, chat, notifier }
    }

    /// Read frames from `stream` until the peer leaves, a read fails, or the
    /// connection is closed from the server side.
    ///
    /// The caller is responsible for unregistering the client afterwards.
    pub async fn run<S: FrameStream>(
        &self,
        client: &Client,
        mut stream: S,
        pong_wait: std::time::Duration,
    ) -> Result<(), ConnectionError> {
        let mut deadline = ReadDeadline::new(pong_wait);

        loop {
            let next = tokio::select! {
                next = deadline.read(&mut stream) => next,
                _ = client.connection().closed() => return Ok(()),
            };

            match next {
                None | Some(Ok(Frame::Close)) => {
                    tracing::debug!(connection_id = %client.id(), "Peer closed connection");
                    return Ok(());
                }
                Some(Err(e)) => return Err(e),
                Some(Ok(Frame::Pong(_))) => deadline.on_pong(),
                // Answered by the transport.
                Some(Ok(Frame::Ping(_))) => {}
                Some(Ok(Frame::Binary(_))) => {
                    tracing::warn!(
                        connection_id = %client.id(),
                        "Received unsupported binary message"
                    );
                }
                Some(Ok(Frame::Text(text))) => match self.handle_text(client, &text).await {
                    Ok(message) => tracing::debug!(
                        connection_id = %client.id(),
                        course_id = %message.course_id,
                        "Chat message accepted"
                    ),
                    Err(rejection) => tracing::warn!(
                        connection_id = %client.id(),
                        user_id = %client.user_id(),
                        %rejection,
                        "Inbound frame dropped"
                    ),
                },
            }
        }
    }

    /// Process one text frame from `client`.
    ///
    /// Returns the persisted message on success. The sender is always the
    /// client's authenticated user, whatever the frame claims.
    pub async fn handle_text(
        &self,
        client: &Client,
        text: &str,
    ) -> Result<ChatMessage, InboundRejection> {
        let frame: ClientFrame =
            serde_json::from_str(text).map_err(|e| InboundRejection::Malformed(e.to_string()))?;

        if !frame.kind.is_chat_content() {
            return Err(InboundRejection::UnsupportedKind);
        }

        let course_id = CourseId::new(frame.course_id)
            .map_err(|e| InboundRejection::Malformed(e.to_string()))?;

        if !client.is_subscribed(&course_id) {
            return Err(InboundRejection::NotSubscribed(course_id));
        }

        let mut message = ChatMessage::new(course_id, client.user_id().clone(), frame.text);
        self.chat.process_chat_message(&mut message).await?;

        self.hub.broadcast(message.clone()).await?;

        self.notify_in_background(NotificationEvent::MessageSent {
            course_id: message.course_id.clone(),
            sender_id: message.from_id.clone(),
            content: message.content.clone(),
        });

        Ok(message)
    }

    fn notify_in_background(&self, event: NotificationEvent) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let course_id = event.course_id().clone();
            if let Err(e) = notifier.notify(event).await {
                tracing::error!(%course_id, error = %e, "Failed to send chat notification");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::websocket::connection::testing::{scripted_stream, RecordingSink};
    use crate::adapters::websocket::connection::Connection;
    use crate::adapters::websocket::hub::Hub;
    use crate::domain::foundation::{ErrorCode, MessageId, Timestamp, UserId};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct StubChat {
        reject: bool,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl ChatPersistence for StubChat {
        async fn process_chat_message(&self, message: &mut ChatMessage) -> Result<(), DomainError> {
            if self.reject {
                return Err(DomainError::new(ErrorCode::Forbidden, "not allowed"));
            }
            message.id = Some(MessageId::new());
            message.timestamp.get_or_insert_with(Timestamp::now);
            self.seen.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubNotifier {
        events: Mutex<Vec<NotificationEvent>>,
    }

    #[async_trait]
    impl Notifier for StubNotifier {
        async fn notify(&self, event: NotificationEvent) -> Result<(), DomainError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    struct Fixture {
        processor: InboundProcessor,
        chat: Arc<StubChat>,
        notifier: Arc<StubNotifier>,
        client: Client,
        hub: HubHandle,
    }

    fn fixture(chat: StubChat) -> Fixture {
        let (hub, _task) = Hub::spawn(8, 8);
        let chat = Arc::new(chat);
        let notifier = Arc::new(StubNotifier::default());
        let processor = InboundProcessor::new(hub.clone(), chat.clone(), notifier.clone());
        let connection = Connection::open(RecordingSink::default(), 8, hub.clone());
        let courses: HashSet<CourseId> = [CourseId::new("c1").unwrap()].into_iter().collect();
        let client = Client::new(connection, UserId::new("alice").unwrap(), courses);
        Fixture {
            processor,
            chat,
            notifier,
            client,
            hub,
        }
    }

    #[tokio::test]
    async fn chat_frame_is_persisted_and_notified() {
        let f = fixture(StubChat::default());
        let msg = f
            .processor
            .handle_text(&f.client, r#"{"type":"chat_message","course_id":"c1","text":"hi"}"#)
            .await
            .unwrap();

        assert_eq!(msg.from_id.as_str(), "alice");
        assert!(msg.id.is_some());
        assert_eq!(f.chat.seen.lock().unwrap().len(), 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let events = f.notifier.events.lock().unwrap();
        assert!(matches!(
            events.as_slice(),
            [NotificationEvent::MessageSent { content, .. }] if content == "hi"
        ));
    }

    #[tokio::test]
    async fn unknown_kind_is_dropped() {
        let f = fixture(StubChat::default());
        let err = f
            .processor
            .handle_text(&f.client, r#"{"type":"typing","course_id":"c1"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, InboundRejection::UnsupportedKind));
        assert!(f.chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_dropped() {
        let f = fixture(StubChat::default());
        let err = f.processor.handle_text(&f.client, "not json").await.unwrap_err();
        assert!(matches!(err, InboundRejection::Malformed(_)));
    }

    #[tokio::test]
    async fn unsubscribed_course_is_dropped_before_persistence() {
        let f = fixture(StubChat::default());
        let err = f
            .processor
            .handle_text(&f.client, r#"{"type":"chat_message","course_id":"c9","text":"hi"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, InboundRejection::NotSubscribed(_)));
        assert!(f.chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_rejection_skips_broadcast_and_notification() {
        let f = fixture(StubChat {
            reject: true,
            ..StubChat::default()
        });
        let err = f
            .processor
            .handle_text(&f.client, r#"{"type":"chat_message","course_id":"c1","text":"hi"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, InboundRejection::Persistence(_)));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(f.notifier.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_survives_bad_frames_and_ends_on_read_error() {
        let f = fixture(StubChat::default());
        let (tx, stream) = scripted_stream();
        tx.send(Ok(Frame::Text("garbage".into()))).unwrap();
        tx.send(Ok(Frame::Text(
            r#"{"type":"chat_message","course_id":"c1","text":"hi"}"#.into(),
        )))
        .unwrap();
        tx.send(Err(ConnectionError::transport("reset"))).unwrap();

        let result = f
            .processor
            .run(&f.client, stream, Duration::from_secs(60))
            .await;

        assert!(matches!(result, Err(ConnectionError::Transport(_))));
        assert_eq!(f.chat.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_ends_when_the_connection_is_closed() {
        let f = fixture(StubChat::default());
        let (_tx, stream) = scripted_stream();
        f.hub.disconnect(f.client.connection());

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            f.processor.run(&f.client, stream, Duration::from_secs(60)),
        )
        .await
        .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_ends_when_pongs_stop() {
        let f = fixture(StubChat::default());
        let (_tx, stream) = scripted_stream();

        let result = f
            .processor
            .run(&f.client, stream, Duration::from_secs(60))
            .await;
        assert_eq!(result, Err(ConnectionError::DeadlineExceeded));
    }
}
