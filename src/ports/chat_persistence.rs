//! Chat persistence port.
//!
//! The inbound processor hands every accepted chat candidate to this port
//! before broadcasting it. Any error is a business-rule rejection: the
//! message is dropped and logged, the connection stays open.

use async_trait::async_trait;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::DomainError;

/// Validates, stores and enriches chat messages.
///
/// # Contract
///
/// On `Ok(())` the message must have:
/// - `id` assigned
/// - `timestamp` set (stamped now if the candidate had none)
/// - `sender` resolved to the full profile of `from_id`
///
/// Implementations return:
/// - `ErrorCode::ValidationFailed` for missing course, sender or content
/// - `ErrorCode::Forbidden` when the sender may not post in the course
/// - `ErrorCode::UserNotFound` when the sender profile cannot be resolved
#[async_trait]
pub trait ChatPersistence: Send + Sync {
    /// Persist `message` in place, filling in the server-assigned fields.
    async fn process_chat_message(&self, message: &mut ChatMessage) -> Result<(), DomainError>;
}
