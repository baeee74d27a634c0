//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the classroom hub.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::AuthError;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConnectionId, CourseId, MessageId, NotificationId, UserId};
pub use timestamp::Timestamp;
