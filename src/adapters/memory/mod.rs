//! In-memory adapters for the directory, chat and notification ports.
//!
//! Suitable for development and tests. A relational backend would replace
//! these behind the same ports.

mod chat_store;
mod course_directory;
mod notification_store;

pub use chat_store::InMemoryChatStore;
pub use course_directory::{CourseSeed, DirectorySeed, InMemoryCourseDirectory};
pub use notification_store::{InMemoryNotificationStore, DEFAULT_MAX_NOTIFICATIONS};
