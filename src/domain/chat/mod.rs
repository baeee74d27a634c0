//! Course-scoped chat.

mod message;

pub use message::{ChatMessage, FrameKind};
