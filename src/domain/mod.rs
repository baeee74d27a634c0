//! Domain layer containing the hub's vocabulary.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, timestamps, errors)
//! - `course` - User profiles and course roles
//! - `chat` - Course-scoped chat messages
//! - `notification` - Targeted notifications and the events producing them

pub mod chat;
pub mod course;
pub mod foundation;
pub mod notification;
