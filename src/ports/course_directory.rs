//! Course directory port: read access to courses, rosters and profiles.
//!
//! The notifier uses it to resolve recipients and to word messages; chat
//! persistence uses it to resolve the sender of a message.

use async_trait::async_trait;

use crate::domain::course::UserProfile;
use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Read-only lookup of course names, rosters and user profiles.
///
/// # Contract
///
/// - `course_name` / `members` return `ErrorCode::CourseNotFound` for
///   unknown courses
/// - `user` returns `ErrorCode::UserNotFound` for unknown users
#[async_trait]
pub trait CourseDirectory: Send + Sync {
    /// Display name of a course.
    async fn course_name(&self, course_id: &CourseId) -> Result<String, DomainError>;

    /// Profiles of every member of a course, in join order.
    async fn members(&self, course_id: &CourseId) -> Result<Vec<UserProfile>, DomainError>;

    /// Profile of a single user.
    async fn user(&self, user_id: &UserId) -> Result<UserProfile, DomainError>;

    /// Whether `user_id` currently belongs to `course_id`.
    async fn is_member(&self, course_id: &CourseId, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self
            .members(course_id)
            .await?
            .iter()
            .any(|member| &member.id == user_id))
    }
}
