//! Topic membership resolver port.
//!
//! Called once per connection, right after authentication. The returned set
//! is the client's chat topic snapshot for the lifetime of the connection;
//! membership changes elsewhere only take effect on reconnect.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Resolves the courses a user may receive chat for.
#[async_trait]
pub trait TopicMembershipResolver: Send + Sync {
    /// Returns every course the user is currently a member of.
    ///
    /// An unknown user is not an error: it simply has no courses.
    async fn course_ids_for(&self, user_id: &UserId) -> Result<HashSet<CourseId>, DomainError>;
}
