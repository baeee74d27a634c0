//! In-Memory Course Directory Adapter
//!
//! Holds users, courses and rosters in memory. Serves both the
//! `CourseDirectory` lookups and the connect-time `TopicMembershipResolver`
//! snapshot. Can be seeded from a YAML file for development.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::course::UserProfile;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, UserId};
use crate::ports::{CourseDirectory, TopicMembershipResolver};

/// Directory contents as read from a seed file.
///
/// ```yaml
/// users:
///   - id: alice
///     email: alice@example.com
///     username: alice
///     firstName: Alice
///     lastName: Liddell
/// courses:
///   - id: algebra-101
///     name: Algebra
///     members: [alice]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub courses: Vec<CourseSeed>,
}

/// One course in a [`DirectorySeed`].
#[derive(Debug, Deserialize)]
pub struct CourseSeed {
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<UserId>,
}

#[derive(Debug)]
struct CourseRecord {
    name: String,
    /// Join order.
    members: Vec<UserId>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<UserId, UserProfile>,
    courses: HashMap<CourseId, CourseRecord>,
}

impl DirectoryState {
    fn course(&self, course_id: &CourseId) -> Result<&CourseRecord, DomainError> {
        self.courses.get(course_id).ok_or_else(|| course_not_found(course_id))
    }

    fn add_member(&mut self, course_id: &CourseId, user_id: &UserId) -> Result<(), DomainError> {
        if !self.users.contains_key(user_id) {
            return Err(user_not_found(user_id));
        }
        let course = self
            .courses
            .get_mut(course_id)
            .ok_or_else(|| course_not_found(course_id))?;
        if !course.members.contains(user_id) {
            course.members.push(user_id.clone());
        }
        Ok(())
    }
}

fn course_not_found(course_id: &CourseId) -> DomainError {
    DomainError::new(
        ErrorCode::CourseNotFound,
        format!("Course with id {} not found", course_id),
    )
}

fn user_not_found(user_id: &UserId) -> DomainError {
    DomainError::new(
        ErrorCode::UserNotFound,
        format!("User with id {} not found", user_id),
    )
}

/// In-memory directory of users and course rosters.
#[derive(Debug, Default)]
pub struct InMemoryCourseDirectory {
    state: RwLock<DirectoryState>,
}

impl InMemoryCourseDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from seed data.
    ///
    /// Fails if a course lists a member that is not among the seed users.
    pub fn from_seed(seed: DirectorySeed) -> Result<Self, DomainError> {
        let mut state = DirectoryState::default();

        for user in seed.users {
            state.users.insert(user.id.clone(), user);
        }
        for course in seed.courses {
            state.courses.insert(
                course.id.clone(),
                CourseRecord {
                    name: course.name,
                    members: Vec::new(),
                },
            );
            for member in &course.members {
                state.add_member(&course.id, member)?;
            }
        }

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Load seed data from a YAML file.
    pub fn load_seed_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::new(
                ErrorCode::StorageError,
                format!("Failed to read directory seed: {}", e),
            )
            .with_detail("path", path.display().to_string())
        })?;
        let seed: DirectorySeed = serde_yaml::from_str(&raw).map_err(|e| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Invalid directory seed: {}", e),
            )
            .with_detail("path", path.display().to_string())
        })?;
        Self::from_seed(seed)
    }

    /// Add a user profile (builder style, for tests and seeding).
    pub fn with_user(mut self, profile: UserProfile) -> Self {
        self.state
            .get_mut()
            .users
            .insert(profile.id.clone(), profile);
        self
    }

    /// Add an empty course.
    pub fn with_course(mut self, course_id: CourseId, name: impl Into<String>) -> Self {
        self.state.get_mut().courses.insert(
            course_id,
            CourseRecord {
                name: name.into(),
                members: Vec::new(),
            },
        );
        self
    }

    /// Enrol a known user in a known course. Unknown ids are ignored.
    pub fn with_member(mut self, course_id: &CourseId, user_id: &UserId) -> Self {
        if let Err(e) = self.state.get_mut().add_member(course_id, user_id) {
            tracing::warn!(error = %e, "Seed membership skipped");
        }
        self
    }

    /// Add or replace a user profile.
    pub async fn add_user(&self, profile: UserProfile) {
        self.state
            .write()
            .await
            .users
            .insert(profile.id.clone(), profile);
    }

    /// Enrol a user. Takes effect for connections opened afterwards.
    pub async fn add_member(&self, course_id: &CourseId, user_id: &UserId) -> Result<(), DomainError> {
        self.state.write().await.add_member(course_id, user_id)
    }

    /// Remove a user from a course roster.
    pub async fn remove_member(
        &self,
        course_id: &CourseId,
        user_id: &UserId,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let course = state
            .courses
            .get_mut(course_id)
            .ok_or_else(|| course_not_found(course_id))?;
        course.members.retain(|member| member != user_id);
        Ok(())
    }

    /// Get the number of known courses
    pub async fn course_count(&self) -> usize {
        self.state.read().await.courses.len()
    }
}

#[async_trait]
impl CourseDirectory for InMemoryCourseDirectory {
    async fn course_name(&self, course_id: &CourseId) -> Result<String, DomainError> {
        let state = self.state.read().await;
        Ok(state.course(course_id)?.name.clone())
    }

    async fn members(&self, course_id: &CourseId) -> Result<Vec<UserProfile>, DomainError> {
        let state = self.state.read().await;
        let course = state.course(course_id)?;
        Ok(course
            .members
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn user(&self, user_id: &UserId) -> Result<UserProfile, DomainError> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn is_member(&self, course_id: &CourseId, user_id: &UserId) -> Result<bool, DomainError> {
        let state = self.state.read().await;
        Ok(state.course(course_id)?.members.contains(user_id))
    }
}

#[async_trait]
impl TopicMembershipResolver for InMemoryCourseDirectory {
    async fn course_ids_for(&self, user_id: &UserId) -> Result<HashSet<CourseId>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .courses
            .iter()
            .filter(|(_, course)| course.members.contains(user_id))
            .map(|(id, _)| id.clone())
            .collect())
    }
}
