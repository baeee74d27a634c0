//! Roles a user can hold inside a course.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Course role, ordered by privilege.
///
/// The numeric codes are the ones the course service stores and sends in
/// role-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseRole {
    Member,
    Moderator,
    Instructor,
    Admin,
}

impl CourseRole {
    /// Parses the stored numeric role code.
    pub fn from_code(code: i32) -> Result<Self, ValidationError> {
        match code {
            1 => Ok(CourseRole::Member),
            2 => Ok(CourseRole::Moderator),
            3 => Ok(CourseRole::Instructor),
            4 => Ok(CourseRole::Admin),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("invalid role: {}", other),
            )),
        }
    }

    /// Returns the stored numeric role code.
    pub fn code(&self) -> i32 {
        match self {
            CourseRole::Member => 1,
            CourseRole::Moderator => 2,
            CourseRole::Instructor => 3,
            CourseRole::Admin => 4,
        }
    }
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CourseRole::Member => "member",
            CourseRole::Moderator => "moderator",
            CourseRole::Instructor => "instructor",
            CourseRole::Admin => "admin",
        };
        write!(f, "{}", s)
    }
}
