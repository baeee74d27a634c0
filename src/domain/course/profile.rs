//! Public profile of a platform user.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// The "full identity" attached to chat messages and notification payloads.
///
/// Carries only what other course members are allowed to see; credentials
/// and audit timestamps never leave the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: String,
}

impl UserProfile {
    /// Creates a profile with an empty avatar.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email: email.into(),
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: String::new(),
        }
    }

    /// "First Last", as shown in notification messages.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
