//! Mock authenticator for testing.
//!
//! Implements the `Authenticator` port without signing real tokens.
//!
//! # Example
//!
//! ```ignore
//! use classroom_hub::adapters::auth::MockAuthenticator;
//!
//! let authenticator = MockAuthenticator::new().with_token("valid-token", "user-123");
//!
//! let user_id = authenticator.authenticate("valid-token").await?;
//! assert_eq!(user_id.as_str(), "user-123");
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId};
use crate::ports::Authenticator;

/// Mock authenticator for testing.
///
/// Stores a map of tokens to user ids. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockAuthenticator {
    /// Map of valid tokens to the user they authenticate
    tokens: RwLock<HashMap<String, String>>,
    /// Optional error to return for every token (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockAuthenticator {
    /// Creates a new empty mock authenticator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that authenticates `user_id`.
    pub fn with_token(self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.add_token(token, user_id);
        self
    }

    /// Forces every authentication to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    /// Clears the forced error and returns to normal operation.
    pub fn clear_error(&self) {
        *self
            .force_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user_id: impl Into<String>) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.into(), user_id.into());
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
    }

    /// Returns the number of registered valid tokens.
    pub fn token_count(&self) -> usize {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        if let Some(error) = self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            return Err(error);
        }

        let subject = self
            .tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;

        UserId::new(subject).map_err(|_| AuthError::MissingSubject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_authenticates() {
        let auth = MockAuthenticator::new().with_token("t1", "alice");
        let user = auth.authenticate("t1").await.unwrap();
        assert_eq!(user.as_str(), "alice");
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let auth = MockAuthenticator::new();
        assert_eq!(auth.authenticate("nope").await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let auth = MockAuthenticator::new().with_token("t1", "");
        assert_eq!(auth.authenticate("t1").await, Err(AuthError::MissingSubject));
    }

    #[tokio::test]
    async fn forced_error_wins_until_cleared() {
        let auth = MockAuthenticator::new()
            .with_token("t1", "alice")
            .with_error(AuthError::service_unavailable("down"));
        assert!(auth.authenticate("t1").await.unwrap_err().is_transient());

        auth.clear_error();
        assert!(auth.authenticate("t1").await.is_ok());
    }

    #[test]
    fn tokens_can_be_added_and_removed() {
        let auth = MockAuthenticator::new();
        auth.add_token("t1", "alice");
        auth.add_token("t2", "bob");
        auth.remove_token("t1");
        assert_eq!(auth.token_count(), 1);
    }
}
