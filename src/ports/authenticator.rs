//! Authenticator port for the websocket upgrade.
//!
//! The hub only accepts connections for a pre-validated identity. This port
//! turns the credential presented with the upgrade request into a
//! [`UserId`]. It is provider-agnostic: the JWT adapter and the mock used in
//! tests both sit behind it.
//!
//! # Example
//!
//! ```ignore
//! let user_id = authenticator.authenticate(&token).await?;
//! let courses = resolver.course_ids_for(&user_id).await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId};

/// Validates an upgrade credential and extracts the user identity.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed or badly signed tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::MissingSubject` when no user id can be extracted
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Validate a raw token (no `Bearer ` prefix) and return its user.
    async fn authenticate(&self, token: &str) -> Result<UserId, AuthError>;
}
