//! Authentication errors for the domain layer.
//!
//! The hub never validates credentials itself. An `Authenticator` adapter
//! resolves a token into a [`UserId`](super::UserId) and reports failures
//! with these provider-agnostic variants.

use thiserror::Error;

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented with the upgrade request.
    #[error("Missing authentication token")]
    MissingToken,

    /// The token is malformed or has an invalid signature.
    #[error("Invalid authentication token")]
    InvalidToken,

    /// The token signature is valid but it has expired.
    #[error("Authentication token has expired")]
    TokenExpired,

    /// The token is valid but carries no usable subject.
    #[error("User ID not found in token")]
    MissingSubject,

    /// The authentication service is unavailable (network, config, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_token_expired_displays_correctly() {
        assert_eq!(
            format!("{}", AuthError::TokenExpired),
            "Authentication token has expired"
        );
    }

    #[test]
    fn auth_error_service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }

    #[test]
    fn auth_error_is_transient_only_for_service_errors() {
        assert!(AuthError::service_unavailable("timeout").is_transient());
        assert!(!AuthError::InvalidToken.is_transient());
        assert!(!AuthError::TokenExpired.is_transient());
        assert!(!AuthError::MissingToken.is_transient());
    }
}
