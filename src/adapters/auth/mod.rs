//! Authentication adapters.
//!
//! Implementations of the `Authenticator` port:
//!
//! - `jwt` - HS256 bearer tokens signed with a shared secret
//! - `mock` - Test implementation that doesn't require signed tokens

mod jwt;
mod mock;

pub use jwt::JwtAuthenticator;
pub use mock::MockAuthenticator;
