//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the hub to external systems:
//! - `websocket` - Connection hub, liveness, inbound chat and the upgrade handler
//! - `auth` - Token authenticators (JWT, mock)
//! - `memory` - In-memory directory, chat and notification stores
//! - `notifications` - Notifier that publishes through the hub
//! - `http` - Application router (health, tracing, CORS)

pub mod auth;
pub mod http;
pub mod memory;
pub mod notifications;
pub mod websocket;

pub use auth::{JwtAuthenticator, MockAuthenticator};
pub use memory::{InMemoryChatStore, InMemoryCourseDirectory, InMemoryNotificationStore};
pub use notifications::HubNotifier;
pub use websocket::{Hub, HubHandle};
