//! Ports - Interfaces for the hub's external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the hub and the rest of the platform. Adapters implement these ports.
//!
//! ## Connection Setup
//!
//! - `Authenticator` - Resolves an upgrade credential into a user id
//! - `TopicMembershipResolver` - Snapshot of a user's courses at connect time
//!
//! ## Message Flow
//!
//! - `ChatPersistence` - Validates, stores and enriches inbound chat
//! - `Notifier` - Turns business events into targeted notifications
//!
//! ## Lookups used by the adapters
//!
//! - `CourseDirectory` - Course names, rosters and user profiles
//! - `NotificationStore` - Notification persistence (assigns ids)

mod authenticator;
mod chat_persistence;
mod course_directory;
mod membership_resolver;
mod notification_store;
mod notifier;

pub use authenticator::Authenticator;
pub use chat_persistence::ChatPersistence;
pub use course_directory::CourseDirectory;
pub use membership_resolver::TopicMembershipResolver;
pub use notification_store::NotificationStore;
pub use notifier::Notifier;
