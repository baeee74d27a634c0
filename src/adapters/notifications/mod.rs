//! Notifier adapters.
//!
//! - `HubNotifier` - Resolves recipients through the course directory,
//!   persists notifications and pushes them to connected clients

mod hub_notifier;

pub use hub_notifier::HubNotifier;
