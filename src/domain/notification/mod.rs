//! Targeted notifications and the business events that produce them.

mod event;
mod model;

pub use event::NotificationEvent;
pub use model::{Notification, NotificationType};
