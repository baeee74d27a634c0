//! Course membership vocabulary shared by chat and notifications.

mod profile;
mod role;

pub use profile::UserProfile;
pub use role::CourseRole;
