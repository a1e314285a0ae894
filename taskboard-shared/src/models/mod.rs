/// Database models
///
/// - `user`: User accounts
/// - `project`: Projects owned by a user
/// - `task`: Ordered tasks within a project

pub mod project;
pub mod task;
pub mod user;
