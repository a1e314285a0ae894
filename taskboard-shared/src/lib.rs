//! # Taskboard Shared Library
//!
//! This crate contains the models, database layer, and authentication
//! primitives shared by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, projects, tasks)
//! - `auth`: Password hashing, session tokens, and request middleware
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
