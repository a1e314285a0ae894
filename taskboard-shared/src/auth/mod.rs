/// Authentication primitives
///
/// - `password`: Argon2id password hashing and verification
/// - `session`: session token (JWT) and cookie handling
/// - `middleware`: request-level resolution of the current user

pub mod middleware;
pub mod password;
pub mod session;
