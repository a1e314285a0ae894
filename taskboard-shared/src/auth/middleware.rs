/// Current-user resolution for Axum
///
/// Turns a request's session cookie into a [`CurrentUser`], or `None` for
/// anything that is not a valid live session: no cookie, malformed or
/// expired token, or a token whose user no longer exists. Credential
/// problems never surface as errors; only infrastructure failures
/// (database) do.
///
/// The API server wraps this in a middleware layer that rejects `None`
/// with 401 before any handler runs, and injects `CurrentUser` into
/// request extensions for handlers to extract.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(user): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.email)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::session::{token_from_cookie_header, validate_session_token};
use crate::models::user::User;

/// Minimal identity of the authenticated user
///
/// Injected into request extensions by the session middleware; this is the
/// only identity information handlers ever see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Resolves the current user from request headers
///
/// Looks up the session cookie, validates the token and loads the user
/// row. Any credential problem yields `Ok(None)`; downstream treats that
/// uniformly as unauthenticated.
///
/// # Errors
///
/// Only database failures are returned as errors.
pub async fn resolve_current_user(
    headers: &HeaderMap,
    secret: &str,
    pool: &PgPool,
) -> Result<Option<CurrentUser>, sqlx::Error> {
    let token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header);

    let token = match token {
        Some(t) => t,
        None => return Ok(None),
    };

    let claims = match validate_session_token(token, secret) {
        Ok(c) => c,
        Err(_) => return Ok(None),
    };

    // A token may outlive its user; treat that as unauthenticated too.
    let user = User::find_by_id(pool, claims.sub).await?;

    Ok(user.map(CurrentUser::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_current_user_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            created_at: Utc::now(),
        };
        let id = user.id;

        let current: CurrentUser = user.into();
        assert_eq!(current.id, id);
        assert_eq!(current.email, "alice@example.com");
    }
}
