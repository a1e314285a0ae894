/// Session token and cookie handling
///
/// A session is an HS256-signed JWT carrying the user ID, transported in
/// an `HttpOnly; SameSite=Strict` cookie named `token`. Sessions expire
/// after 24 hours; there is no refresh flow, the client logs in again.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::session::{create_session_token, validate_session_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let secret = "secret-key-at-least-32-bytes-long!!";
///
/// let token = create_session_token(user_id, secret)?;
/// let claims = validate_session_token(&token, secret)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "token";

/// Session lifetime in seconds (24 hours)
pub const SESSION_TTL_SECONDS: i64 = 60 * 60 * 24;

const ISSUER: &str = "taskboard";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation (bad signature, wrong issuer, malformed)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer - always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the default 24h expiry
    pub fn new(user_id: Uuid) -> Self {
        Self::with_ttl(user_id, Duration::seconds(SESSION_TTL_SECONDS))
    }

    /// Creates claims with a custom time-to-live
    pub fn with_ttl(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks whether the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed session token for a user
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails.
pub fn create_session_token(user_id: Uuid, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, &Claims::new(user_id), &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies the signature, expiration and issuer.
///
/// # Errors
///
/// Returns `SessionError::Expired` for an expired token and
/// `SessionError::ValidationError` for any other failure.
pub fn validate_session_token(token: &str, secret: &str) -> Result<Claims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Builds the `Set-Cookie` value that establishes a session
///
/// The cookie is `HttpOnly` and `SameSite=Strict`; `Secure` is appended
/// when the server runs behind HTTPS (production).
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECONDS
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that clears the session
///
/// Uses `Max-Age=0` so the browser drops the cookie immediately. Safe to
/// send whether or not a session existed, which keeps logout idempotent.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extracts the session token from a `Cookie` request header value
///
/// Returns None if the header does not contain the session cookie.
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_session_token(user_id, SECRET).expect("create");
        let claims = validate_session_token(&token, SECRET).expect("validate");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "taskboard");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = create_session_token(Uuid::new_v4(), SECRET).expect("create");
        let result = validate_session_token(&token, "another-secret-also-32-bytes-long!!");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_rejects_garbage() {
        assert!(validate_session_token("not.a.token", SECRET).is_err());
        assert!(validate_session_token("", SECRET).is_err());
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::with_ttl(Uuid::new_v4(), Duration::seconds(-10));
        assert!(claims.is_expired());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc123", false);
        assert!(cookie.starts_with("token=abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let secure_cookie = session_cookie("abc123", true);
        assert!(secure_cookie.contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_from_cookie_header() {
        assert_eq!(token_from_cookie_header("token=abc"), Some("abc"));
        assert_eq!(
            token_from_cookie_header("theme=dark; token=abc; lang=en"),
            Some("abc")
        );
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        assert_eq!(token_from_cookie_header("token="), None);
        assert_eq!(token_from_cookie_header(""), None);
    }
}
