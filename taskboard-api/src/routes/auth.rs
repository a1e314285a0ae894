/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth` - Register or login, selected by the `action` field
/// - `DELETE /auth` - Logout (clears the session cookie, idempotent)
/// - `POST /register` - Standalone registration
///
/// All successful authentications set the session cookie as a side
/// effect. Login failures collapse unknown email and wrong password into
/// one generic 401 so the endpoint cannot be used to enumerate accounts.

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        password,
        session::{clear_session_cookie, create_session_token, session_cookie},
    },
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Combined register/login request
#[derive(Debug, Deserialize, Validate)]
pub struct AuthRequest {
    /// Email address
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// "register" or "login"
    pub action: String,
}

/// Standalone registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// User payload returned by auth endpoints (never includes the hash)
#[derive(Debug, Serialize)]
pub struct UserPayload {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

/// Auth success response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: UserPayload,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Confirmation message
    pub message: String,
}

/// Combined register/login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "password123", "action": "register" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown action
/// - `401 Unauthorized`: Login with bad credentials
/// - `409 Conflict`: Registration with a taken email
/// - `422 Unprocessable Entity`: Email/password validation failed
pub async fn auth_action(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> ApiResult<Response> {
    req.validate().map_err(validation_errors)?;

    match req.action.as_str() {
        "register" => register_user(&state, &req.email, &req.password).await,
        "login" => login_user(&state, &req.email, &req.password).await,
        _ => Err(ApiError::BadRequest(
            "Invalid action - must be \"register\" or \"login\"".to_string(),
        )),
    }
}

/// Standalone registration endpoint
///
/// # Endpoint
///
/// ```text
/// POST /register
/// Content-Type: application/json
///
/// { "email": "user@example.com", "password": "password123" }
/// ```
///
/// Behaves exactly like `POST /auth` with `action: "register"`, including
/// setting the session cookie.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    req.validate().map_err(validation_errors)?;

    register_user(&state, &req.email, &req.password).await
}

/// Logout endpoint
///
/// # Endpoint
///
/// ```text
/// DELETE /auth
/// ```
///
/// Clears the session cookie. Succeeds whether or not a session existed.
pub async fn logout(State(state): State<AppState>) -> ApiResult<Response> {
    let cookie = clear_session_cookie(state.cookie_secure());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response())
}

/// Creates the user, issues a session and returns 201
async fn register_user(state: &AppState, email: &str, password: &str) -> ApiResult<Response> {
    if User::find_by_email(&state.db, email).await?.is_some() {
        return Err(ApiError::Conflict("Email already exists".to_string()));
    }

    let password_hash = password::hash_password(password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: email.to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    session_response(state, user, StatusCode::CREATED)
}

/// Verifies credentials, issues a session and returns 200
///
/// Unknown email and wrong password deliberately produce the same error.
async fn login_user(state: &AppState, email: &str, password: &str) -> ApiResult<Response> {
    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    tracing::info!(user_id = %user.id, "User logged in");

    session_response(state, user, StatusCode::OK)
}

/// Builds the `{user}` response with the session cookie attached
fn session_response(state: &AppState, user: User, status: StatusCode) -> ApiResult<Response> {
    let token = create_session_token(user.id, state.jwt_secret())?;
    let cookie = session_cookie(&token, state.cookie_secure());

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: UserPayload {
                id: user.id,
                email: user.email,
            },
        }),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_request_validation() {
        let req = AuthRequest {
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            action: "login".to_string(),
        };
        assert!(req.validate().is_err());

        let req = AuthRequest {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
            action: "login".to_string(),
        };
        assert!(req.validate().is_err());

        let req = AuthRequest {
            email: "user@example.com".to_string(),
            password: "password123".to_string(),
            action: "register".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_user_payload_has_no_hash() {
        let payload = AuthResponse {
            user: UserPayload {
                id: Uuid::new_v4(),
                email: "alice@example.com".to_string(),
            },
        };

        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }
}
