/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation with a valid session token
/// - Request building and response parsing helpers
///
/// Tests expect `DATABASE_URL` and `JWT_SECRET` in the environment (or a
/// `.env` file), the same configuration the server itself reads.

use axum::body::Body;
use axum::http::Request;
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::password::hash_password;
use taskboard_shared::auth::session::{create_session_token, SESSION_COOKIE};
use taskboard_shared::models::user::{CreateUser, User};
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub user: User,
    pub session_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user and a live session
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migrations path is relative to this crate's Cargo.toml
        sqlx::migrate!("../taskboard-shared/migrations")
            .run(&db)
            .await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: hash_password("a-test-password")?,
            },
        )
        .await?;

        let session_token = create_session_token(user.id, &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            user,
            session_token,
        })
    }

    /// Returns the Cookie header value carrying this context's session
    pub fn session_cookie(&self) -> String {
        format!("{}={}", SESSION_COOKIE, self.session_token)
    }

    /// Cleans up everything created under this context's user
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        self.cleanup_user(self.user.id).await
    }

    /// Removes a user and all of their projects and tasks
    pub async fn cleanup_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            "DELETE FROM tasks WHERE project_id IN (SELECT id FROM projects WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;
        sqlx::query("DELETE FROM projects WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

/// Builds a JSON request carrying the given session cookie
pub fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }

    builder
        .body(Body::from(body.to_string()))
        .expect("request build")
}

/// Builds a bodyless request carrying the given session cookie
pub fn request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }

    builder.body(Body::empty()).expect("request build")
}

/// Reads a response body as JSON
pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse body")
}

/// Creates a project through the API, returning its id
pub async fn create_project(ctx: &TestContext, title: &str) -> Uuid {
    use tower::Service as _;

    let request = json_request(
        "POST",
        "/projects",
        Some(&ctx.session_cookie()),
        serde_json::json!({ "title": title }),
    );

    let response = ctx.app.clone().call(request).await.expect("call");
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let body = read_json(response).await;
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("project id")
}

/// Creates a task through the API, returning the response body
pub async fn create_task(ctx: &TestContext, project_id: Uuid, title: &str) -> serde_json::Value {
    use tower::Service as _;

    let request = json_request(
        "POST",
        "/tasks",
        Some(&ctx.session_cookie()),
        serde_json::json!({ "title": title, "projectId": project_id }),
    );

    let response = ctx.app.clone().call(request).await.expect("call");
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    read_json(response).await
}
