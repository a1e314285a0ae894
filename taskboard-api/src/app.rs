/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::middleware::resolve_current_user;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. The pool
/// is the only persistence handle in the process; nothing is global.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the secret for session token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Whether session cookies should carry the Secure attribute
    pub fn cookie_secure(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /auth                          # POST register/login, DELETE logout (public)
/// ├── /register                      # POST standalone registration (public)
/// ├── /projects                      # GET list, POST create, PUT update (session)
/// ├── /projects/:id                  # DELETE with task cascade (session)
/// ├── /projects/:id/tasks            # GET ordered task list (session)
/// ├── /tasks                         # POST create (session)
/// ├── /tasks/:task_id                # GET / PUT / DELETE (session)
/// └── /tasks/:task_id/updateorder    # POST reorder (session)
/// ```
///
/// Protected routes go through `session_auth_layer`, which resolves the
/// session cookie into a `CurrentUser` extension or rejects with 401
/// before any handler runs.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: no session required
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth", post(routes::auth::auth_action))
        .route("/auth", delete(routes::auth::logout))
        .route("/register", post(routes::auth::register));

    // Session-protected routes
    let protected_routes = Router::new()
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects", post(routes::projects::create_project))
        .route("/projects", put(routes::projects::update_project))
        .route("/projects/:id", delete(routes::projects::delete_project))
        .route(
            "/projects/:id/tasks",
            get(routes::tasks::list_project_tasks),
        )
        .route("/tasks", post(routes::tasks::create_task))
        .route("/tasks/:task_id", get(routes::tasks::get_task))
        .route("/tasks/:task_id", put(routes::tasks::update_task))
        .route("/tasks/:task_id", delete(routes::tasks::delete_task))
        .route(
            "/tasks/:task_id/updateorder",
            post(routes::tasks::update_task_order),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Resolves the session cookie into a `CurrentUser` and injects it into
/// request extensions. Missing or invalid sessions are rejected uniformly
/// with 401 before the handler (or any persistence call on its behalf)
/// runs.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let user = resolve_current_user(req.headers(), state.jwt_secret(), &state.db)
        .await
        .map_err(crate::error::ApiError::from)?
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Unauthorized - please log in".to_string())
        })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
