/// Project endpoints
///
/// All endpoints require a session; the owning user is always the session
/// user, regardless of anything in the request body. Projects belonging to
/// other users are reported as 404, never as 403, so existence is not
/// leaked.
///
/// # Endpoints
///
/// - `GET /projects` - List the user's projects with task counts and previews
/// - `POST /projects` - Create a project
/// - `PUT /projects` - Update a project (id in the body)
/// - `DELETE /projects/:id` - Delete a project and all of its tasks

use crate::{
    app::AppState,
    error::{validation_errors, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::models::project::{
    CreateProject, Project, ProjectWithPreview, UpdateProject,
};
use taskboard_shared::auth::middleware::CurrentUser;
use uuid::Uuid;
use validator::Validate;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    pub description: Option<String>,
}

/// Update project request
///
/// Omitted fields are untouched. An explicit `null` or empty-string
/// description clears the stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// Project to update
    pub id: Uuid,

    /// New title
    #[validate(length(min = 3, max = 100, message = "Title must be between 3 and 100 characters"))]
    pub title: Option<String>,

    /// New description (`null` or "" clears it)
    #[validate(length(max = 500, message = "Description must be 500 characters or less"))]
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,
}

/// Delete project response
#[derive(Debug, Serialize)]
pub struct DeleteProjectResponse {
    /// Always true on success
    pub success: bool,
}

/// List the current user's projects
///
/// # Endpoint
///
/// ```text
/// GET /projects
/// ```
///
/// Returns projects newest first, each with its total task count and up
/// to 3 most recently created tasks.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<ProjectWithPreview>>> {
    let projects = Project::list_with_previews(&state.db, user.id).await?;

    Ok(Json(projects))
}

/// Create a project owned by the current user
///
/// # Endpoint
///
/// ```text
/// POST /projects
/// Content-Type: application/json
///
/// { "title": "Launch", "description": "Q3 launch checklist" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Title outside 3-100 chars or description over 500
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate().map_err(validation_errors)?;

    let project = Project::create(
        &state.db,
        CreateProject {
            user_id: user.id,
            title: req.title,
            description: req.description.filter(|d| !d.is_empty()),
        },
    )
    .await?;

    tracing::info!(project_id = %project.id, user_id = %user.id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}

/// Update a project's title and/or description
///
/// # Endpoint
///
/// ```text
/// PUT /projects
/// Content-Type: application/json
///
/// { "id": "uuid", "title": "New title" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No project with that id owned by the session user
/// - `422 Unprocessable Entity`: Validation failed on a supplied field
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(validation_errors)?;

    // Existence and ownership checked together; a miss never reveals
    // whether the project exists for someone else.
    Project::find_owned(&state.db, req.id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let update = UpdateProject {
        title: req.title,
        // null and "" are explicit clears; omitted leaves the description alone.
        description: req.description.map(|d| d.filter(|s| !s.is_empty())),
    };

    let project = Project::update(&state.db, req.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(project))
}

/// Delete a project and all of its tasks
///
/// # Endpoint
///
/// ```text
/// DELETE /projects/{id}
/// ```
///
/// The task deletes and the project delete run in one transaction: either
/// everything is removed or nothing is.
///
/// # Errors
///
/// - `404 Not Found`: No project with that id owned by the session user
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<DeleteProjectResponse>> {
    Project::find_owned(&state.db, project_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Project::delete_with_tasks(&state.db, project_id).await?;

    tracing::info!(project_id = %project_id, user_id = %user.id, "Project deleted");

    Ok(Json(DeleteProjectResponse { success: true }))
}
