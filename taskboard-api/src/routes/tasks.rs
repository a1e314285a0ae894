/// Task endpoints
///
/// Every operation authorizes through the ownership chain: the task's
/// project must belong to the session user. `Task::find_owned` performs
/// that check in a single joined query, and a task that is missing and a
/// task owned by someone else produce the same 404.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task (order number assigned automatically)
/// - `GET /projects/:id/tasks` - List a project's tasks in order
/// - `GET /tasks/:task_id` - Fetch a task with its project summary
/// - `PUT /tasks/:task_id` - Update a task
/// - `POST /tasks/:task_id/updateorder` - Write a task's order number
/// - `DELETE /tasks/:task_id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::auth::middleware::CurrentUser;
use taskboard_shared::models::{
    project::Project,
    task::{CreateTask, Task, TaskStatus, UpdateTask},
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title (required, non-empty)
    pub title: String,

    /// Project the task belongs to
    pub project_id: Uuid,

    /// Workflow status (defaults to "todo")
    pub status: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date, "YYYY-MM-DD"
    pub due_date: Option<String>,
}

/// Update task request
///
/// Omitted fields are untouched; an explicit `null` or empty string clears
/// a nullable field.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// Task ID; must match the path
    pub id: Uuid,

    /// New title
    pub title: Option<String>,

    /// New description (`null` or "" clears it)
    #[serde(default, deserialize_with = "super::double_option")]
    pub description: Option<Option<String>>,

    /// New status
    pub status: Option<String>,

    /// New due date, "YYYY-MM-DD" (`null` or "" clears it)
    #[serde(default, deserialize_with = "super::double_option")]
    pub due_date: Option<Option<String>>,
}

/// Reorder request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// New order number (>= 1), written verbatim
    pub order_number: i32,
}

/// Project summary embedded in task responses
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    /// Project ID
    pub id: Uuid,

    /// Project title
    pub title: String,
}

/// Task with its owning project's summary
#[derive(Debug, Serialize)]
pub struct TaskWithProject {
    /// The task itself
    #[serde(flatten)]
    pub task: Task,

    /// Owning project
    pub project: ProjectSummary,
}

/// Reorder response
#[derive(Debug, Serialize)]
pub struct UpdateOrderResponse {
    /// Confirmation message
    pub message: String,

    /// The task with its new order number
    pub task: Task,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

/// Create a task in a project the user owns
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Content-Type: application/json
///
/// { "title": "Write copy", "projectId": "uuid", "status": "todo", "dueDate": "2025-03-01" }
/// ```
///
/// The order number is assigned automatically: one past the project's
/// current maximum, or 1 for the first task.
///
/// # Errors
///
/// - `400 Bad Request`: Empty title or unknown status
/// - `404 Not Found`: Project missing or owned by another user
/// - `422 Unprocessable Entity`: Malformed due date
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let status = parse_status(req.status.as_deref())?.unwrap_or_default();
    let due_date = parse_due_date(req.due_date.as_deref())?;

    // Ownership gate before any mutation.
    Project::find_owned(&state.db, req.project_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description.filter(|d| !d.is_empty()),
            status,
            due_date,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// List a project's tasks, ordered by position
///
/// # Endpoint
///
/// ```text
/// GET /projects/{id}/tasks
/// ```
///
/// Ownership of the project is verified here even though callers usually
/// have already checked it; the listing is never reachable for a project
/// the session user does not own.
///
/// # Errors
///
/// - `404 Not Found`: Project missing or owned by another user
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    Project::find_owned(&state.db, project_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let tasks = Task::list_for_project(&state.db, project_id).await?;

    Ok(Json(tasks))
}

/// Fetch a task the user owns
///
/// # Endpoint
///
/// ```text
/// GET /tasks/{task_id}
/// ```
///
/// The response embeds the owning project's id and title.
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskWithProject>> {
    let task = Task::find_owned(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    // Ownership was just verified through this project.
    let project = Project::find_by_id(&state.db, task.project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskWithProject {
        task,
        project: ProjectSummary {
            id: project.id,
            title: project.title,
        },
    }))
}

/// Update a task the user owns
///
/// # Endpoint
///
/// ```text
/// PUT /tasks/{task_id}
/// Content-Type: application/json
///
/// { "id": "uuid", "status": "done" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body id differs from the path, empty title, or unknown status
/// - `404 Not Found`: Task missing or owned by another user
/// - `422 Unprocessable Entity`: Malformed due date
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    if req.id != task_id {
        return Err(ApiError::BadRequest("Task ID mismatch".to_string()));
    }

    if let Some(ref title) = req.title {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
        }
    }

    let status = parse_status(req.status.as_deref())?;

    // null and "" are explicit clears for nullable fields.
    let due_date = match req.due_date {
        None => None,
        Some(None) => Some(None),
        Some(Some(s)) if s.is_empty() => Some(None),
        Some(Some(s)) => Some(Some(parse_date(&s)?)),
    };
    let description = req.description.map(|d| d.filter(|s| !s.is_empty()));

    Task::find_owned(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description,
            status,
            due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Write a task's order number
///
/// # Endpoint
///
/// ```text
/// POST /tasks/{task_id}/updateorder
/// Content-Type: application/json
///
/// { "orderNumber": 2 }
/// ```
///
/// The value is written verbatim; siblings are not renumbered. After a
/// drag-and-drop reorder the client sends one of these per affected task
/// and tolerates partial application if a later request fails.
///
/// # Errors
///
/// - `400 Bad Request`: Order number below 1
/// - `404 Not Found`: Task missing or owned by another user
pub async fn update_task_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateOrderRequest>,
) -> ApiResult<Json<UpdateOrderResponse>> {
    if req.order_number < 1 {
        return Err(ApiError::BadRequest(
            "Order number must be a positive integer".to_string(),
        ));
    }

    Task::find_owned(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = Task::set_order(&state.db, task_id, req.order_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(UpdateOrderResponse {
        message: "Order updated successfully".to_string(),
        task,
    }))
}

/// Delete a task the user owns
///
/// # Endpoint
///
/// ```text
/// DELETE /tasks/{task_id}
/// ```
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    Task::find_owned(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Task::delete(&state.db, task_id).await?;

    tracing::info!(task_id = %task_id, user_id = %user.id, "Task deleted");

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Parses an optional status string, rejecting unknown values with 400
fn parse_status(status: Option<&str>) -> ApiResult<Option<TaskStatus>> {
    match status {
        None => Ok(None),
        Some(s) => s
            .parse::<TaskStatus>()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

/// Parses an optional "YYYY-MM-DD" due date, rejecting malformed input
fn parse_due_date(due_date: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match due_date {
        None | Some("") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}

fn parse_date(s: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "dueDate".to_string(),
            message: "Invalid date, expected YYYY-MM-DD".to_string(),
        }])
    })
}
