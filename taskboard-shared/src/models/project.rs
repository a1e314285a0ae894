/// Project model and database operations
///
/// Projects are owned by exactly one user. Every read or mutation that
/// takes a project ID goes through [`Project::find_owned`], which checks
/// existence and ownership in one query so that a project belonging to
/// another user is indistinguishable from a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(500),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::task::Task;

/// Project owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Owning user (immutable after creation)
    pub user_id: Uuid,

    /// Project title (3-100 characters)
    pub title: String,

    /// Optional description (<= 500 characters)
    pub description: Option<String>,

    /// When the project was created
    pub created_at: DateTime<Utc>,
}

/// Project annotated with its task count and a preview of recent tasks
///
/// Used by the dashboard listing: `task_count` is the total number of
/// tasks, `tasks` holds up to the 3 most recently created ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithPreview {
    /// The project itself
    #[serde(flatten)]
    pub project: Project,

    /// Total number of tasks in the project
    pub task_count: i64,

    /// Up to 3 most recently created tasks
    pub tasks: Vec<Task>,
}

/// Input for creating a new project
#[derive(Debug, Clone)]
pub struct CreateProject {
    /// Owning user; always taken from the session, never from the client
    pub user_id: Uuid,

    /// Project title
    pub title: String,

    /// Optional description
    pub description: Option<String>,
}

/// Input for updating an existing project
///
/// Outer `None` = leave the field untouched; `description: Some(None)`
/// clears the stored description.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    /// New title
    pub title: Option<String>,

    /// New description (Some(None) clears it)
    pub description: Option<Option<String>>,
}

const PROJECT_COLUMNS: &str = "id, user_id, title, description, created_at";

/// Intermediate row for the listing query (project + aggregate count)
#[derive(sqlx::FromRow)]
struct ProjectCountRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    task_count: i64,
}

impl Project {
    /// Creates a new project for the given user
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (user_id, title, description)
             VALUES ($1, $2, $3)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID, but only if the given user owns it
    ///
    /// Existence and ownership are checked together: the caller cannot
    /// tell "not yours" apart from "does not exist".
    pub async fn find_owned(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1 AND user_id = $2"
        ))
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID without an ownership check
    ///
    /// Only for enriching responses about resources whose ownership has
    /// already been verified (e.g. a task fetched via `Task::find_owned`).
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists a user's projects, newest first, with task counts and previews
    ///
    /// Two queries: one for projects with their aggregate counts, one for
    /// the 3 newest tasks of each project (ranked with a window function),
    /// assembled in memory.
    pub async fn list_with_previews(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ProjectWithPreview>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectCountRow>(
            r#"
            SELECT p.id, p.user_id, p.title, p.description, p.created_at,
                   COUNT(t.id) AS task_count
            FROM projects p
            LEFT JOIN tasks t ON t.project_id = p.id
            WHERE p.user_id = $1
            GROUP BY p.id, p.user_id, p.title, p.description, p.created_at
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let previews = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, description, status, due_date,
                   order_number, created_at
            FROM (
                SELECT t.*,
                       ROW_NUMBER() OVER (
                           PARTITION BY t.project_id
                           ORDER BY t.created_at DESC
                       ) AS recency_rank
                FROM tasks t
                JOIN projects p ON p.id = t.project_id
                WHERE p.user_id = $1
            ) ranked
            WHERE recency_rank <= 3
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        let mut by_project: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in previews {
            by_project.entry(task.project_id).or_default().push(task);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tasks = by_project.remove(&row.id).unwrap_or_default();
                ProjectWithPreview {
                    project: Project {
                        id: row.id,
                        user_id: row.user_id,
                        title: row.title,
                        description: row.description,
                        created_at: row.created_at,
                    },
                    task_count: row.task_count,
                    tasks,
                }
            })
            .collect())
    }

    /// Updates a project, changing only the supplied fields
    ///
    /// Ownership must already have been verified via [`Project::find_owned`].
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.title.is_none() && data.description.is_none() {
            return Self::find_by_id(pool, id).await;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }

        let query = format!(
            "UPDATE projects SET {} WHERE id = $1 RETURNING {PROJECT_COLUMNS}",
            sets.join(", ")
        );

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a project and all of its tasks atomically
    ///
    /// Both deletes run inside a single transaction: either the project
    /// and every child task are removed, or nothing is. Returns true if
    /// the project row existed.
    pub async fn delete_with_tasks(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
