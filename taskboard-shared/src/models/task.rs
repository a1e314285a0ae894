/// Task model and database operations
///
/// Tasks belong to exactly one project and carry a manually ordered
/// `order_number` used to render them in a user-chosen sequence. For
/// authorization purposes a task is owned by its project's owner, so every
/// lookup that feeds a mutation goes through [`Task::find_owned`], which
/// joins through `projects` and checks the owning user in the same query.
///
/// # Ordering
///
/// `order_number` starts at 1 and is assigned `max + 1` within the project
/// at creation time, computed inside the INSERT statement itself. After
/// reordering the numbers are whatever the client wrote: uniqueness and
/// contiguity are not enforced.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('todo', 'in-progress', 'done');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id),
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'todo',
///     due_date DATE,
///     order_number INTEGER NOT NULL CHECK (order_number >= 1),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet
    Todo,

    /// Currently being worked on
    InProgress,

    /// Finished
    Done,
}

/// Error returned when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status must be one of: {}", TaskStatus::valid_values())]
pub struct InvalidStatus(pub String);

impl TaskStatus {
    /// All accepted wire values, in display order
    pub const VALID: [&'static str; 3] = ["todo", "in-progress", "done"];

    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Done => "done",
        }
    }

    /// Comma-separated list of accepted values, for error messages
    pub fn valid_values() -> String {
        Self::VALID.join(", ")
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Task within a project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning project (immutable after creation)
    pub project_id: Uuid,

    /// Task title (non-empty)
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Position within the project (>= 1, duplicates tolerated after reorder)
    pub order_number: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
///
/// `order_number` is not part of the input: it is always assigned by the
/// INSERT itself.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owning project
    pub project_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Workflow status (defaults to todo)
    pub status: TaskStatus,

    /// Optional due date
    pub due_date: Option<NaiveDate>,
}

/// Input for updating an existing task
///
/// Outer `None` = leave the field untouched. For nullable columns the inner
/// `None` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (Some(None) clears it)
    pub description: Option<Option<String>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New due date (Some(None) clears it)
    pub due_date: Option<Option<NaiveDate>>,
}

const TASK_COLUMNS: &str =
    "id, project_id, title, description, status, due_date, order_number, created_at";

impl Task {
    /// Creates a new task, assigning the next order number in its project
    ///
    /// The order number is computed inside the INSERT
    /// (`COALESCE(MAX(order_number), 0) + 1`) so no separate read happens
    /// in application code. Concurrent creations in the same project can
    /// still observe the same maximum and produce duplicate order numbers;
    /// that is tolerated, matching the soft ordering invariant.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, status, due_date, order_number)
            VALUES (
                $1, $2, $3, $4, $5,
                (SELECT COALESCE(MAX(order_number), 0) + 1 FROM tasks WHERE project_id = $1)
            )
            RETURNING id, project_id, title, description, status, due_date, order_number, created_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, but only if the given user owns its project
    ///
    /// This is the single authorization gate for task reads and mutations:
    /// a task that exists but belongs to another user is indistinguishable
    /// from one that does not exist.
    pub async fn find_owned(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.id, t.project_id, t.title, t.description, t.status,
                   t.due_date, t.order_number, t.created_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1 AND p.user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists a project's tasks ordered by their position
    ///
    /// Callers must have verified project ownership first; this query does
    /// not re-check it.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY order_number ASC"
        ))
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Updates a task, changing only the supplied fields
    ///
    /// Returns the updated task, or None if no task with that ID exists.
    /// Ownership must already have been verified via [`Task::find_owned`].
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.title.is_none()
            && data.description.is_none()
            && data.status.is_none()
            && data.due_date.is_none()
        {
            // Nothing to change; return the current row.
            return sqlx::query_as::<_, Task>(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(pool)
            .await;
        }

        // Build the SET clause from whichever fields are present.
        let mut query = String::from("UPDATE tasks SET ");
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
        if data.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            sets.push(format!("due_date = ${}", bind_count));
        }

        query.push_str(&sets.join(", "));
        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        q.fetch_optional(pool).await
    }

    /// Writes a task's order number verbatim
    ///
    /// No sibling renumbering happens here: after a drag-and-drop reorder
    /// the client pushes one update per affected task and tolerates partial
    /// application if a later request fails.
    pub async fn set_order(
        pool: &PgPool,
        id: Uuid,
        order_number: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET order_number = $2 WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(order_number)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task by ID
    ///
    /// Returns true if a row was deleted. Tasks are leaf entities; there is
    /// nothing to cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
