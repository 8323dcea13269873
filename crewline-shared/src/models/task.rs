/// Task model and database operations
///
/// Tasks belong to exactly one team (immutable after creation) and carry an
/// optional assignee. The assignee invariant (creator or current member of the
/// owning team) is enforced by `assignment::validate_assignee` at creation and
/// reassignment time, and by the remove-member cascade afterwards; this module
/// only persists.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     due_date DATE,
///     assigned_to UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Listings order by due_date ascending with NULLs last: undated tasks sink to
/// the bottom.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Team this task belongs to; immutable after creation
    pub team_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Whether the task is done
    pub completed: bool,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Assigned user, when set the team's creator or a current member
    pub assigned_to: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owning team
    pub team_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Optional assignee (validated by the caller)
    pub assigned_to: Option<Uuid>,
}

impl Task {
    /// Creates a new task
    ///
    /// The caller is responsible for having validated the assignee against the
    /// owning team first.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (team_id, title, description, due_date, assigned_to)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, team_id, title, description, completed, due_date,
                      assigned_to, created_at, updated_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, title, description, completed, due_date,
                   assigned_to, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks assigned to a user across all teams
    pub async fn list_for_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, title, description, completed, due_date,
                   assigned_to, created_at, updated_at
            FROM tasks
            WHERE assigned_to = $1
            ORDER BY due_date ASC NULLS LAST
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists all tasks of a team
    pub async fn list_for_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, team_id, title, description, completed, due_date,
                   assigned_to, created_at, updated_at
            FROM tasks
            WHERE team_id = $1
            ORDER BY due_date ASC NULLS LAST
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Sets the completed flag
    ///
    /// Returns the updated task, or None if the task no longer exists.
    pub async fn set_completed(
        pool: &PgPool,
        id: Uuid,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET completed = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, team_id, title, description, completed, due_date,
                      assigned_to, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Sets (or clears) the assignee
    ///
    /// Returns the updated task, or None if the task no longer exists. The
    /// caller validates the assignee against the owning team first.
    pub async fn set_assignee(
        pool: &PgPool,
        id: Uuid,
        assigned_to: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assigned_to = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, team_id, title, description, completed, due_date,
                      assigned_to, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(assigned_to)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
