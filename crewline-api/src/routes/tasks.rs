/// Task management endpoints
///
/// # Endpoints
///
/// - `POST /teams/tasks/create/` - Create a task under a team (creator only)
/// - `GET /teams/tasks/my-tasks/` - Caller's assigned tasks, split by
///   completion with the completion rate
/// - `PATCH /teams/tasks/:id/update-status/` - Set the completed flag
///   (assignee only)
/// - `PATCH /teams/tasks/:id/assign/` - Reassign a task (team creator only)
/// - `GET /teams/tasks/:id/details/` - Team task summary, `:id` is the team id
///   (creator only)
///
/// As everywhere: resolve (404) before authorize (403) before validate (400).

use crate::{
    app::AppState,
    error::{validation_messages, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use crewline_shared::{
    assignment::validate_assignee,
    auth::{
        authorization::{require_task_assignee, require_team_creator},
        middleware::AuthContext,
    },
    models::{
        task::{CreateTask, Task},
        team::Team,
        user::User,
    },
    summary::{self, TaskBreakdown},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Owning team ID
    pub team: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Optional due date (YYYY-MM-DD)
    pub due_date: Option<NaiveDate>,

    /// Optional assignee username
    pub assigned_to: Option<String>,
}

/// Task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Owning team ID
    pub team: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: Option<String>,

    /// Completed flag
    pub completed: bool,

    /// Due date
    pub due_date: Option<NaiveDate>,

    /// Assignee user ID
    pub assigned_to: Option<Uuid>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            team: task.team_id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            due_date: task.due_date,
            assigned_to: task.assigned_to,
        }
    }
}

/// A task list split by completion, with the completion rate
#[derive(Debug, Serialize)]
pub struct TaskBreakdownResponse {
    /// Completed tasks, most recently due first
    pub completed: Vec<TaskResponse>,

    /// Incomplete tasks, soonest due first
    pub incomplete: Vec<TaskResponse>,

    /// Percentage of tasks completed, 2 decimal places
    pub completion_rate: f64,
}

impl From<TaskBreakdown> for TaskBreakdownResponse {
    fn from(breakdown: TaskBreakdown) -> Self {
        Self {
            completed: breakdown.completed.into_iter().map(Into::into).collect(),
            incomplete: breakdown.incomplete.into_iter().map(Into::into).collect(),
            completion_rate: breakdown.completion_rate,
        }
    }
}

/// Team task summary response
#[derive(Debug, Serialize)]
pub struct TeamTaskSummaryResponse {
    /// Team ID
    pub team: Uuid,

    /// Team name
    pub team_name: String,

    /// The team's task breakdown
    #[serde(flatten)]
    pub tasks: TaskBreakdownResponse,
}

/// Update status request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// New completed flag
    pub completed: bool,
}

/// Assign request
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// New assignee username; null clears the assignment
    pub assigned_to: Option<String>,
}

/// Resolves a task or fails with 404
async fn load_task(pool: &PgPool, id: Uuid) -> Result<Task, ApiError> {
    Task::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Resolves a team or fails with 404
async fn load_team(pool: &PgPool, id: Uuid) -> Result<Team, ApiError> {
    Team::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

/// Resolves an optional assignee username to a user ID
///
/// An unknown username is Not-Found, mirroring the membership operations.
async fn resolve_assignee(
    pool: &PgPool,
    username: Option<&str>,
) -> Result<Option<Uuid>, ApiError> {
    match username {
        None => Ok(None),
        Some(name) => {
            let user = User::find_by_username(pool, name)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", name)))?;
            Ok(Some(user.id))
        }
    }
}

/// Create a task under a team
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or assignee is neither creator nor
///   member of the team
/// - `403 Forbidden`: caller is not the team creator
/// - `404 Not Found`: no such team, or assignee username does not resolve
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    let team = load_team(&state.db, req.team).await?;

    require_team_creator(&team, auth.user_id)?;

    let assigned_to = resolve_assignee(&state.db, req.assigned_to.as_deref()).await?;
    validate_assignee(&state.db, &team, assigned_to).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            team_id: team.id,
            title: req.title,
            description: req.description,
            due_date: req.due_date,
            assigned_to,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, team_id = %team.id, "Created task");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List the caller's assigned tasks
///
/// Split into completed (most recently due first) and incomplete (soonest due
/// first) with the completion rate, recomputed on every call.
pub async fn my_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskBreakdownResponse>> {
    let tasks = Task::list_for_assignee(&state.db, auth.user_id).await?;

    let breakdown = summary::breakdown(tasks);

    Ok(Json(breakdown.into()))
}

/// Set a task's completed flag
///
/// Only the current assignee may do this; the team creator is refused unless
/// they are also the assignee.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the assignee
/// - `404 Not Found`: no such task
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = load_task(&state.db, id).await?;

    require_task_assignee(&task, auth.user_id)?;

    let updated = Task::set_completed(&state.db, task.id, req.completed)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(task_id = %updated.id, completed = updated.completed, "Updated task status");

    Ok(Json(updated.into()))
}

/// Reassign a task
///
/// The new assignee must be the team creator or a current member; null clears
/// the assignment.
///
/// # Errors
///
/// - `400 Bad Request`: assignee is neither creator nor member
/// - `403 Forbidden`: caller is not the team creator
/// - `404 Not Found`: no such task, or assignee username does not resolve
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task = load_task(&state.db, id).await?;

    let team = Team::find_by_id(&state.db, task.team_id)
        .await?
        .ok_or_else(|| {
            ApiError::InternalError(format!("Team {} missing for task {}", task.team_id, task.id))
        })?;

    require_team_creator(&team, auth.user_id)?;

    let assigned_to = resolve_assignee(&state.db, req.assigned_to.as_deref()).await?;
    validate_assignee(&state.db, &team, assigned_to).await?;

    let updated = Task::set_assignee(&state.db, task.id, assigned_to)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(
        task_id = %updated.id,
        assigned_to = ?updated.assigned_to,
        "Reassigned task"
    );

    Ok(Json(updated.into()))
}

/// Team task summary
///
/// `:id` is the *team* id. Returns the team's tasks split by completion with
/// the completion rate. Creator only.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not the team creator
/// - `404 Not Found`: no such team
pub async fn team_task_details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamTaskSummaryResponse>> {
    let team = load_team(&state.db, id).await?;

    require_team_creator(&team, auth.user_id)?;

    let tasks = Task::list_for_team(&state.db, team.id).await?;
    let breakdown = summary::breakdown(tasks);

    Ok(Json(TeamTaskSummaryResponse {
        team: team.id,
        team_name: team.name,
        tasks: breakdown.into(),
    }))
}
