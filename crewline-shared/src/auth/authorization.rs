/// Per-resource authorization checks
///
/// Three checks cover every mutation and privileged read in Crewline:
///
/// 1. **Team creator**: acting user created the team. Gates member management,
///    task creation, task reassignment, and the team task summary.
/// 2. **Team member or creator**: acting user created the team or holds a
///    membership row. Gates the team detail view.
/// 3. **Task assignee**: acting user is the task's current assignee. Gates
///    completion updates. The team creator is refused here like anyone else.
///
/// Callers resolve the resource first (missing resource is Not-Found, checked
/// before any of these), then run the check. The checks themselves have no
/// side effects; only the membership lookup touches the database.
///
/// # Example
///
/// ```no_run
/// use crewline_shared::auth::authorization::{require_team_creator, require_team_access};
/// use crewline_shared::models::team::Team;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: &PgPool, team: &Team, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Mutations: creator only
/// require_team_creator(team, user_id)?;
///
/// // Reads: creator or member
/// require_team_access(pool, team, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::task::Task;
use crate::models::team::Team;
use crate::models::team_member::TeamMember;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Acting user did not create the team
    #[error("Only the team creator may perform this action")]
    NotCreator,

    /// Acting user is neither creator nor member of the team
    #[error("Not a member of this team")]
    NotTeamMember,

    /// Acting user is not the task's assignee
    #[error("Only the assigned user may update this task")]
    NotAssignee,

    /// Database error during a membership lookup
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that the acting user is the team's creator
///
/// Pure comparison against the loaded team record.
pub fn require_team_creator(team: &Team, user_id: Uuid) -> Result<(), AuthzError> {
    if team.created_by != user_id {
        return Err(AuthzError::NotCreator);
    }

    Ok(())
}

/// Checks that the acting user is the team's creator or a member
///
/// The creator is authorized without holding a membership row; the member set
/// is consulted only when the creator check fails, so the common
/// creator-acting-on-own-team path costs no query.
pub async fn require_team_access(
    pool: &PgPool,
    team: &Team,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    if team.created_by == user_id {
        return Ok(());
    }

    let is_member = TeamMember::is_member(pool, team.id, user_id).await?;

    if !is_member {
        return Err(AuthzError::NotTeamMember);
    }

    Ok(())
}

/// Checks that the acting user is the task's current assignee
///
/// An unassigned task has no assignee, so nobody passes, including the team
/// creator.
pub fn require_task_assignee(task: &Task, user_id: Uuid) -> Result<(), AuthzError> {
    if task.assigned_to != Some(user_id) {
        return Err(AuthzError::NotAssignee);
    }

    Ok(())
}
