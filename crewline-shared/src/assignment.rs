/// Task assignment rules
///
/// A task's assignee, when set, must be the owning team's creator or a current
/// member. This is enforced when a task is created and when it is reassigned;
/// it is deliberately NOT re-checked when membership later changes: the
/// remove-member cascade (`membership::remove_member`) is the only path that
/// retroactively clears assignments.
///
/// # Example
///
/// ```no_run
/// use crewline_shared::assignment::validate_assignee;
/// use crewline_shared::models::team::Team;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: &PgPool, team: &Team, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // None always passes; Some must be creator or member
/// validate_assignee(pool, team, None).await?;
/// validate_assignee(pool, team, Some(user_id)).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::membership::MembershipError;
use crate::models::team::Team;
use crate::models::team_member::TeamMember;

/// Screens an assignee candidate against already-loaded membership state
///
/// Pure: `is_member` is the candidate's membership in `team`.
pub fn screen_assignee(
    team: &Team,
    candidate_id: Uuid,
    is_member: bool,
) -> Result<(), MembershipError> {
    if candidate_id == team.created_by || is_member {
        return Ok(());
    }

    Err(MembershipError::IneligibleAssignee)
}

/// Validates a prospective assignee for a team's task
///
/// Passes when the candidate is None (unassigned), the team creator, or a
/// current member; the membership lookup is skipped for the first two.
///
/// # Errors
///
/// Returns `MembershipError::IneligibleAssignee` otherwise.
pub async fn validate_assignee(
    pool: &PgPool,
    team: &Team,
    candidate: Option<Uuid>,
) -> Result<(), MembershipError> {
    let Some(candidate_id) = candidate else {
        return Ok(());
    };

    if candidate_id == team.created_by {
        return Ok(());
    }

    let is_member = TeamMember::is_member(pool, team.id, candidate_id).await?;
    screen_assignee(team, candidate_id, is_member)
}
