/// Team membership rules
///
/// Implements the add-member and remove-member operations with a fixed check
/// order: existence → creator-exclusion → membership check. Each check runs
/// exactly once.
///
/// Removal cascades: every task of the team assigned to the departing user is
/// unassigned in the same transaction as the membership delete, so a removed
/// member never remains on a team's tasks.
///
/// The screening logic is split out as pure functions over already-loaded
/// state; the async operations resolve that state and persist.
///
/// # Example
///
/// ```no_run
/// use crewline_shared::membership::{add_member, remove_member};
/// use crewline_shared::models::team::Team;
/// use sqlx::PgPool;
///
/// # async fn example(pool: &PgPool, team: &Team) -> Result<(), Box<dyn std::error::Error>> {
/// let added = add_member(pool, team, "bob").await?;
/// assert_eq!(added, "bob");
///
/// // Unassigns bob's tasks in the same transaction
/// remove_member(pool, team, "bob").await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::team::Team;
use crate::models::team_member::TeamMember;
use crate::models::user::User;

/// Error type for membership mutations
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// Username did not resolve to a user
    #[error("User '{0}' not found")]
    UnknownUser(String),

    /// User is already a member (or the creator, who is implicitly one)
    #[error("User '{0}' is already a member of this team")]
    AlreadyMember(String),

    /// The creator cannot be removed from their own team
    #[error("The team creator cannot be removed")]
    CreatorImmutable,

    /// User is not a member of the team
    #[error("User '{0}' is not a member of this team")]
    NotMember(String),

    /// Assignee is neither the creator nor a member
    #[error("Assigned user must be a team member or the team creator")]
    IneligibleAssignee,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Screens a candidate for addition to a team
///
/// The creator counts as already a member even though no membership row
/// exists for them.
pub fn screen_addition(
    team: &Team,
    candidate_id: Uuid,
    candidate_username: &str,
    already_member: bool,
) -> Result<(), MembershipError> {
    if candidate_id == team.created_by || already_member {
        return Err(MembershipError::AlreadyMember(
            candidate_username.to_string(),
        ));
    }

    Ok(())
}

/// Screens a candidate for removal from a team
///
/// Creator-exclusion is checked before membership so removing the creator
/// always reports "cannot remove creator", never "not a member".
pub fn screen_removal(
    team: &Team,
    candidate_id: Uuid,
    candidate_username: &str,
    is_member: bool,
) -> Result<(), MembershipError> {
    if candidate_id == team.created_by {
        return Err(MembershipError::CreatorImmutable);
    }

    if !is_member {
        return Err(MembershipError::NotMember(candidate_username.to_string()));
    }

    Ok(())
}

/// Adds a user to a team by username
///
/// Returns the added username.
///
/// # Errors
///
/// - `UnknownUser` if the username does not resolve
/// - `AlreadyMember` if the user is in the member set or is the creator
pub async fn add_member(
    pool: &PgPool,
    team: &Team,
    username: &str,
) -> Result<String, MembershipError> {
    let user = User::find_by_username(pool, username)
        .await?
        .ok_or_else(|| MembershipError::UnknownUser(username.to_string()))?;

    let already_member = TeamMember::is_member(pool, team.id, user.id).await?;
    screen_addition(team, user.id, &user.username, already_member)?;

    TeamMember::insert(pool, team.id, user.id).await?;

    tracing::info!(
        team_id = %team.id,
        user_id = %user.id,
        username = %user.username,
        "Added team member"
    );

    Ok(user.username)
}

/// Removes a user from a team by username, unassigning their tasks
///
/// The membership delete and the task unassignment run in one transaction:
/// either the user is out and off every task, or nothing changed.
///
/// Returns the removed username.
///
/// # Errors
///
/// - `UnknownUser` if the username does not resolve
/// - `CreatorImmutable` if the username resolves to the team creator
/// - `NotMember` if the user holds no membership row
pub async fn remove_member(
    pool: &PgPool,
    team: &Team,
    username: &str,
) -> Result<String, MembershipError> {
    let user = User::find_by_username(pool, username)
        .await?
        .ok_or_else(|| MembershipError::UnknownUser(username.to_string()))?;

    let is_member = TeamMember::is_member(pool, team.id, user.id).await?;
    screen_removal(team, user.id, &user.username, is_member)?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
        .bind(team.id)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    let cleared = sqlx::query(
        r#"
        UPDATE tasks
        SET assigned_to = NULL,
            updated_at = NOW()
        WHERE team_id = $1 AND assigned_to = $2
        "#,
    )
    .bind(team.id)
    .bind(user.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        team_id = %team.id,
        user_id = %user.id,
        username = %user.username,
        tasks_unassigned = cleared.rows_affected(),
        "Removed team member"
    );

    Ok(user.username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn team_with_creator(creator: Uuid) -> Team {
        Team {
            id: Uuid::new_v4(),
            name: "Eng".to_string(),
            description: None,
            slug: Some("eng".to_string()),
            created_by: creator,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_screen_addition_accepts_new_member() {
        let team = team_with_creator(Uuid::new_v4());
        assert!(screen_addition(&team, Uuid::new_v4(), "bob", false).is_ok());
    }

    #[test]
    fn test_screen_addition_rejects_existing_member() {
        let team = team_with_creator(Uuid::new_v4());
        let result = screen_addition(&team, Uuid::new_v4(), "bob", true);
        assert!(matches!(result, Err(MembershipError::AlreadyMember(u)) if u == "bob"));
    }

    #[test]
    fn test_screen_addition_rejects_creator() {
        let creator = Uuid::new_v4();
        let team = team_with_creator(creator);
        // The creator never holds a membership row but is implicitly a member
        let result = screen_addition(&team, creator, "alice", false);
        assert!(matches!(result, Err(MembershipError::AlreadyMember(_))));
    }

    #[test]
    fn test_screen_removal_accepts_member() {
        let team = team_with_creator(Uuid::new_v4());
        assert!(screen_removal(&team, Uuid::new_v4(), "bob", true).is_ok());
    }

    #[test]
    fn test_screen_removal_rejects_creator_regardless_of_membership() {
        let creator = Uuid::new_v4();
        let team = team_with_creator(creator);

        // Creator-exclusion wins even when a stray membership row exists
        assert!(matches!(
            screen_removal(&team, creator, "alice", true),
            Err(MembershipError::CreatorImmutable)
        ));
        assert!(matches!(
            screen_removal(&team, creator, "alice", false),
            Err(MembershipError::CreatorImmutable)
        ));
    }

    #[test]
    fn test_screen_removal_rejects_non_member() {
        let team = team_with_creator(Uuid::new_v4());
        let result = screen_removal(&team, Uuid::new_v4(), "carol", false);
        assert!(matches!(result, Err(MembershipError::NotMember(u)) if u == "carol"));
    }

    #[test]
    fn test_membership_error_messages() {
        assert_eq!(
            MembershipError::UnknownUser("bob".to_string()).to_string(),
            "User 'bob' not found"
        );
        assert_eq!(
            MembershipError::CreatorImmutable.to_string(),
            "The team creator cannot be removed"
        );
        assert_eq!(
            MembershipError::IneligibleAssignee.to_string(),
            "Assigned user must be a team member or the team creator"
        );
    }

    // add_member / remove_member (including the unassign cascade) are covered
    // by the api crate's integration tests.
}
