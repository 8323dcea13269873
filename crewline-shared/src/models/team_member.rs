/// Team membership join rows
///
/// A row means the user is a member of the team. The team's creator never has
/// a row here; creator access is a derived check (see `auth::authorization`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```
///
/// The composite primary key makes duplicate memberships impossible at the
/// storage layer; concurrent add calls race down to one insert and one
/// constraint violation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership row linking a user to a team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Team ID
    pub team_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the membership was created
    pub added_at: DateTime<Utc>,
}

impl TeamMember {
    /// Adds a user to a team
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate membership (primary key violation) or
    /// database failure. Callers that have already screened for duplicates
    /// (see `membership::add_member`) only hit the former under a race.
    pub async fn insert(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id)
            VALUES ($1, $2)
            RETURNING team_id, user_id, added_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Checks whether a user is a member of a team
    pub async fn is_member(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_members
                WHERE team_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists member usernames for a team, oldest membership first
    pub async fn list_usernames(pool: &PgPool, team_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
        let usernames: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT u.username
            FROM team_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.team_id = $1
            ORDER BY m.added_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(usernames)
    }

    /// Counts members of a team
    pub async fn count(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
