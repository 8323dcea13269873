/// Team model and database operations
///
/// Teams group users around a shared task list. Every team has exactly one
/// creator (immutable after creation) and a set of members stored in the
/// `team_members` join table. The creator is never materialized into that set;
/// creator access is always a derived check.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     slug VARCHAR(255),
///     created_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use crewline_shared::models::team::{Team, CreateTeam};
/// use crewline_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(creator: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let team = Team::create(&pool, CreateTeam {
///     name: "Engineering".to_string(),
///     description: None,
/// }, creator).await?;
///
/// assert_eq!(team.slug.as_deref(), Some("engineering"));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID (UUID v4)
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// URL-safe slug derived from the name at creation, never overwritten
    pub slug: Option<String>,

    /// The user who created the team; immutable, implicitly a member
    pub created_by: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Derives a URL-safe slug from a team name
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens, and
/// trims leading/trailing hyphens. An all-symbol name yields an empty string.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

impl Team {
    /// Creates a new team
    ///
    /// The acting user becomes the creator. The slug is derived from the name
    /// here, once; later renames (there are none today) must not regenerate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(
        pool: &PgPool,
        data: CreateTeam,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let slug = slugify(&data.name);
        let slug = if slug.is_empty() { None } else { Some(slug) };

        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, slug, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, slug, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(slug)
        .bind(created_by)
        .fetch_one(pool)
        .await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, slug, created_by, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists teams where the user is a member or the creator
    ///
    /// Ordered by creation date, oldest first.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT DISTINCT t.id, t.name, t.description, t.slug, t.created_by,
                   t.created_at, t.updated_at
            FROM teams t
            LEFT JOIN team_members m ON m.team_id = t.id
            WHERE t.created_by = $1 OR m.user_id = $1
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Deletes a team
    ///
    /// Cascades to the team's tasks and memberships via foreign keys.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
