/// Team management endpoints
///
/// # Endpoints
///
/// - `POST /teams/create/` - Create a team (caller becomes creator)
/// - `GET /teams/my-teams/` - List teams where the caller is member or creator
/// - `GET /teams/:id/` - Team detail (member or creator)
/// - `POST /teams/:id/add-member/` - Add a member by username (creator only)
/// - `POST /teams/:id/remove-member/` - Remove a member by username (creator only)
///
/// Handlers resolve the team first (missing team is 404), then authorize
/// (403), then validate (400), in that order, always.

use crate::{
    app::AppState,
    error::{validation_messages, ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use crewline_shared::{
    auth::{
        authorization::{require_team_access, require_team_creator},
        middleware::AuthContext,
    },
    membership,
    models::{
        team::{CreateTeam, Team},
        team_member::TeamMember,
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Team response
///
/// created_by and members are serialized as usernames.
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    /// Team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Description
    pub description: Option<String>,

    /// URL-safe slug
    pub slug: Option<String>,

    /// Creator's username
    pub created_by: String,

    /// Member usernames (excludes the creator)
    pub members: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl TeamResponse {
    /// Builds the response view for a team: creator username + member list
    pub async fn load(pool: &PgPool, team: Team) -> Result<Self, ApiError> {
        let creator = User::find_by_id(pool, team.created_by)
            .await?
            .ok_or_else(|| {
                ApiError::InternalError(format!("Creator {} missing for team {}", team.created_by, team.id))
            })?;

        let members = TeamMember::list_usernames(pool, team.id).await?;

        Ok(Self {
            id: team.id,
            name: team.name,
            description: team.description,
            slug: team.slug,
            created_by: creator.username,
            members,
            created_at: team.created_at,
            updated_at: team.updated_at,
        })
    }
}

/// Add/remove member request
#[derive(Debug, Deserialize, Validate)]
pub struct MemberRequest {
    /// Username of the member to add or remove
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

/// Add/remove member response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// The affected username
    pub username: String,
}

/// Resolves a team or fails with 404
///
/// Existence is always checked before authorization so callers probing random
/// ids get 404, not 403.
async fn load_team(pool: &PgPool, id: Uuid) -> Result<Team, ApiError> {
    Team::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

/// Create a team
///
/// The caller becomes the creator and is implicitly a member from then on;
/// the member set starts empty.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: missing/invalid token
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    let team = Team::create(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    tracing::info!(team_id = %team.id, created_by = %auth.user_id, "Created team");

    let response = TeamResponse::load(&state.db, team).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List the caller's teams
///
/// Teams where the caller is a member or the creator, oldest first.
pub async fn my_teams(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TeamResponse>>> {
    let teams = Team::list_for_user(&state.db, auth.user_id).await?;

    let mut responses = Vec::with_capacity(teams.len());
    for team in teams {
        responses.push(TeamResponse::load(&state.db, team).await?);
    }

    Ok(Json(responses))
}

/// Team detail
///
/// # Errors
///
/// - `403 Forbidden`: caller is neither creator nor member
/// - `404 Not Found`: no such team
pub async fn team_detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamResponse>> {
    let team = load_team(&state.db, id).await?;

    require_team_access(&state.db, &team, auth.user_id).await?;

    let response = TeamResponse::load(&state.db, team).await?;

    Ok(Json(response))
}

/// Add a member by username
///
/// # Errors
///
/// - `400 Bad Request`: user already a member (or is the creator)
/// - `403 Forbidden`: caller is not the team creator
/// - `404 Not Found`: no such team, or username does not resolve
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    let team = load_team(&state.db, id).await?;

    require_team_creator(&team, auth.user_id)?;

    let username = membership::add_member(&state.db, &team, &req.username).await?;

    Ok(Json(MemberResponse { username }))
}

/// Remove a member by username
///
/// Also unassigns every task of this team currently assigned to the removed
/// user, atomically with the removal.
///
/// # Errors
///
/// - `400 Bad Request`: user is the creator, or not a member
/// - `403 Forbidden`: caller is not the team creator
/// - `404 Not Found`: no such team, or username does not resolve
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    let team = load_team(&state.db, id).await?;

    require_team_creator(&team, auth.user_id)?;

    let username = membership::remove_member(&state.db, &team, &req.username).await?;

    Ok(Json(MemberResponse { username }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_validation() {
        let valid = CreateTeamRequest {
            name: "Engineering".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let empty = CreateTeamRequest {
            name: "".to_string(),
            description: None,
        };
        assert!(empty.validate().is_err());

        let too_long = CreateTeamRequest {
            name: "x".repeat(101),
            description: None,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_member_request_validation() {
        let valid = MemberRequest {
            username: "bob".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = MemberRequest {
            username: "".to_string(),
        };
        assert!(empty.validate().is_err());
    }
}
