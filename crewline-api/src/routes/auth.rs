/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /users/register/` - Register a new user, issue a token pair
/// - `POST /users/login/` - Authenticate and get tokens
/// - `POST /users/refresh/` - Exchange a refresh token for a new access token
/// - `POST /users/logout/` - Revoke a refresh token
///
/// Registration enqueues a welcome email after the user row commits; a failed
/// enqueue is logged and swallowed, never failing the request.

use crate::{
    app::AppState,
    error::{validation_messages, ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use crewline_shared::{
    auth::{jwt, password},
    models::{
        revoked_token::RevokedToken,
        user::{CreateUser, User},
    },
    notify,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Email address
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Register / login response: the user plus a token pair
#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    /// The authenticated user
    pub user: UserSummary,

    /// Access token (24h)
    pub access: String,

    /// Refresh token (30d)
    pub refresh: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Refresh / logout request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh: String,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access: String,
}

/// Issues an access/refresh token pair for a user
fn issue_token_pair(user: &User, secret: &str) -> Result<(String, String), ApiError> {
    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access = jwt::create_token(&access_claims, secret)?;
    let refresh = jwt::create_token(&refresh_claims, secret)?;

    Ok((access, refresh))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /users/register/
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@example.com", "password": "S3cret!pw" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or username taken
/// - `500 Internal Server Error`: server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenPairResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    password::validate_password_strength(&req.password)
        .map_err(|msg| ApiError::Validation(vec![msg]))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

    // Fire-and-forget: the welcome email must never fail registration
    let job = notify::welcome_email(&user.username, &user.email);
    if let Err(e) = notify::enqueue(&state.db, job).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to enqueue welcome email");
    }

    let (access, refresh) = issue_token_pair(&user, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(TokenPairResponse {
            user: UserSummary::from(&user),
            access,
            refresh,
        }),
    ))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /users/login/
/// Content-Type: application/json
///
/// { "username": "alice", "password": "S3cret!pw" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_messages(&e)))?;

    // Same message for unknown user and bad password
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let (access, refresh) = issue_token_pair(&user, state.jwt_secret())?;

    Ok(Json(TokenPairResponse {
        user: UserSummary::from(&user),
        access,
        refresh,
    }))
}

/// Token refresh
///
/// Exchanges a refresh token for a new access token. Revoked (logged-out)
/// refresh tokens are refused.
///
/// # Endpoint
///
/// ```text
/// POST /users/refresh/
/// Content-Type: application/json
///
/// { "refresh": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: invalid, expired, or revoked refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    if RevokedToken::is_revoked(&state.db, &req.refresh).await? {
        return Err(jwt::JwtError::Revoked.into());
    }

    let access = jwt::refresh_access_token(&req.refresh, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access }))
}

/// Logout
///
/// Revokes the presented refresh token so it can no longer mint access tokens.
/// Idempotent: logging out twice with the same token succeeds both times.
///
/// # Endpoint
///
/// ```text
/// POST /users/logout/
/// Authorization: Bearer <access_token>
/// Content-Type: application/json
///
/// { "refresh": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: missing/invalid access token, or the refresh token
///   does not verify
pub async fn logout(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<StatusCode> {
    let claims = jwt::validate_refresh_token(&req.refresh, state.jwt_secret())?;

    RevokedToken::revoke(&state.db, &req.refresh, claims.expires_at()).await?;

    tracing::info!(user_id = %claims.sub, "Revoked refresh token");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "S3cret!pw".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "S3cret!pw".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_username = RegisterRequest {
            username: "".to_string(),
            email: "alice@example.com".to_string(),
            password: "S3cret!pw".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let short_password = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            username: "alice".to_string(),
            password: "whatever".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = LoginRequest {
            username: "".to_string(),
            password: "whatever".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_user_summary_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            last_login_at: None,
        };

        let summary = UserSummary::from(&user);
        assert_eq!(summary.id, user.id);
        assert_eq!(summary.username, "alice");

        // The hash must not leak into the serialized summary
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("hash"));
    }
}
