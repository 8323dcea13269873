/// Error handling for the API server
///
/// One unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>`; the `IntoResponse` impl turns every variant into the
/// right status code with a JSON body of the form:
///
/// ```json
/// { "non_field_errors": ["User 'bob' is already a member of this team"] }
/// ```
///
/// Status mapping: 400 validation failure, 401 missing/invalid credentials,
/// 403 authorization failure, 404 missing resource, 500 unexpected store
/// failure. Internal errors are logged in full and returned with a generic
/// message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crewline_shared::auth::authorization::AuthzError;
use crewline_shared::auth::jwt::JwtError;
use crewline_shared::auth::password::PasswordError;
use crewline_shared::membership::MembershipError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), single message
    BadRequest(String),

    /// Validation failure (400), one message per violated rule
    Validation(Vec<String>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response body
///
/// Every error, field-level or not, is reported as a list of human-readable
/// messages under `non_field_errors`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error messages
    pub non_field_errors: Vec<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(msgs) => write!(f, "Validation failed: {}", msgs.join("; ")),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, messages) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, vec![msg]),
            ApiError::Validation(msgs) => (StatusCode::BAD_REQUEST, msgs),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, vec![msg]),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, vec![msg]),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, vec![msg]),
            ApiError::InternalError(msg) => {
                // Log the real error, return a generic message
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec!["An internal error occurred".to_string()],
                )
            }
        };

        let body = Json(ErrorResponse {
            non_field_errors: messages,
        });

        (status, body).into_response()
    }
}

/// Flattens validator's per-field errors into a message list
pub fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{}'", field))
            })
        })
        .collect();

    messages.sort();
    messages
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique violations are caller mistakes, not server faults
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Validation(vec![
                            "A user with that username already exists".to_string(),
                        ]);
                    }
                    return ApiError::Validation(vec![format!(
                        "Constraint violation: {}",
                        constraint
                    )]);
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotCreator | AuthzError::NotTeamMember | AuthzError::NotAssignee => {
                ApiError::Forbidden(err.to_string())
            }
            AuthzError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

/// Convert membership/assignment rule errors to API errors
impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::UnknownUser(_) => ApiError::NotFound(err.to_string()),
            MembershipError::AlreadyMember(_)
            | MembershipError::CreatorImmutable
            | MembershipError::NotMember(_)
            | MembershipError::IneligibleAssignee => ApiError::Validation(vec![err.to_string()]),
            MembershipError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::Revoked => ApiError::Unauthorized("Token has been revoked".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}
