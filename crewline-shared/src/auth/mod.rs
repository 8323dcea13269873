/// Authentication and authorization
///
/// - `jwt`: Token generation and validation (HS256 access/refresh pairs)
/// - `password`: Argon2id hashing and strength checks
/// - `middleware`: Axum middleware extracting the authenticated identity
/// - `authorization`: Per-resource access checks (creator, member, assignee)

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
