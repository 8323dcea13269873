/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh, logout)
/// - `teams`: Team management endpoints
/// - `tasks`: Task management endpoints

pub mod auth;
pub mod health;
pub mod tasks;
pub mod teams;
