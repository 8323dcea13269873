/// Database models
///
/// - `user`: Account identities
/// - `team`: Teams and slug derivation
/// - `team_member`: Team membership join rows
/// - `task`: Team-scoped tasks with optional assignee
/// - `revoked_token`: Refresh-token denylist

pub mod revoked_token;
pub mod task;
pub mod team;
pub mod team_member;
pub mod user;
