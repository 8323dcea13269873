/// Refresh-token denylist
///
/// Logout stores a sha256 digest of the presented refresh token here; the
/// refresh endpoint refuses any token whose digest is present. Raw tokens are
/// never persisted. Rows past `expires_at` match tokens that would fail
/// signature validation anyway and can be pruned.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Denylist row for a revoked refresh token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RevokedToken {
    /// sha256 hex digest of the raw token
    pub token_hash: String,

    /// When the token was revoked
    pub revoked_at: DateTime<Utc>,

    /// When the underlying token expires on its own
    pub expires_at: DateTime<Utc>,
}

/// Computes the sha256 hex digest used as the denylist key
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

impl RevokedToken {
    /// Revokes a refresh token
    ///
    /// Idempotent: revoking an already-revoked token is a no-op.
    pub async fn revoke(
        pool: &PgPool,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token_hash, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token_hash) DO NOTHING
            "#,
        )
        .bind(token_digest(token))
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Checks whether a refresh token has been revoked
    pub async fn is_revoked(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_hash = $1)",
        )
        .bind(token_digest(token))
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Removes denylist rows for tokens that have expired on their own
    pub async fn prune_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
