/// Outbound email job queue
///
/// The API enqueues jobs here after the triggering write commits; the notifier
/// binary claims and delivers them. Enqueue is fire-and-forget from the
/// caller's perspective: a failed enqueue is logged and swallowed, and a
/// failed delivery never surfaces to the originating request.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE email_job_state AS ENUM ('queued', 'sending', 'sent', 'failed');
///
/// CREATE TABLE email_jobs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     recipient VARCHAR(255) NOT NULL,
///     subject VARCHAR(255) NOT NULL,
///     body TEXT NOT NULL,
///     state email_job_state NOT NULL DEFAULT 'queued',
///     attempts INTEGER NOT NULL DEFAULT 0,
///     last_error TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Email job delivery state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "email_job_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmailJobState {
    /// Waiting to be claimed by a notifier
    Queued,

    /// Claimed, delivery in progress
    Sending,

    /// Delivered
    Sent,

    /// Gave up after exhausting retries
    Failed,
}

impl EmailJobState {
    /// Converts state to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailJobState::Queued => "queued",
            EmailJobState::Sending => "sending",
            EmailJobState::Sent => "sent",
            EmailJobState::Failed => "failed",
        }
    }

    /// Checks if the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, EmailJobState::Sent | EmailJobState::Failed)
    }
}

/// A queued outbound email
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailJob {
    /// Unique job ID
    pub id: Uuid,

    /// Recipient address
    pub recipient: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,

    /// Delivery state
    pub state: EmailJobState,

    /// Delivery attempts so far
    pub attempts: i32,

    /// Error from the last failed attempt
    pub last_error: Option<String>,

    /// When the job was enqueued
    pub created_at: DateTime<Utc>,

    /// When the job was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for enqueueing an email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmailJob {
    /// Recipient address
    pub recipient: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub body: String,
}

/// Composes the welcome email sent after registration
pub fn welcome_email(username: &str, email: &str) -> NewEmailJob {
    NewEmailJob {
        recipient: email.to_string(),
        subject: "Welcome to Crewline".to_string(),
        body: format!(
            "Hi {},\n\nYour Crewline account is ready. Create a team, invite \
             your people, and start assigning tasks.\n\n— The Crewline team\n",
            username
        ),
    }
}

/// Enqueues an email job
///
/// # Errors
///
/// Returns an error if the insert fails. Callers on the request path should
/// log and swallow it rather than failing the request.
pub async fn enqueue(pool: &PgPool, job: NewEmailJob) -> Result<EmailJob, sqlx::Error> {
    let job = sqlx::query_as::<_, EmailJob>(
        r#"
        INSERT INTO email_jobs (recipient, subject, body)
        VALUES ($1, $2, $3)
        RETURNING id, recipient, subject, body, state, attempts, last_error,
                  created_at, updated_at
        "#,
    )
    .bind(job.recipient)
    .bind(job.subject)
    .bind(job.body)
    .fetch_one(pool)
    .await?;

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_job_state_as_str() {
        assert_eq!(EmailJobState::Queued.as_str(), "queued");
        assert_eq!(EmailJobState::Sending.as_str(), "sending");
        assert_eq!(EmailJobState::Sent.as_str(), "sent");
        assert_eq!(EmailJobState::Failed.as_str(), "failed");
    }

    #[test]
    fn test_email_job_state_is_terminal() {
        assert!(!EmailJobState::Queued.is_terminal());
        assert!(!EmailJobState::Sending.is_terminal());
        assert!(EmailJobState::Sent.is_terminal());
        assert!(EmailJobState::Failed.is_terminal());
    }

    #[test]
    fn test_welcome_email_addresses_user() {
        let job = welcome_email("alice", "alice@example.com");
        assert_eq!(job.recipient, "alice@example.com");
        assert!(job.body.contains("alice"));
        assert!(job.subject.contains("Crewline"));
    }
}
