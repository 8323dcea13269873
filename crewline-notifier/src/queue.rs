/// Email job queue reader
///
/// Polls the `email_jobs` table for queued jobs and claims them for delivery.
///
/// # Claiming
///
/// Claims use `FOR UPDATE SKIP LOCKED` so several notifier processes can run
/// against the same database without double-sending: each job is claimed by
/// exactly one of them.
///
/// - Poll interval: dispatcher-controlled (default 5s)
/// - Batch size: 10 jobs (configurable)
/// - Ordering: FIFO (created_at ASC)
///
/// # Example
///
/// ```no_run
/// use crewline_notifier::queue::JobQueue;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let queue = JobQueue::new(pool);
///
/// let jobs = queue.claim_jobs(Some(5)).await?;
/// for job in jobs {
///     println!("Claimed email job: {}", job.id);
/// }
/// # Ok(())
/// # }
/// ```

use crewline_shared::notify::EmailJob;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// Email queue error
#[derive(Debug, Error)]
pub enum QueueError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Job not found (or not in the expected state)
    #[error("Email job not found: {0}")]
    JobNotFound(Uuid),
}

/// Email job queue reader
pub struct JobQueue {
    /// Database connection pool
    db: PgPool,

    /// Maximum jobs to claim in one batch
    batch_size: usize,
}

impl JobQueue {
    /// Creates a new job queue
    pub fn new(db: PgPool) -> Self {
        JobQueue { db, batch_size: 10 }
    }

    /// Creates a new job queue with a custom batch size
    pub fn with_batch_size(db: PgPool, batch_size: usize) -> Self {
        JobQueue { db, batch_size }
    }

    /// Claims queued jobs for delivery
    ///
    /// Atomically transitions jobs from "queued" to "sending", bumping the
    /// attempt counter, and returns them.
    pub async fn claim_jobs(&self, limit: Option<usize>) -> Result<Vec<EmailJob>, QueueError> {
        let limit = limit.unwrap_or(self.batch_size) as i64;

        let jobs = sqlx::query_as::<_, EmailJob>(
            r#"
            WITH queued_jobs AS (
                SELECT id
                FROM email_jobs
                WHERE state = 'queued'
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE email_jobs
            SET
                state = 'sending',
                attempts = email_jobs.attempts + 1,
                updated_at = NOW()
            FROM queued_jobs
            WHERE email_jobs.id = queued_jobs.id
            RETURNING
                email_jobs.id,
                email_jobs.recipient,
                email_jobs.subject,
                email_jobs.body,
                email_jobs.state,
                email_jobs.attempts,
                email_jobs.last_error,
                email_jobs.created_at,
                email_jobs.updated_at
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        if !jobs.is_empty() {
            tracing::info!(count = jobs.len(), "Claimed email jobs");
        }

        Ok(jobs)
    }

    /// Gets the queued job count
    pub async fn queued_count(&self) -> Result<i64, QueueError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM email_jobs WHERE state = 'queued'")
                .fetch_one(&self.db)
                .await?;

        Ok(count)
    }

    /// Marks a job as sent
    pub async fn mark_sent(&self, job_id: Uuid) -> Result<(), QueueError> {
        let result = sqlx::query(
            r#"
            UPDATE email_jobs
            SET
                state = 'sent',
                updated_at = NOW()
            WHERE id = $1 AND state = 'sending'
            "#,
        )
        .bind(job_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueueError::JobNotFound(job_id));
        }

        tracing::info!(job_id = %job_id, "Email job sent");
        Ok(())
    }

    /// Marks a delivery attempt as failed
    ///
    /// Jobs that have not exhausted `max_attempts` go back to "queued" for a
    /// later retry; the rest land in the terminal "failed" state.
    pub async fn mark_failed(
        &self,
        job_id: Uuid,
        error: &str,
        max_attempts: i32,
    ) -> Result<(), QueueError> {
        let result = sqlx::query(
            r#"
            UPDATE email_jobs
            SET
                state = CASE
                    WHEN attempts >= $3 THEN 'failed'::email_job_state
                    ELSE 'queued'::email_job_state
                END,
                last_error = $2,
                updated_at = NOW()
            WHERE id = $1 AND state = 'sending'
            "#,
        )
        .bind(job_id)
        .bind(error)
        .bind(max_attempts)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(QueueError::JobNotFound(job_id));
        }

        tracing::warn!(job_id = %job_id, error = %error, "Email delivery attempt failed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Queue operations are plain SQL against email_jobs; they are exercised by
    // the integration tests (requires a running database).
}
