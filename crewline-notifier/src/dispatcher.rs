/// Email dispatcher
///
/// The main notifier loop: claim a batch of queued jobs, hand each to the
/// mailer, and record the outcome. Delivery failures are logged and either
/// retried (by requeueing) or parked as failed once the attempt budget is
/// spent. They never propagate.
///
/// # Example
///
/// ```no_run
/// use crewline_notifier::dispatcher::{Dispatcher, DispatcherConfig};
/// use crewline_notifier::mailer::MockMailer;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = Dispatcher::new(pool, Arc::new(MockMailer::new()));
///
/// dispatcher.run().await;
/// # Ok(())
/// # }
/// ```

use crate::mailer::Mailer;
use crate::queue::{JobQueue, QueueError};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Poll interval in seconds
    pub poll_interval_secs: u64,

    /// Job claim batch size
    pub batch_size: usize,

    /// Delivery attempts before a job is parked as failed
    pub max_attempts: i32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            poll_interval_secs: 5,
            batch_size: 10,
            max_attempts: 3,
        }
    }
}

/// Email dispatcher
pub struct Dispatcher {
    /// Job queue
    queue: JobQueue,

    /// Delivery backend
    mailer: Arc<dyn Mailer>,

    /// Configuration
    config: DispatcherConfig,

    /// Shutdown token
    shutdown_token: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher with default configuration
    pub fn new(db: PgPool, mailer: Arc<dyn Mailer>) -> Self {
        Self::with_config(db, mailer, DispatcherConfig::default())
    }

    /// Creates a dispatcher with custom configuration
    pub fn with_config(db: PgPool, mailer: Arc<dyn Mailer>, config: DispatcherConfig) -> Self {
        Dispatcher {
            queue: JobQueue::with_batch_size(db, config.batch_size),
            mailer,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Returns a token that stops the run loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the dispatch loop until shutdown
    pub async fn run(&self) {
        tracing::info!(
            mailer = self.mailer.name(),
            poll_interval_secs = self.config.poll_interval_secs,
            "Dispatcher started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Dispatcher shutting down");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.poll_interval_secs)) => {
                    if let Err(e) = self.run_once().await {
                        // Queue errors are transient (database hiccups); keep polling
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// Claims and processes one batch of jobs
    ///
    /// Returns the number of jobs processed (sent or failed).
    pub async fn run_once(&self) -> Result<usize, QueueError> {
        let jobs = self.queue.claim_jobs(None).await?;
        let count = jobs.len();

        for job in jobs {
            match self.mailer.send(&job).await {
                Ok(()) => {
                    self.queue.mark_sent(job.id).await?;
                }
                Err(e) => {
                    self.queue
                        .mark_failed(job.id, &e.to_string(), self.config.max_attempts)
                        .await?;
                }
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatcher_config_default() {
        let config = DispatcherConfig::default();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.max_attempts, 3);
    }

    // The claim/send/mark cycle needs a database; covered by integration tests.
}
