/// Delivery backends
///
/// A `Mailer` turns a claimed email job into an actual delivery. Two
/// implementations:
///
/// - **HttpMailer**: POSTs to an HTTP mail API (production)
/// - **MockMailer**: records deliveries in memory (tests, local development)
///
/// The dispatcher treats mailers as fire-and-forget: a failed send is logged,
/// the job retried or parked as failed, and nothing propagates further.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use crewline_shared::notify::EmailJob;

pub use http::HttpMailer;
pub use mock::MockMailer;

/// Mailer error types
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    /// The mail API rejected the message
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    /// Could not reach the mail API
    #[error("Transport error: {0}")]
    Transport(String),

    /// Mailer is misconfigured
    #[error("Mailer configuration error: {0}")]
    Configuration(String),
}

/// Mailer result type alias
pub type MailerResult<T> = Result<T, MailerError>;

/// Delivery backend contract
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns the mailer name, for logging
    fn name(&self) -> &str;

    /// Delivers one email job
    ///
    /// Implementations should return an error for anything that warrants a
    /// retry; permanent-vs-transient classification is out of scope.
    async fn send(&self, job: &EmailJob) -> MailerResult<()>;
}
