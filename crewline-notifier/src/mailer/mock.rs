/// Mock mailer for testing and local development
///
/// Records every delivery in memory instead of sending anything. Can be
/// configured to fail, for exercising the retry path.
///
/// # Example
///
/// ```
/// use crewline_notifier::mailer::{Mailer, MockMailer};
/// use crewline_shared::notify::{EmailJob, EmailJobState};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// # async fn example() {
/// let mailer = MockMailer::new();
///
/// let job = EmailJob {
///     id: Uuid::new_v4(),
///     recipient: "alice@example.com".to_string(),
///     subject: "Welcome".to_string(),
///     body: "Hi".to_string(),
///     state: EmailJobState::Sending,
///     attempts: 1,
///     last_error: None,
///     created_at: Utc::now(),
///     updated_at: Utc::now(),
/// };
///
/// mailer.send(&job).await.unwrap();
/// assert_eq!(mailer.sent_count(), 1);
/// # }
/// ```

use async_trait::async_trait;
use crewline_shared::notify::EmailJob;
use std::sync::Mutex;

use super::{Mailer, MailerError, MailerResult};

/// A recorded delivery
#[derive(Debug, Clone)]
pub struct SentEmail {
    /// Recipient address
    pub recipient: String,

    /// Subject line
    pub subject: String,

    /// Body text
    pub body: String,
}

/// Mailer that records deliveries in memory
#[derive(Default)]
pub struct MockMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail_with: Option<String>,
}

impl MockMailer {
    /// Creates a mock mailer that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock mailer that fails every send with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        MockMailer {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Number of recorded deliveries
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Snapshot of recorded deliveries
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, job: &EmailJob) -> MailerResult<()> {
        if let Some(ref message) = self.fail_with {
            return Err(MailerError::Rejected(message.clone()));
        }

        self.sent.lock().unwrap().push(SentEmail {
            recipient: job.recipient.clone(),
            subject: job.subject.clone(),
            body: job.body.clone(),
        });

        Ok(())
    }
}
