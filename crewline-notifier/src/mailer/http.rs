/// HTTP mail API backend
///
/// Delivers email by POSTing JSON to a configured HTTP endpoint (any
/// transactional mail provider with a token-authenticated JSON API fits).
///
/// # Request shape
///
/// ```json
/// {
///   "from": "noreply@crewline.dev",
///   "to": "alice@example.com",
///   "subject": "Welcome to Crewline",
///   "text": "Hi alice, ..."
/// }
/// ```

use async_trait::async_trait;
use crewline_shared::notify::EmailJob;
use serde::Serialize;

use super::{Mailer, MailerError, MailerResult};

/// Configuration for the HTTP mailer
#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    /// Mail API endpoint URL
    pub endpoint: String,

    /// Bearer token for the mail API (optional)
    pub api_key: Option<String>,

    /// From address stamped on every message
    pub from: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Outbound message payload
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer delivering through an HTTP mail API
pub struct HttpMailer {
    client: reqwest::Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    /// Creates a new HTTP mailer
    ///
    /// # Errors
    ///
    /// Returns `MailerError::Configuration` if the endpoint is empty or the
    /// HTTP client cannot be built.
    pub fn new(config: HttpMailerConfig) -> MailerResult<Self> {
        if config.endpoint.is_empty() {
            return Err(MailerError::Configuration(
                "Mail API endpoint is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MailerError::Configuration(format!("Failed to build client: {}", e)))?;

        Ok(HttpMailer { client, config })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, job: &EmailJob) -> MailerResult<()> {
        let message = OutboundMessage {
            from: &self.config.from,
            to: &job.recipient,
            subject: &job.subject,
            text: &job.body,
        };

        let mut request = self.client.post(&self.config.endpoint).json(&message);

        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected(format!("{}: {}", status, body)));
        }

        tracing::debug!(job_id = %job.id, recipient = %job.recipient, "Delivered email");
        Ok(())
    }
}
