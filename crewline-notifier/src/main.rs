//! # Crewline Notifier
//!
//! Background email delivery for Crewline. Polls the `email_jobs` queue and
//! delivers through the configured HTTP mail API.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `MAIL_API_ENDPOINT`: HTTP mail API URL (required)
//! - `MAIL_API_KEY`: bearer token for the mail API (optional)
//! - `MAIL_FROM`: from address (default: noreply@crewline.dev)
//! - `NOTIFIER_POLL_INTERVAL_SECS`: poll interval (default: 5)
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p crewline-notifier
//! ```

use crewline_notifier::{
    dispatcher::{Dispatcher, DispatcherConfig},
    mailer::{http::HttpMailerConfig, HttpMailer},
};
use crewline_shared::db::pool::{create_pool, DatabaseConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crewline_notifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Crewline Notifier v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

    let mailer_config = HttpMailerConfig {
        endpoint: std::env::var("MAIL_API_ENDPOINT")
            .map_err(|_| anyhow::anyhow!("MAIL_API_ENDPOINT environment variable is required"))?,
        api_key: std::env::var("MAIL_API_KEY").ok(),
        from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@crewline.dev".to_string()),
        timeout_seconds: 30,
    };

    let poll_interval_secs = std::env::var("NOTIFIER_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "5".to_string())
        .parse::<u64>()?;

    let pool = create_pool(DatabaseConfig {
        url: database_url,
        ..Default::default()
    })
    .await?;

    let mailer = Arc::new(HttpMailer::new(mailer_config)?);

    let dispatcher = Dispatcher::with_config(
        pool,
        mailer,
        DispatcherConfig {
            poll_interval_secs,
            ..Default::default()
        },
    );

    let shutdown_token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    dispatcher.run().await;

    tracing::info!("Notifier stopped");

    Ok(())
}
