//! # Crewline Notifier Library
//!
//! Background email delivery for Crewline. The API enqueues jobs into the
//! `email_jobs` table; this crate claims and delivers them.
//!
//! ## Modules
//!
//! - `queue`: Email job queue reader (claim, mark sent/failed)
//! - `mailer`: Delivery backends (HTTP mail API, mock)
//! - `dispatcher`: Poll loop tying queue and mailer together
//!
//! ## Example
//!
//! ```no_run
//! use crewline_notifier::mailer::{Mailer, MockMailer};
//!
//! # async fn example() {
//! let mailer = MockMailer::new();
//! println!("Mailer: {}", mailer.name());
//! # }
//! ```

pub mod dispatcher;
pub mod mailer;
pub mod queue;
