//! # Crewline Shared Library
//!
//! This crate contains the types, persistence layer, and business rules shared
//! by the Crewline API server and the notifier.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool and migration runner
//! - `membership`: Team membership rules (add/remove + unassign cascade)
//! - `assignment`: Task assignment rules
//! - `summary`: Task aggregation (completion breakdown and rate)
//! - `notify`: Outbound email job queue

pub mod assignment;
pub mod auth;
pub mod db;
pub mod membership;
pub mod models;
pub mod notify;
pub mod summary;

/// Current version of the Crewline shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
