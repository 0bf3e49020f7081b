//! # readlog-core
//!
//! Core library for readlog - a daily reading log tracker.
//!
//! This library provides:
//! - Domain types for users and reading logs
//! - A validated input boundary for submissions
//! - The one-log-per-day upsert policy
//! - Streak, leaderboard and progress analytics
//! - Database storage layer with SQLite
//! - Configuration management and logging infrastructure
//!
//! ## Data flow
//!
//! Raw submissions are validated in [`submission`], written through
//! [`upsert`] into the store, and read back by the engines in
//! [`analytics`], which are pure functions over the fetched rows.
//! Identity arrives as an explicit [`RequestContext`] on every call.
//!
//! ## Example
//!
//! ```rust,no_run
//! use readlog_core::{Config, Database, RawSubmission, RequestContext};
//!
//! let config = Config::load().expect("failed to load config");
//! let db = Database::open(&config.db_path())
//!     .expect("failed to open database")
//!     .with_day_boundary(config.tracking.day_boundary);
//! db.migrate().expect("failed to run migrations");
//!
//! let user = db.resolve_user("reader@example.com").expect("unknown user");
//! let submission = RawSubmission {
//!     date: Some("2025-01-31".to_string()),
//!     reading_minutes: Some(75),
//!     ..Default::default()
//! }
//! .validate(&user.id, db.day_boundary())
//! .expect("invalid submission");
//! let outcome = db.submit_daily_log(&submission).expect("store failure");
//! println!("{}: {} minutes", outcome.action, outcome.entry.reading_minutes);
//!
//! let ctx = RequestContext::for_user(&user);
//! let board = readlog_core::analytics::full_leaderboard(&db, &ctx).expect("store failure");
//! ```

// Re-export commonly used items at the crate root
pub use calendar::DayBoundary;
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use store::LogStore;
pub use submission::{LogSubmission, NewUser, RawSubmission, RawUser};
pub use types::*;
pub use upsert::upsert_daily_log;

// Public modules
pub mod analytics;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod submission;
pub mod types;
pub mod upsert;
