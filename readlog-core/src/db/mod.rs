//! Database layer for readlog
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository queries implementing [`LogStore`](crate::store::LogStore)
//! - Transactions around the daily upsert

pub mod repo;
pub mod schema;

pub use repo::{Database, LogRepo};
