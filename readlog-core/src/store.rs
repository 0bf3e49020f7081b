//! Persistent store interface consumed by the upsert policy and the
//! dashboard/admin queries.
//!
//! [`Database`](crate::Database) is the SQLite implementation. The policy
//! and query functions are generic over this trait, so they run the same
//! way against a plain connection or inside a transaction.

use crate::analytics::ParticipantRow;
use crate::error::Result;
use crate::types::{LogFields, ReadingLogEntry, User, UserMinutes};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub trait LogStore {
    /// Look up a user by id.
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// All logs for a user, oldest first.
    fn find_logs_for_user(&self, user_id: &str) -> Result<Vec<ReadingLogEntry>>;

    /// The user's log whose `date_time` lies in `[start, end]`, if any.
    fn find_log_in_day_window(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<ReadingLogEntry>>;

    /// Insert a new log.
    ///
    /// Fails with [`Error::Conflict`](crate::Error::Conflict) when the user
    /// already has a log on that calendar day.
    fn create_log(&self, user_id: &str, fields: &LogFields) -> Result<ReadingLogEntry>;

    /// Replace every field of an existing log.
    fn update_log(&self, log_id: &str, fields: &LogFields) -> Result<ReadingLogEntry>;

    /// Total minutes per non-admin user who has logged anything.
    fn sum_minutes_grouped_by_user(&self) -> Result<Vec<UserMinutes>>;

    /// Display names for the given ids; unknown ids are absent from the map.
    fn find_user_names(&self, user_ids: &[String]) -> Result<HashMap<String, String>>;

    /// Every non-admin user with aggregate log counts.
    fn list_participants(&self) -> Result<Vec<ParticipantRow>>;
}
