//! Database repository layer
//!
//! [`LogRepo`] holds the queries and borrows a connection (or an open
//! transaction). [`Database`] owns the connection and hands out repos.

use crate::analytics::{ParticipantRow, ParticipantStats};
use crate::calendar::DayBoundary;
use crate::error::{Error, Result};
use crate::store::LogStore;
use crate::submission::NewUser;
use crate::types::*;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed-width UTC text so that string comparison orders timestamps.
fn ts_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn ts_from_sql(row: &Row, idx: &str) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    parse_ts(&s)
}

fn opt_ts_from_sql(row: &Row, idx: &str) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.as_deref().map(parse_ts).transpose()
}

fn is_constraint(err: &rusqlite::Error, extended: std::os::raw::c_int) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation && e.extended_code == extended
    )
}

/// Queries over a borrowed connection.
pub struct LogRepo<'c> {
    conn: &'c Connection,
    boundary: DayBoundary,
}

impl<'c> LogRepo<'c> {
    pub fn new(conn: &'c Connection, boundary: DayBoundary) -> Self {
        Self { conn, boundary }
    }

    // ============================================
    // User operations
    // ============================================

    /// Insert a validated registration.
    pub fn insert_user(&self, new_user: &NewUser) -> Result<User> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            is_admin: new_user.is_admin,
            created_at: Utc::now(),
        };

        self.conn
            .execute(
                r#"
                INSERT INTO users (id, name, email, is_admin, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    user.id,
                    user.name,
                    user.email,
                    user.is_admin,
                    ts_to_sql(user.created_at),
                ],
            )
            .map_err(|e| {
                if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
                    Error::InvalidInput(format!("email {} is already registered", user.email))
                } else {
                    Error::from(e)
                }
            })?;

        Ok(user)
    }

    /// Look up a user by (case-insensitive) email.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT * FROM users WHERE email = ?",
                [email.trim().to_lowercase()],
                Self::row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            is_admin: row.get("is_admin")?,
            created_at: ts_from_sql(row, "created_at")?,
        })
    }

    // ============================================
    // Reading log operations
    // ============================================

    fn row_to_log(row: &Row) -> rusqlite::Result<ReadingLogEntry> {
        Ok(ReadingLogEntry {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date_time: ts_from_sql(row, "date_time")?,
            reading_minutes: row.get("reading_minutes")?,
            met_target: row.get("met_target")?,
            reading_book: row.get("reading_book")?,
            reading_topic: row.get("reading_topic")?,
            learning: row.get("learning")?,
            questions: row.get("questions")?,
        })
    }

    fn get_log(&self, log_id: &str) -> Result<Option<ReadingLogEntry>> {
        self.conn
            .query_row(
                "SELECT * FROM reading_logs WHERE id = ?",
                [log_id],
                Self::row_to_log,
            )
            .optional()
            .map_err(Error::from)
    }

    fn log_day(&self, fields: &LogFields) -> String {
        self.boundary
            .day_of(fields.date_time)
            .format("%Y-%m-%d")
            .to_string()
    }

    /// Map a failed insert to the taxonomy: same-day duplicates are
    /// `Conflict`, a dangling user reference is `NotFound`.
    fn classify_insert_error(e: rusqlite::Error, user_id: &str, day: &str) -> Error {
        if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
            Error::Conflict(format!("user {} already has a log on {}", user_id, day))
        } else if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
            Error::NotFound(user_id.to_string())
        } else {
            Error::from(e)
        }
    }
}

impl LogStore for LogRepo<'_> {
    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT * FROM users WHERE id = ?",
                [user_id],
                Self::row_to_user,
            )
            .optional()
            .map_err(Error::from)
    }

    fn find_logs_for_user(&self, user_id: &str) -> Result<Vec<ReadingLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM reading_logs WHERE user_id = ? ORDER BY date_time ASC",
        )?;
        let logs = stmt
            .query_map([user_id], Self::row_to_log)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    fn find_log_in_day_window(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<ReadingLogEntry>> {
        self.conn
            .query_row(
                r#"
                SELECT * FROM reading_logs
                WHERE user_id = ?1 AND date_time >= ?2 AND date_time <= ?3
                ORDER BY date_time ASC
                LIMIT 1
                "#,
                params![user_id, ts_to_sql(start), ts_to_sql(end)],
                Self::row_to_log,
            )
            .optional()
            .map_err(Error::from)
    }

    fn create_log(&self, user_id: &str, fields: &LogFields) -> Result<ReadingLogEntry> {
        let id = uuid::Uuid::new_v4().to_string();
        let day = self.log_day(fields);
        let now = ts_to_sql(Utc::now());

        self.conn
            .execute(
                r#"
                INSERT INTO reading_logs (id, user_id, date_time, log_day, reading_minutes,
                                          met_target, reading_book, reading_topic, learning,
                                          questions, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
                "#,
                params![
                    id,
                    user_id,
                    ts_to_sql(fields.date_time),
                    day,
                    fields.reading_minutes,
                    fields.met_target,
                    fields.reading_book,
                    fields.reading_topic,
                    fields.learning,
                    fields.questions,
                    now,
                ],
            )
            .map_err(|e| Self::classify_insert_error(e, user_id, &day))?;

        Ok(ReadingLogEntry {
            id,
            user_id: user_id.to_string(),
            date_time: fields.date_time,
            reading_minutes: fields.reading_minutes,
            met_target: fields.met_target,
            reading_book: fields.reading_book.clone(),
            reading_topic: fields.reading_topic.clone(),
            learning: fields.learning.clone(),
            questions: fields.questions.clone(),
        })
    }

    fn update_log(&self, log_id: &str, fields: &LogFields) -> Result<ReadingLogEntry> {
        let day = self.log_day(fields);

        let changed = self
            .conn
            .execute(
                r#"
                UPDATE reading_logs SET
                    date_time = ?2,
                    log_day = ?3,
                    reading_minutes = ?4,
                    met_target = ?5,
                    reading_book = ?6,
                    reading_topic = ?7,
                    learning = ?8,
                    questions = ?9,
                    updated_at = ?10
                WHERE id = ?1
                "#,
                params![
                    log_id,
                    ts_to_sql(fields.date_time),
                    day,
                    fields.reading_minutes,
                    fields.met_target,
                    fields.reading_book,
                    fields.reading_topic,
                    fields.learning,
                    fields.questions,
                    ts_to_sql(Utc::now()),
                ],
            )
            .map_err(|e| {
                // The owner never changes, so only the day index can reject this.
                if is_constraint(&e, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) {
                    Error::Conflict(format!(
                        "log {} cannot move to {}: its owner already has a log that day",
                        log_id, day
                    ))
                } else {
                    Error::from(e)
                }
            })?;

        if changed == 0 {
            return Err(Error::StoreFailure(rusqlite::Error::QueryReturnedNoRows));
        }

        self.get_log(log_id)?
            .ok_or(Error::StoreFailure(rusqlite::Error::QueryReturnedNoRows))
    }

    fn sum_minutes_grouped_by_user(&self) -> Result<Vec<UserMinutes>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.user_id, SUM(l.reading_minutes) AS total_minutes
            FROM reading_logs l
            JOIN users u ON u.id = l.user_id
            WHERE u.is_admin = 0
            GROUP BY l.user_id
            ORDER BY total_minutes DESC, l.user_id
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(UserMinutes {
                    user_id: row.get(0)?,
                    total_minutes: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn find_user_names(&self, user_ids: &[String]) -> Result<HashMap<String, String>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name FROM users WHERE id IN ({})",
            placeholders
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let names = stmt
            .query_map(params_from_iter(user_ids.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<HashMap<_, _>, _>>()?;
        Ok(names)
    }

    fn list_participants(&self) -> Result<Vec<ParticipantRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                u.*,
                COUNT(l.id) AS total_logs,
                COALESCE(SUM(l.reading_minutes), 0) AS total_minutes,
                COALESCE(SUM(l.met_target), 0) AS targets_met,
                MAX(l.date_time) AS last_logged_at
            FROM users u
            LEFT JOIN reading_logs l ON l.user_id = u.id
            WHERE u.is_admin = 0
            GROUP BY u.id
            ORDER BY u.name COLLATE NOCASE, u.email
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ParticipantRow {
                    user: Self::row_to_user(row)?,
                    stats: ParticipantStats::from_counts(
                        row.get("total_logs")?,
                        row.get("total_minutes")?,
                        row.get("targets_met")?,
                    ),
                    last_logged_at: opt_ts_from_sql(row, "last_logged_at")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Database handle (single connection behind a mutex)
pub struct Database {
    conn: Mutex<Connection>,
    boundary: DayBoundary,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Mutex::new(conn),
            boundary: DayBoundary::default(),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
            boundary: DayBoundary::default(),
        })
    }

    /// Bucket logs into days on `boundary` instead of server-local time.
    pub fn with_day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn day_boundary(&self) -> DayBoundary {
        self.boundary
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        super::schema::run_migrations(&self.connection())
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against a repo on the shared connection.
    pub fn with_repo<T>(&self, f: impl FnOnce(&LogRepo<'_>) -> Result<T>) -> Result<T> {
        let conn = self.connection();
        f(&LogRepo::new(&conn, self.boundary))
    }

    /// Run `f` inside an IMMEDIATE transaction, committing on `Ok`.
    ///
    /// The write lock is taken up front, so a concurrent writer on the
    /// same file waits instead of interleaving between our read and write.
    pub fn transaction<T>(&self, f: impl FnOnce(&LogRepo<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&LogRepo::new(&tx, self.boundary))?;
        tx.commit()?;
        Ok(value)
    }

    /// Register a new user.
    pub fn register_user(&self, new_user: &NewUser) -> Result<User> {
        let user = self.with_repo(|repo| repo.insert_user(new_user))?;
        tracing::info!(user_id = %user.id, is_admin = user.is_admin, "Registered user");
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.with_repo(|repo| repo.find_user_by_email(email))
    }

    /// Resolve a user reference that may be an id or an email.
    pub fn resolve_user(&self, reference: &str) -> Result<User> {
        if let Some(user) = self.get_user(reference)? {
            return Ok(user);
        }
        self.find_user_by_email(reference)?
            .ok_or_else(|| Error::NotFound(reference.to_string()))
    }

    /// Apply the daily upsert policy atomically.
    pub fn submit_daily_log(&self, submission: &crate::LogSubmission) -> Result<UpsertOutcome> {
        self.transaction(|repo| crate::upsert::upsert_daily_log(repo, self.boundary, submission))
    }
}

impl LogStore for Database {
    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.with_repo(|repo| repo.get_user(user_id))
    }

    fn find_logs_for_user(&self, user_id: &str) -> Result<Vec<ReadingLogEntry>> {
        self.with_repo(|repo| repo.find_logs_for_user(user_id))
    }

    fn find_log_in_day_window(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<ReadingLogEntry>> {
        self.with_repo(|repo| repo.find_log_in_day_window(user_id, start, end))
    }

    fn create_log(&self, user_id: &str, fields: &LogFields) -> Result<ReadingLogEntry> {
        self.with_repo(|repo| repo.create_log(user_id, fields))
    }

    fn update_log(&self, log_id: &str, fields: &LogFields) -> Result<ReadingLogEntry> {
        self.with_repo(|repo| repo.update_log(log_id, fields))
    }

    fn sum_minutes_grouped_by_user(&self) -> Result<Vec<UserMinutes>> {
        self.with_repo(|repo| repo.sum_minutes_grouped_by_user())
    }

    fn find_user_names(&self, user_ids: &[String]) -> Result<HashMap<String, String>> {
        self.with_repo(|repo| repo.find_user_names(user_ids))
    }

    fn list_participants(&self) -> Result<Vec<ParticipantRow>> {
        self.with_repo(|repo| repo.list_participants())
    }
}
