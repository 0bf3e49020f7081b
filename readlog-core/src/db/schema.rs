//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: users and reading logs
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id               TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        email            TEXT NOT NULL UNIQUE,
        is_admin         INTEGER NOT NULL DEFAULT 0,
        created_at       DATETIME NOT NULL
    );

    CREATE TABLE IF NOT EXISTS reading_logs (
        id               TEXT PRIMARY KEY,
        user_id          TEXT NOT NULL REFERENCES users(id),
        date_time        DATETIME NOT NULL,
        -- Calendar day of date_time on the store's day boundary (YYYY-MM-DD)
        log_day          TEXT NOT NULL,
        reading_minutes  INTEGER NOT NULL CHECK (reading_minutes >= 0),
        met_target       INTEGER NOT NULL,
        reading_book     TEXT,
        reading_topic    TEXT,
        learning         TEXT,
        questions        TEXT,
        created_at       DATETIME NOT NULL,
        updated_at       DATETIME NOT NULL
    );

    -- One log per user per calendar day
    CREATE UNIQUE INDEX IF NOT EXISTS idx_reading_logs_user_day ON reading_logs(user_id, log_day);
    CREATE INDEX IF NOT EXISTS idx_reading_logs_user_time ON reading_logs(user_id, date_time);
    CREATE INDEX IF NOT EXISTS idx_users_admin ON users(is_admin);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version = get_schema_version(conn)?;

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking database migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute_batch(&format!("PRAGMA user_version = {}", version))?;
        }
    }

    if current_version < SCHEMA_VERSION {
        tracing::info!(
            from = current_version,
            to = SCHEMA_VERSION,
            "Migrations complete"
        );
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}
