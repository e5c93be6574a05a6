//! SQLite DDL for the search history store.

use rusqlite::Connection;

use super::{METRIC_SATISFIED_USERS, METRIC_TOTAL_GIFTS_FOUND, METRIC_TOTAL_SEARCHES};

/// Complete DDL for the history database.
///
/// Uses `IF NOT EXISTS` throughout so `apply_schema` is idempotent.
pub(crate) const SCHEMA_SQL: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS gift_searches (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id            INTEGER,
    plan               TEXT NOT NULL,
    search_time        TEXT NOT NULL,      -- RFC 3339
    processing_time_ms INTEGER NOT NULL,
    gifts_returned     INTEGER NOT NULL,
    total_found        INTEGER NOT NULL,
    profile_data       TEXT NOT NULL       -- JSON questionnaire
);

CREATE INDEX IF NOT EXISTS idx_searches_user ON gift_searches(user_id);

CREATE TABLE IF NOT EXISTS statistics (
    metric_name  TEXT PRIMARY KEY,
    metric_value INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT
);

CREATE TABLE IF NOT EXISTS user_feedback (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    search_id  INTEGER REFERENCES gift_searches(id),
    rating     INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
    satisfied  INTEGER NOT NULL,
    comments   TEXT,
    created_at TEXT NOT NULL
);
"#;

/// Apply the schema and seed the counters at zero.
pub(crate) fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    for metric in [
        METRIC_TOTAL_SEARCHES,
        METRIC_TOTAL_GIFTS_FOUND,
        METRIC_SATISFIED_USERS,
    ] {
        conn.execute(
            "INSERT OR IGNORE INTO statistics (metric_name, metric_value) VALUES (?1, 0)",
            rusqlite::params![metric],
        )?;
    }

    Ok(())
}
