//! SQLite-backed search history.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Row, params};

use super::schema::apply_schema;
use super::{
    Feedback, FeedbackRecord, HistoryError, METRIC_SATISFIED_USERS, METRIC_TOTAL_GIFTS_FOUND,
    METRIC_TOTAL_SEARCHES, NewSearch, SUMMARY_RECENT_LIMIT, SearchRecord, Statistics, UserSummary,
};

/// Search history backed by a single SQLite database.
///
/// Thread-safe via an internal `Mutex<Connection>`. Calls block, so async
/// callers should go through `tokio::task::spawn_blocking`.
pub struct SearchHistory {
    conn: Mutex<Connection>,
}

impl SearchHistory {
    /// Open (or create) the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Io(e.to_string()))?;
        }
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, for tests and `--no-history` runs.
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a finished search and bump the counters. Returns the row id.
    pub fn record_search(&self, search: &NewSearch) -> Result<i64, HistoryError> {
        let mut conn = self.lock()?;
        let now = now_rfc3339();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO gift_searches \
             (user_id, plan, search_time, processing_time_ms, gifts_returned, total_found, profile_data) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                search.user_id,
                search.plan,
                now,
                to_i64(search.processing_time_ms),
                to_i64(search.gifts_returned as u64),
                to_i64(search.total_found as u64),
                search.profile_json,
            ],
        )?;
        let id = tx.last_insert_rowid();

        bump_metric(&tx, METRIC_TOTAL_SEARCHES, 1, &now)?;
        bump_metric(
            &tx,
            METRIC_TOTAL_GIFTS_FOUND,
            to_i64(search.gifts_returned as u64),
            &now,
        )?;
        tx.commit()?;

        tracing::debug!(search_id = id, plan = %search.plan, "search recorded");
        Ok(id)
    }

    /// Store user feedback. Satisfied feedback bumps `satisfied_users`.
    ///
    /// # Errors
    ///
    /// [`HistoryError::InvalidFeedback`] when the rating is outside 1..=5 or
    /// the referenced search does not exist.
    pub fn record_feedback(&self, feedback: &Feedback) -> Result<i64, HistoryError> {
        if !(1..=5).contains(&feedback.rating) {
            return Err(HistoryError::InvalidFeedback(format!(
                "rating must be between 1 and 5, got {}",
                feedback.rating
            )));
        }

        let mut conn = self.lock()?;
        let now = now_rfc3339();
        let tx = conn.transaction()?;

        if let Some(search_id) = feedback.search_id {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT id FROM gift_searches WHERE id = ?1",
                    params![search_id],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_none() {
                return Err(HistoryError::InvalidFeedback(format!(
                    "unknown search id {search_id}"
                )));
            }
        }

        tx.execute(
            "INSERT INTO user_feedback \
             (user_id, search_id, rating, satisfied, comments, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                feedback.user_id,
                feedback.search_id,
                feedback.rating,
                feedback.satisfied,
                feedback.comments,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        if feedback.satisfied {
            bump_metric(&tx, METRIC_SATISFIED_USERS, 1, &now)?;
        }
        tx.commit()?;

        Ok(id)
    }

    /// Aggregate counters plus the satisfaction rate.
    pub fn statistics(&self) -> Result<Statistics, HistoryError> {
        let conn = self.lock()?;
        let metric = |name: &str| -> rusqlite::Result<i64> {
            conn.query_row(
                "SELECT metric_value FROM statistics WHERE metric_name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()
            .map(|v| v.unwrap_or(0))
        };

        let total_searches = metric(METRIC_TOTAL_SEARCHES)?;
        let total_gifts_found = metric(METRIC_TOTAL_GIFTS_FOUND)?;
        let satisfied_users = metric(METRIC_SATISFIED_USERS)?;

        let (feedback_count, satisfied_feedback): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(satisfied), 0) FROM user_feedback",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let satisfaction_rate = if feedback_count == 0 {
            0.0
        } else {
            (satisfied_feedback as f64 / feedback_count as f64 * 1000.0).round() / 10.0
        };

        Ok(Statistics {
            total_searches,
            total_gifts_found,
            satisfied_users,
            feedback_count,
            satisfaction_rate,
        })
    }

    /// Most recent searches first, at most `limit`.
    pub fn recent_searches(&self, limit: usize) -> Result<Vec<SearchRecord>, HistoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, plan, search_time, processing_time_ms, gifts_returned, total_found \
             FROM gift_searches ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![to_i64(limit as u64)], row_to_search)?;

        let mut records = Vec::new();
        for r in rows {
            records.push(r?);
        }
        Ok(records)
    }

    /// Search count and the latest searches and feedback of `user_id`.
    ///
    /// A user with no activity gets an empty summary, not an error.
    pub fn user_summary(&self, user_id: i64) -> Result<UserSummary, HistoryError> {
        let conn = self.lock()?;
        let limit = to_i64(SUMMARY_RECENT_LIMIT as u64);

        let total_searches: i64 = conn.query_row(
            "SELECT COUNT(*) FROM gift_searches WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, plan, search_time, processing_time_ms, gifts_returned, total_found \
             FROM gift_searches WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let last_searches = stmt
            .query_map(params![user_id, limit], row_to_search)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT id, search_id, rating, satisfied, comments, created_at \
             FROM user_feedback WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )?;
        let feedbacks = stmt
            .query_map(params![user_id, limit], row_to_feedback)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(UserSummary {
            user_id,
            total_searches,
            last_searches,
            feedbacks,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))
    }
}

fn bump_metric(conn: &Connection, name: &str, by: i64, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO statistics (metric_name, metric_value, last_updated) VALUES (?1, ?2, ?3) \
         ON CONFLICT(metric_name) DO UPDATE SET \
         metric_value = metric_value + excluded.metric_value, last_updated = excluded.last_updated",
        params![name, by, now],
    )?;
    Ok(())
}

fn row_to_search(row: &Row<'_>) -> rusqlite::Result<SearchRecord> {
    let processing: i64 = row.get(4)?;
    let returned: i64 = row.get(5)?;
    let found: i64 = row.get(6)?;
    Ok(SearchRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        plan: row.get(2)?,
        search_time: row.get(3)?,
        processing_time_ms: processing.max(0) as u64,
        gifts_returned: returned.max(0) as usize,
        total_found: found.max(0) as usize,
    })
}

fn row_to_feedback(row: &Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    Ok(FeedbackRecord {
        id: row.get(0)?,
        search_id: row.get(1)?,
        rating: row.get(2)?,
        satisfied: row.get(3)?,
        comments: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
