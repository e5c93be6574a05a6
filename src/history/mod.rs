//! Search history and usage statistics.
//!
//! Recording a search is the caller's job, not the ranker's: the
//! recommendation service hands each finished search to a
//! [`SearchHistory`] on a best-effort basis.

mod schema;
mod sqlite;

pub use sqlite::SearchHistory;

use serde::{Deserialize, Serialize};

/// Metric name for the number of searches run.
pub const METRIC_TOTAL_SEARCHES: &str = "total_searches";
/// Metric name for the number of gifts returned across all searches.
pub const METRIC_TOTAL_GIFTS_FOUND: &str = "total_gifts_found";
/// Metric name for the number of satisfied feedback submissions.
pub const METRIC_SATISFIED_USERS: &str = "satisfied_users";

/// A finished search to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSearch {
    pub user_id: Option<i64>,
    pub plan: String,
    pub processing_time_ms: u64,
    pub gifts_returned: usize,
    pub total_found: usize,
    /// The questionnaire answers, serialized as JSON.
    pub profile_json: String,
}

/// A persisted search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub plan: String,
    /// RFC 3339 timestamp.
    pub search_time: String,
    pub processing_time_ms: u64,
    pub gifts_returned: usize,
    pub total_found: usize,
}

/// User feedback on a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(alias = "userId")]
    pub user_id: i64,
    #[serde(default, alias = "searchId")]
    pub search_id: Option<i64>,
    /// Star rating, 1 to 5.
    pub rating: u8,
    pub satisfied: bool,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Number of recent searches and feedbacks in a [`UserSummary`].
pub const SUMMARY_RECENT_LIMIT: usize = 5;

/// A stored feedback entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub search_id: Option<i64>,
    pub rating: u8,
    pub satisfied: bool,
    pub comments: Option<String>,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// One user's activity: search count plus their latest searches and feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: i64,
    pub total_searches: i64,
    /// Newest first, at most [`SUMMARY_RECENT_LIMIT`].
    pub last_searches: Vec<SearchRecord>,
    /// Newest first, at most [`SUMMARY_RECENT_LIMIT`].
    pub feedbacks: Vec<FeedbackRecord>,
}

/// Aggregate usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_searches: i64,
    pub total_gifts_found: i64,
    pub satisfied_users: i64,
    pub feedback_count: i64,
    /// Percentage of feedback marked satisfied, 0 when there is none.
    pub satisfaction_rate: f64,
}

/// Errors from the history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid feedback: {0}")]
    InvalidFeedback(String),

    #[error("lock poisoned: {0}")]
    Lock(String),

    #[error("search history is disabled")]
    Disabled,

    #[error("background task failed: {0}")]
    Task(String),
}
