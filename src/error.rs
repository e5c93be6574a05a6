//! Error types for the GiftGenius service.

use crate::history::HistoryError;

/// Top-level error type for the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum GiftError {
    /// A required questionnaire field is missing or malformed.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// Store search or ranking error (configuration or malformed spec).
    #[error("search error: {0}")]
    Search(#[from] gift_search::SearchError),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Search history / statistics storage error.
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// HTTP server error (bind, serve).
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, GiftError>;
