//! Error types for the gift-search crate.
//!
//! Provider failures never surface through these types past the
//! aggregator: they are logged and absorbed into an empty result. The
//! variants here describe what a provider reports internally and what
//! the aggregator itself can reject (configuration and malformed input).

/// Errors that can occur while configuring or running a gift search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// An HTTP request to a store failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a store response (JSON or HTML).
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The search parameters handed to the aggregator are malformed.
    #[error("invalid search spec: {0}")]
    InvalidSpec(String),
}

/// Convenience type alias for gift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
