//! GiftGenius: personalised gift recommendations.
//!
//! A questionnaire (age, interests, personality, budget, occasion, plan)
//! is turned into a structured search, fanned out concurrently over the
//! configured stores, and ranked with an additive heuristic.
//!
//! # Architecture
//!
//! - **Profile**: wire format and validation of questionnaire answers
//! - **Analyzer**: pure table lookups from a profile to a [`gift_search::SearchSpec`]
//! - **gift-search**: store providers, concurrent aggregation and scoring
//! - **Recommend**: one request end to end, with best-effort history
//! - **History**: SQLite search log, feedback and counters
//! - **Server**: axum HTTP routes over the service

pub mod analyzer;
pub mod config;
pub mod error;
pub mod history;
pub mod profile;
pub mod recommend;
pub mod server;

pub use config::AppConfig;
pub use error::{GiftError, Result};
pub use history::{Feedback, SearchHistory, Statistics, UserSummary};
pub use profile::{Profile, ProfileRequest};
pub use recommend::{AnalysisSummary, GiftService, Recommendation};
