//! Gift recommendation service.
//!
//! [`GiftService`] ties the pieces together for one request: validate the
//! questionnaire, derive a search spec, run the store fan-out under the
//! requested plan, and report the ranked gifts with a short analysis.
//! Searches are recorded in the history store when one is attached.

use std::sync::Arc;
use std::time::Instant;

use gift_search::{Aggregator, Plan, ScoredItem};
use serde::{Deserialize, Serialize};

use crate::analyzer;
use crate::config::AppConfig;
use crate::error::Result;
use crate::history::{
    Feedback, HistoryError, NewSearch, SearchHistory, Statistics, UserSummary,
};
use crate::profile::ProfileRequest;

/// Ranked gifts for one questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub gifts: Vec<ScoredItem>,
    pub plan: Plan,
    pub max_results: usize,
    pub analysis: AnalysisSummary,
    /// History row for this search, when it was recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_id: Option<i64>,
}

/// What the analyzer derived and how the search went.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub categories: Vec<String>,
    pub priority_tags: Vec<String>,
    /// Seconds with one decimal, e.g. `"2.3s"`.
    pub processing_time: String,
    pub processing_time_ms: u64,
    pub total_found: usize,
    pub selected: usize,
}

/// Recommendation entry point shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct GiftService {
    aggregator: Aggregator,
    history: Option<Arc<SearchHistory>>,
}

impl GiftService {
    pub fn new(aggregator: Aggregator, history: Option<Arc<SearchHistory>>) -> Self {
        Self {
            aggregator,
            history,
        }
    }

    /// Build providers from `config.search` and open the history database
    /// when `config.history.enabled`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let aggregator = Aggregator::from_config(&config.search)?;
        let history = if config.history.enabled {
            Some(Arc::new(SearchHistory::open(&config.history.db_path)?))
        } else {
            None
        };
        Ok(Self::new(aggregator, history))
    }

    pub fn history(&self) -> Option<&Arc<SearchHistory>> {
        self.history.as_ref()
    }

    /// Recommend gifts for `request`.
    ///
    /// # Errors
    ///
    /// [`crate::GiftError::InvalidProfile`] when age or interests are missing
    /// or malformed. Store failures only shrink the result; a failure to
    /// record history is logged and otherwise ignored.
    pub async fn find_gifts(
        &self,
        request: &ProfileRequest,
        user_id: Option<i64>,
    ) -> Result<Recommendation> {
        let started = Instant::now();
        let profile = request.validate()?;
        let spec = analyzer::analyze(&profile);
        let limits = self.aggregator.plans().for_plan(profile.plan);

        tracing::debug!(
            plan = %profile.plan,
            categories = ?spec.categories,
            price_range = %spec.price_range,
            "profile analyzed"
        );

        let outcome = self.aggregator.search(&spec, profile.plan).await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let selected = outcome.selected();

        tracing::info!(
            plan = %profile.plan,
            total_found = outcome.total_found,
            selected,
            elapsed_ms,
            "gift search finished"
        );

        let search_id = self
            .record_search(NewSearch {
                user_id,
                plan: profile.plan.tag().to_owned(),
                processing_time_ms: elapsed_ms,
                gifts_returned: selected,
                total_found: outcome.total_found,
                profile_json: profile_json(request),
            })
            .await;

        Ok(Recommendation {
            gifts: outcome.items,
            plan: profile.plan,
            max_results: limits.max_results,
            analysis: AnalysisSummary {
                categories: spec.categories,
                priority_tags: spec.priority_tags,
                processing_time: format_seconds(elapsed_ms),
                processing_time_ms: elapsed_ms,
                total_found: outcome.total_found,
                selected,
            },
            search_id,
        })
    }

    /// Store feedback on a past search.
    pub async fn record_feedback(&self, feedback: Feedback) -> Result<i64> {
        let history = self.history.clone().ok_or(HistoryError::Disabled)?;
        let id = run_blocking(move || history.record_feedback(&feedback)).await?;
        Ok(id)
    }

    /// Usage statistics, all zero when history is disabled.
    pub async fn statistics(&self) -> Result<Statistics> {
        match self.history.clone() {
            Some(history) => Ok(run_blocking(move || history.statistics()).await?),
            None => Ok(Statistics::default()),
        }
    }

    /// Activity summary for one user. Needs history enabled.
    pub async fn user_summary(&self, user_id: i64) -> Result<UserSummary> {
        let history = self.history.clone().ok_or(HistoryError::Disabled)?;
        Ok(run_blocking(move || history.user_summary(user_id)).await?)
    }

    async fn record_search(&self, search: NewSearch) -> Option<i64> {
        let history = self.history.clone()?;
        match run_blocking(move || history.record_search(&search)).await {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(error = %e, "failed to record search history");
                None
            }
        }
    }
}

async fn run_blocking<T, F>(f: F) -> std::result::Result<T, HistoryError>
where
    F: FnOnce() -> std::result::Result<T, HistoryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HistoryError::Task(e.to_string()))?
}

fn profile_json(request: &ProfileRequest) -> String {
    serde_json::to_string(request).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to serialize profile for history");
        "{}".to_owned()
    })
}

/// Milliseconds as seconds with one decimal and an `s` suffix.
pub fn format_seconds(ms: u64) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}
