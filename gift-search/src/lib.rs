//! # gift-search
//!
//! Concurrent multi-store product search and heuristic gift ranking for
//! GiftGenius.
//!
//! ## Design
//!
//! - Providers are independent [`GiftProvider`] trait objects: the
//!   Mercado Livre JSON API, configurable HTML storefronts, and a
//!   deterministic fixture store
//! - One concurrent query per (keyword, provider) pair, joined before ranking
//! - Additive scoring: budget fit, rating, review volume, keyword matches
//! - Stable sort, truncated to the plan's result cap
//! - Graceful degradation: a failing store contributes zero items and
//!   never fails the search
//!
//! ## Privacy
//!
//! - Keywords are logged only at trace level
//! - Nothing is cached between searches

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod plan;
pub mod provider;
pub mod providers;
pub mod types;

pub use config::{ProviderConfig, SearchConfig};
pub use error::{Result, SearchError};
pub use orchestrator::scoring::ScoringWeights;
pub use orchestrator::search::Aggregator;
pub use plan::{Plan, PlanLimits, TierLimits};
pub use provider::GiftProvider;
pub use providers::{FixtureProvider, MercadoLivreProvider, StorefrontProvider};
pub use types::{CandidateItem, PriceRange, ScoredItem, SearchOutcome, SearchSpec};

/// Search the configured stores and rank the results.
///
/// Builds the providers from `config`, fans out over the plan's keyword
/// prefix and returns at most the plan's result cap. Prefer holding an
/// [`Aggregator`] when running many searches, so HTTP clients are reused.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for an invalid configuration and
/// [`SearchError::InvalidSpec`] for a malformed spec. Store failures are
/// never reported; they contribute no items.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> gift_search::Result<()> {
/// use gift_search::{Plan, PriceRange, SearchConfig, SearchSpec};
///
/// let spec = SearchSpec {
///     keywords: vec!["presente aniversário".into(), "leitura".into()],
///     price_range: PriceRange::new(0.0, 50.0),
///     ..Default::default()
/// };
/// let outcome = gift_search::search(&spec, Plan::Essential, &SearchConfig::default()).await?;
/// for scored in &outcome.items {
///     println!("{:.1} {} ({})", scored.score, scored.item.name, scored.item.store_name);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(spec: &SearchSpec, plan: Plan, config: &SearchConfig) -> Result<SearchOutcome> {
    Aggregator::from_config(config)?.search(spec, plan).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixtureConfig;

    fn fixture_config() -> SearchConfig {
        SearchConfig {
            providers: vec![ProviderConfig::Fixture(FixtureConfig {
                store_name: "Demo".into(),
            })],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn search_validates_config_empty_providers() {
        let config = SearchConfig {
            providers: vec![],
            ..Default::default()
        };
        let result = search(&SearchSpec::default(), Plan::Essential, &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("provider"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..fixture_config()
        };
        let result = search(&SearchSpec::default(), Plan::Essential, &config).await;
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_with_fixture_store_ranks_results() {
        let spec = SearchSpec {
            keywords: vec!["livros".into(), "vinis".into()],
            price_range: PriceRange::new(0.0, 100.0),
            ..Default::default()
        };
        let outcome = search(&spec, Plan::Essential, &fixture_config())
            .await
            .expect("fixture search");
        assert_eq!(outcome.total_found, 10);
        assert_eq!(outcome.selected(), 10);
        for pair in outcome.items.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
