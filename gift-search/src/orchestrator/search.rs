//! Core search orchestrator: concurrent (keyword × provider) fan-out and ranking.
//!
//! Queries every provider for every keyword in the plan's prefix,
//! waits for all queries, flattens the results, ranks them and truncates
//! to the plan's result cap.

use std::sync::Arc;
use std::time::Instant;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::plan::{Plan, PlanLimits};
use crate::provider::{millis, GiftProvider};
use crate::providers::build_providers;
use crate::types::{CandidateItem, SearchOutcome, SearchSpec};

use super::scoring::{is_rankable, rank, ScoringWeights};

/// Fans keyword queries out to a fixed set of providers and ranks the results.
///
/// Holds no per-request state, so one instance can serve concurrent
/// searches.
#[derive(Clone)]
pub struct Aggregator {
    providers: Vec<Arc<dyn GiftProvider>>,
    plans: PlanLimits,
    weights: ScoringWeights,
}

impl Aggregator {
    /// Create an aggregator over explicit providers.
    pub fn new(
        providers: Vec<Arc<dyn GiftProvider>>,
        plans: PlanLimits,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            providers,
            plans,
            weights,
        }
    }

    /// Validate `config` and build its providers.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid, or
    /// [`SearchError::Http`] if a provider's HTTP client cannot be built.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self::new(build_providers(config)?, config.plans, config.weights))
    }

    /// Providers queried for every keyword, in fan-out order.
    pub fn providers(&self) -> &[Arc<dyn GiftProvider>] {
        &self.providers
    }

    /// Plan limits in effect.
    pub fn plans(&self) -> &PlanLimits {
        &self.plans
    }

    /// Run a ranked search for `spec` under `plan`.
    ///
    /// # Pipeline
    ///
    /// 1. Take the first `keyword_limit` keywords of `spec.keywords`
    /// 2. Issue one query per (keyword, provider) pair concurrently with
    ///    [`futures::future::join_all`]; nothing is cancelled early
    /// 3. Flatten results keyword-major, provider-minor
    /// 4. Score against the full keyword list and stable-sort descending
    /// 5. Truncate to `max_results`
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidSpec`] only for a malformed spec.
    /// Provider failures are absorbed by the providers themselves; if
    /// nothing is found the outcome is simply empty.
    pub async fn search(&self, spec: &SearchSpec, plan: Plan) -> Result<SearchOutcome, SearchError> {
        spec.validate()?;

        let started = Instant::now();
        let limits = self.plans.for_plan(plan);
        let keywords = &spec.keywords[..spec.keywords.len().min(limits.keyword_limit)];
        let price_range = spec.price_range;

        tracing::debug!(
            %plan,
            keywords = keywords.len(),
            providers = self.providers.len(),
            "starting gift search fan-out"
        );

        // 1. Fan out to every (keyword, provider) pair concurrently.
        let queries: Vec<_> = keywords
            .iter()
            .flat_map(|keyword| {
                self.providers.iter().map(move |provider| {
                    let provider = Arc::clone(provider);
                    async move { provider.search(keyword, price_range).await }
                })
            })
            .collect();

        let outcomes = futures::future::join_all(queries).await;

        // 2. Flatten in issue order.
        let mut candidates: Vec<CandidateItem> = outcomes.into_iter().flatten().collect();
        let received = candidates.len();
        candidates.retain(is_rankable);
        if candidates.len() < received {
            tracing::debug!(
                dropped = received - candidates.len(),
                "dropped candidates with non-finite price or rating"
            );
        }
        let total_found = candidates.len();

        // 3. Score, sort, truncate.
        let mut items = rank(candidates, spec, &self.weights);
        items.truncate(limits.max_results);

        let elapsed_ms = millis(started.elapsed());

        tracing::debug!(
            total_found,
            selected = items.len(),
            elapsed_ms,
            "gift search complete"
        );

        Ok(SearchOutcome {
            items,
            total_found,
            keywords_searched: keywords.len(),
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::FixtureProvider;
    use crate::types::PriceRange;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    /// Records every keyword it is asked for.
    struct CountingProvider {
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GiftProvider for CountingProvider {
        async fn search(&self, keyword: &str, _price_range: PriceRange) -> Vec<CandidateItem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(keyword.to_owned());
            }
            Vec::new()
        }

        fn store_name(&self) -> &str {
            "Counting"
        }
    }

    fn spec_with_keywords(n: usize) -> SearchSpec {
        SearchSpec {
            categories: vec![],
            keywords: (0..n).map(|i| format!("kw{i}")).collect(),
            price_range: PriceRange::new(0.0, 100.0),
            priority_tags: vec![],
        }
    }

    fn shared<P: GiftProvider + 'static>(provider: P) -> Arc<dyn GiftProvider> {
        Arc::new(provider)
    }

    fn aggregator(providers: Vec<Arc<dyn GiftProvider>>) -> Aggregator {
        Aggregator::new(providers, PlanLimits::default(), ScoringWeights::default())
    }

    #[tokio::test]
    async fn supreme_fans_out_five_keywords() {
        let counter = Arc::new(CountingProvider::new());
        let agg = aggregator(vec![counter.clone() as Arc<dyn GiftProvider>]);
        let outcome = agg
            .search(&spec_with_keywords(6), Plan::Supreme)
            .await
            .expect("search");
        assert_eq!(counter.calls.load(Ordering::SeqCst), 5);
        assert_eq!(outcome.keywords_searched, 5);
    }

    #[tokio::test]
    async fn essential_fans_out_three_keyword_prefix() {
        let counter = Arc::new(CountingProvider::new());
        let agg = aggregator(vec![counter.clone() as Arc<dyn GiftProvider>]);
        agg.search(&spec_with_keywords(6), Plan::Essential)
            .await
            .expect("search");
        let mut seen = counter.seen.lock().expect("lock").clone();
        seen.sort();
        assert_eq!(seen, vec!["kw0", "kw1", "kw2"]);
    }

    #[tokio::test]
    async fn one_query_per_keyword_provider_pair() {
        let a = Arc::new(CountingProvider::new());
        let b = Arc::new(CountingProvider::new());
        let agg = aggregator(vec![a.clone() as Arc<dyn GiftProvider>, b.clone()]);
        agg.search(&spec_with_keywords(2), Plan::Essential)
            .await
            .expect("search");
        assert_eq!(a.calls.load(Ordering::SeqCst), 2);
        assert_eq!(b.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn all_empty_providers_return_empty_outcome() {
        let agg = aggregator(vec![
            shared(FixtureProvider::empty("A")),
            shared(FixtureProvider::empty("B")),
        ]);
        let outcome = agg
            .search(&spec_with_keywords(3), Plan::Supreme)
            .await
            .expect("empty is not an error");
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.total_found, 0);
    }

    #[tokio::test]
    async fn output_length_is_min_of_cap_and_found() {
        let agg = aggregator(vec![shared(FixtureProvider::generated("Demo", 4))]);

        // Essential: 3 keywords × 4 items = 12 found, cap 15.
        let outcome = agg
            .search(&spec_with_keywords(3), Plan::Essential)
            .await
            .expect("search");
        assert_eq!(outcome.total_found, 12);
        assert_eq!(outcome.selected(), 12);

        // Supreme with a big provider: 5 × 20 = 100 found, cap 50.
        let agg = aggregator(vec![shared(FixtureProvider::generated("Demo", 20))]);
        let outcome = agg
            .search(&spec_with_keywords(5), Plan::Supreme)
            .await
            .expect("search");
        assert_eq!(outcome.total_found, 100);
        assert_eq!(outcome.selected(), 50);
    }

    #[tokio::test]
    async fn malformed_candidates_are_dropped_before_ranking() {
        let item = |name: &str, price: f64, rating: f64| CandidateItem {
            name: name.into(),
            price,
            image_url: String::new(),
            store_name: "Fixed".into(),
            product_url: format!("https://fixed.example/{name}"),
            rating,
            review_count: 0,
        };
        let agg = aggregator(vec![shared(FixtureProvider::with_items(
            "Fixed",
            vec![
                item("low", 500.0, 1.0),
                item("nan", 50.0, f64::NAN),
                item("high", 50.0, 5.0),
                item("free-negative", -1.0, 5.0),
            ],
        ))]);
        let outcome = agg
            .search(&spec_with_keywords(1), Plan::Essential)
            .await
            .expect("search");
        let names: Vec<&str> = outcome.items.iter().map(|s| s.item.name.as_str()).collect();
        assert_eq!(names, vec!["high", "low"]);
        assert_eq!(outcome.total_found, 2);
    }

    #[tokio::test]
    async fn invalid_price_range_rejected() {
        let agg = aggregator(vec![shared(FixtureProvider::generated("Demo", 1))]);
        let mut spec = spec_with_keywords(1);
        spec.price_range = PriceRange::new(100.0, 10.0);
        let err = agg.search(&spec, Plan::Essential).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidSpec(_)));
    }

    #[tokio::test]
    async fn no_keywords_means_no_queries() {
        let counter = Arc::new(CountingProvider::new());
        let agg = aggregator(vec![counter.clone() as Arc<dyn GiftProvider>]);
        let outcome = agg
            .search(&spec_with_keywords(0), Plan::Supreme)
            .await
            .expect("search");
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert!(outcome.items.is_empty());
    }

    #[test]
    fn from_config_rejects_invalid_config() {
        let config = SearchConfig {
            providers: vec![],
            ..Default::default()
        };
        assert!(Aggregator::from_config(&config).is_err());
    }
}
