//! Trait definition for pluggable store providers.
//!
//! Each store (Mercado Livre, a scraped storefront, the fixture store)
//! implements [`GiftProvider`] so the aggregator can fan out over a
//! heterogeneous list of `Arc<dyn GiftProvider>`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::{CandidateItem, PriceRange};

/// A source of candidate gift items.
///
/// Implementations must absorb every upstream failure: network errors,
/// malformed responses, empty results and timeouts all resolve to an
/// empty `Vec`. The aggregator treats "no results" as a normal outcome
/// and never sees a provider error.
///
/// All implementations must be `Send + Sync` for concurrent queries.
#[async_trait]
pub trait GiftProvider: Send + Sync {
    /// Search this store for `keyword`, hinting the budget with `price_range`.
    async fn search(&self, keyword: &str, price_range: PriceRange) -> Vec<CandidateItem>;

    /// Display name of the store, stamped on every returned item.
    fn store_name(&self) -> &str;
}

/// Run a fallible store query under `timeout`, resolving every failure
/// to an empty result.
///
/// Errors and timeouts are logged at warn level with the store name;
/// the keyword is only logged at trace level.
pub async fn absorb_failures<F>(store: &str, timeout: Duration, query: F) -> Vec<CandidateItem>
where
    F: Future<Output = Result<Vec<CandidateItem>, SearchError>>,
{
    match tokio::time::timeout(timeout, query).await {
        Ok(Ok(items)) => {
            tracing::debug!(store, count = items.len(), "provider returned items");
            items
        }
        Ok(Err(err)) => {
            tracing::warn!(store, error = %err, "provider query failed");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(store, timeout_ms = millis(timeout), "provider query timed out");
            Vec::new()
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A provider that returns a fixed list, or fails when empty.
    struct MockProvider {
        items: Vec<CandidateItem>,
    }

    #[async_trait]
    impl GiftProvider for MockProvider {
        async fn search(&self, _keyword: &str, _price_range: PriceRange) -> Vec<CandidateItem> {
            let items = self.items.clone();
            absorb_failures("Mock", Duration::from_secs(1), async move {
                if items.is_empty() {
                    Err(SearchError::Parse("mock provider failure".into()))
                } else {
                    Ok(items)
                }
            })
            .await
        }

        fn store_name(&self) -> &str {
            "Mock"
        }
    }

    fn item(name: &str) -> CandidateItem {
        CandidateItem {
            name: name.into(),
            price: 10.0,
            image_url: String::new(),
            store_name: "Mock".into(),
            product_url: "https://mock.example/item".into(),
            rating: 4.0,
            review_count: 0,
        }
    }

    #[test]
    fn trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn GiftProvider>();
    }

    #[tokio::test]
    async fn mock_provider_returns_items() {
        let provider = MockProvider {
            items: vec![item("Livro")],
        };
        let items = provider.search("livro", PriceRange::default()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Livro");
    }

    #[tokio::test]
    async fn failures_resolve_to_empty() {
        let provider = MockProvider { items: vec![] };
        let items = provider.search("livro", PriceRange::default()).await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn timeout_resolves_to_empty() {
        let items = absorb_failures("Slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![item("late")])
        })
        .await;
        assert!(items.is_empty());
    }

    #[test]
    fn millis_saturates_instead_of_wrapping() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
