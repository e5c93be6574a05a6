//! Deterministic fixture provider.
//!
//! Produces predictable items without touching the network. It is a
//! separate provider chosen explicitly in configuration or by a test
//! harness; live providers never fall back to it on failure.

use async_trait::async_trait;

use crate::provider::GiftProvider;
use crate::types::{CandidateItem, PriceRange};

const FIXTURE_HOST: &str = "https://fixtures.giftgenius.invalid";

enum FixtureItems {
    /// Synthesize `per_keyword` items spread across the price range.
    Generated { per_keyword: usize },
    /// Return the same items for every keyword.
    Fixed(Vec<CandidateItem>),
}

/// A provider returning deterministic items.
pub struct FixtureProvider {
    store_name: String,
    items: FixtureItems,
}

impl FixtureProvider {
    /// Generate `per_keyword` items per query, named after the keyword.
    pub fn generated(store_name: impl Into<String>, per_keyword: usize) -> Self {
        Self {
            store_name: store_name.into(),
            items: FixtureItems::Generated { per_keyword },
        }
    }

    /// Always return `items`, regardless of keyword or price range.
    pub fn with_items(store_name: impl Into<String>, items: Vec<CandidateItem>) -> Self {
        Self {
            store_name: store_name.into(),
            items: FixtureItems::Fixed(items),
        }
    }

    /// A provider that never returns anything.
    pub fn empty(store_name: impl Into<String>) -> Self {
        Self::with_items(store_name, Vec::new())
    }

    fn generate(&self, keyword: &str, price_range: PriceRange, count: usize) -> Vec<CandidateItem> {
        let slug: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        let store_slug: String =
            url::form_urlencoded::byte_serialize(self.store_name.to_lowercase().as_bytes()).collect();
        let span = price_range.max - price_range.min;

        (0..count)
            .map(|i| {
                let fraction = (i + 1) as f64 / (count + 1) as f64;
                let price = ((price_range.min + span * fraction) * 100.0).round() / 100.0;
                CandidateItem {
                    name: format!("{keyword} - {} {}", self.store_name, i + 1),
                    price,
                    image_url: format!("{FIXTURE_HOST}/{store_slug}/{slug}/{}.jpg", i + 1),
                    store_name: self.store_name.clone(),
                    product_url: format!("{FIXTURE_HOST}/{store_slug}/{slug}/{}", i + 1),
                    rating: 4.0 + (i % 10) as f64 / 10.0,
                    review_count: 100 * (i as u32 + 1),
                }
            })
            .collect()
    }
}

#[async_trait]
impl GiftProvider for FixtureProvider {
    async fn search(&self, keyword: &str, price_range: PriceRange) -> Vec<CandidateItem> {
        tracing::trace!(store = %self.store_name, keyword, "fixture search");
        match &self.items {
            FixtureItems::Generated { per_keyword } => {
                self.generate(keyword, price_range, *per_keyword)
            }
            FixtureItems::Fixed(items) => items.clone(),
        }
    }

    fn store_name(&self) -> &str {
        &self.store_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_items_are_deterministic() {
        let provider = FixtureProvider::generated("Demo", 3);
        let range = PriceRange::new(0.0, 100.0);
        let first = provider.search("livros", range).await;
        let second = provider.search("livros", range).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn generated_items_stay_within_range() {
        let provider = FixtureProvider::generated("Demo", 5);
        let range = PriceRange::new(50.0, 100.0);
        for item in provider.search("música", range).await {
            assert!(range.contains(item.price), "price {} out of range", item.price);
            assert!(item.name.starts_with("música"));
            assert_eq!(item.store_name, "Demo");
            assert!(item.rating <= 5.0);
        }
    }

    #[tokio::test]
    async fn fixed_items_ignore_keyword() {
        let item = CandidateItem {
            name: "Vinil".into(),
            price: 120.0,
            image_url: String::new(),
            store_name: "Demo".into(),
            product_url: "https://demo.example/vinil".into(),
            rating: 4.7,
            review_count: 30,
        };
        let provider = FixtureProvider::with_items("Demo", vec![item.clone()]);
        assert_eq!(provider.search("qualquer", PriceRange::default()).await, vec![item]);
    }

    #[tokio::test]
    async fn empty_provider_returns_nothing() {
        let provider = FixtureProvider::empty("Vazia");
        assert!(provider.search("x", PriceRange::default()).await.is_empty());
        assert_eq!(provider.store_name(), "Vazia");
    }
}
