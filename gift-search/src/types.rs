//! Core types shared by the analyzer, the providers and the ranker.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

/// Inclusive price bounds, in the store currency (BRL).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl PriceRange {
    /// Range used when the budget bucket is not recognised.
    pub const DEFAULT: PriceRange = PriceRange {
        min: 0.0,
        max: 1000.0,
    };

    /// Creates a range from its bounds.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `price` lies within both bounds.
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    /// Checks that the bounds are finite, non-negative and ordered.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SearchError::InvalidSpec(
                "price range bounds must be finite".into(),
            ));
        }
        if self.min < 0.0 {
            return Err(SearchError::InvalidSpec(
                "price range min must not be negative".into(),
            ));
        }
        if self.min > self.max {
            return Err(SearchError::InvalidSpec(
                "price range min must be <= max".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Structured search parameters derived from a questionnaire profile.
///
/// Created once per request and never persisted. `keywords` order is
/// significant: the aggregator fans out over a prefix of it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Gift categories, deduplicated in first-seen order.
    pub categories: Vec<String>,
    /// Search keywords: occasion phrases first, then interest tokens.
    pub keywords: Vec<String>,
    /// Budget bounds used for the in-range score bonus.
    pub price_range: PriceRange,
    /// Informational tags derived from personality.
    pub priority_tags: Vec<String>,
}

impl SearchSpec {
    /// Rejects specs the aggregator cannot run.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.price_range.validate()
    }
}

/// One unscored result returned by a store provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    /// Product title as listed by the store.
    pub name: String,
    /// Price in BRL, never negative.
    pub price: f64,
    /// Product image URL (may be empty).
    pub image_url: String,
    /// Display name of the store that returned the item.
    pub store_name: String,
    /// Link to the product page.
    pub product_url: String,
    /// Store-reported or estimated rating on a 0-5 scale.
    pub rating: f64,
    /// Number of reviews (or sales, where the store reports no reviews).
    pub review_count: u32,
}

/// A candidate item together with its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    /// The underlying candidate.
    #[serde(flatten)]
    pub item: CandidateItem,
    /// Additive heuristic score (higher is better).
    pub score: f64,
}

/// Ranked items plus the metadata a caller needs for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Ranked items, at most the plan's result cap.
    pub items: Vec<ScoredItem>,
    /// Candidates found across all providers before truncation.
    pub total_found: usize,
    /// Number of keywords actually sent to providers.
    pub keywords_searched: usize,
    /// Wall-clock time spent in the fan-out and ranking, in milliseconds.
    pub elapsed_ms: u64,
}

impl SearchOutcome {
    /// Number of items selected after truncation.
    pub fn selected(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_contains_is_inclusive() {
        let range = PriceRange::new(0.0, 50.0);
        assert!(range.contains(0.0));
        assert!(range.contains(50.0));
        assert!(range.contains(25.5));
        assert!(!range.contains(50.01));
    }

    #[test]
    fn default_price_range_is_zero_to_thousand() {
        let range = PriceRange::default();
        assert!((range.min - 0.0).abs() < f64::EPSILON);
        assert!((range.max - 1000.0).abs() < f64::EPSILON);
        assert!(range.validate().is_ok());
    }

    #[test]
    fn inverted_range_rejected() {
        let err = PriceRange::new(100.0, 50.0).validate().unwrap_err();
        assert!(err.to_string().contains("min must be <= max"));
    }

    #[test]
    fn nan_range_rejected() {
        assert!(PriceRange::new(f64::NAN, 50.0).validate().is_err());
        assert!(PriceRange::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn negative_min_rejected() {
        assert!(PriceRange::new(-1.0, 50.0).validate().is_err());
    }

    #[test]
    fn price_range_display() {
        assert_eq!(PriceRange::new(50.0, 100.0).to_string(), "50-100");
    }

    #[test]
    fn scored_item_serializes_flat() {
        let scored = ScoredItem {
            item: CandidateItem {
                name: "Kindle".into(),
                price: 399.0,
                image_url: String::new(),
                store_name: "Mercado Livre".into(),
                product_url: "https://example.com/kindle".into(),
                rating: 4.5,
                review_count: 120,
            },
            score: 81.2,
        };
        let json = serde_json::to_value(&scored).expect("serialize");
        assert_eq!(json["name"], "Kindle");
        assert_eq!(json["store_name"], "Mercado Livre");
        assert!(json.get("item").is_none());
    }

    #[test]
    fn outcome_selected_counts_items() {
        let outcome = SearchOutcome {
            items: vec![],
            total_found: 12,
            keywords_searched: 3,
            elapsed_ms: 5,
        };
        assert_eq!(outcome.selected(), 0);
    }
}
