//! Additive heuristic scoring for candidate gift items.
//!
//! Assigns scores based on:
//! - Price falling inside the budget range
//! - Store-reported or estimated rating
//! - Review volume, capped
//! - Keyword matches in the item name
//!
//! Formula (default weights):
//! `score = 30·[min <= price <= max] + 10·rating + min(reviews / 100, 20) + 15·matches`

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{CandidateItem, ScoredItem, SearchSpec};

/// Bonus for an item priced inside the budget range.
pub const IN_RANGE_BONUS: f64 = 30.0;
/// Points per rating star.
pub const RATING_WEIGHT: f64 = 10.0;
/// Reviews needed for one point.
pub const REVIEWS_PER_POINT: f64 = 100.0;
/// Maximum points from review volume.
pub const REVIEW_POINTS_CAP: f64 = 20.0;
/// Bonus per keyword found in the item name.
pub const KEYWORD_MATCH_BONUS: f64 = 15.0;

/// Weights of the ranking heuristic.
///
/// The defaults are empirical and carry no deeper meaning; they are
/// configurable so deployments can tune them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub in_range_bonus: f64,
    pub rating_weight: f64,
    pub reviews_per_point: f64,
    pub review_points_cap: f64,
    pub keyword_match_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            in_range_bonus: IN_RANGE_BONUS,
            rating_weight: RATING_WEIGHT,
            reviews_per_point: REVIEWS_PER_POINT,
            review_points_cap: REVIEW_POINTS_CAP,
            keyword_match_bonus: KEYWORD_MATCH_BONUS,
        }
    }
}

impl ScoringWeights {
    /// Every weight must be finite and non-negative; `reviews_per_point`
    /// must be strictly positive.
    pub fn validate(&self) -> Result<(), SearchError> {
        let weights = [
            self.in_range_bonus,
            self.rating_weight,
            self.reviews_per_point,
            self.review_points_cap,
            self.keyword_match_bonus,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SearchError::Config(
                "scoring weights must be finite and non-negative".into(),
            ));
        }
        if self.reviews_per_point == 0.0 {
            return Err(SearchError::Config(
                "reviews_per_point must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Calculate the score of one candidate against `spec`.
///
/// Keyword matches are counted against the full `spec.keywords`, not the
/// prefix that was fanned out. Matching is a case-insensitive substring
/// test; empty keywords never match.
pub fn calculate_score(item: &CandidateItem, spec: &SearchSpec, weights: &ScoringWeights) -> f64 {
    let keywords = lowercase_keywords(&spec.keywords);
    score_with(item, spec, &keywords, weights)
}

/// Whether `item` can be scored: finite non-negative price, finite rating.
pub fn is_rankable(item: &CandidateItem) -> bool {
    item.price.is_finite() && item.price >= 0.0 && item.rating.is_finite()
}

/// Score and rank `items`, highest score first.
///
/// Items that are not [`is_rankable`] are dropped. The sort is stable:
/// items with equal scores keep their relative order from `items`.
pub fn rank(items: Vec<CandidateItem>, spec: &SearchSpec, weights: &ScoringWeights) -> Vec<ScoredItem> {
    let keywords = lowercase_keywords(&spec.keywords);

    let mut scored: Vec<ScoredItem> = items
        .into_iter()
        .filter(is_rankable)
        .map(|item| {
            let score = score_with(&item, spec, &keywords, weights);
            ScoredItem { item, score }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Count keywords appearing in `name`, case-insensitively.
pub fn keyword_matches(name: &str, keywords: &[String]) -> usize {
    let name = name.to_lowercase();
    lowercase_keywords(keywords)
        .iter()
        .filter(|kw| name.contains(kw.as_str()))
        .count()
}

fn lowercase_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn score_with(
    item: &CandidateItem,
    spec: &SearchSpec,
    lowered_keywords: &[String],
    weights: &ScoringWeights,
) -> f64 {
    let mut score = 0.0;

    if spec.price_range.contains(item.price) {
        score += weights.in_range_bonus;
    }

    score += item.rating * weights.rating_weight;
    score += (f64::from(item.review_count) / weights.reviews_per_point).min(weights.review_points_cap);

    let name = item.name.to_lowercase();
    let matches = lowered_keywords
        .iter()
        .filter(|kw| name.contains(kw.as_str()))
        .count();
    score += matches as f64 * weights.keyword_match_bonus;

    score
}
