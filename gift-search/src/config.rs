//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] is built once (usually from the application's TOML
//! file) and injected into the providers and the aggregator. Nothing in
//! this crate reads credentials or endpoints from ambient global state.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::orchestrator::scoring::ScoringWeights;
use crate::plan::PlanLimits;

/// Default Mercado Livre API root.
pub const MERCADO_LIVRE_API: &str = "https://api.mercadolibre.com";

/// Placeholder substituted with the URL-encoded keyword in storefront templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Configuration for the gift search pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Store providers queried for every keyword. Queried concurrently.
    pub providers: Vec<ProviderConfig>,
    /// Per-request timeout in seconds, enforced inside each provider.
    pub timeout_seconds: u64,
    /// Maximum number of items each provider returns per keyword.
    pub items_per_query: usize,
    /// Custom User-Agent string. If `None`, rotates through a built-in list.
    pub user_agent: Option<String>,
    /// Result caps and keyword fan-out width per plan.
    pub plans: PlanLimits,
    /// Ranking weights.
    pub weights: ScoringWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderConfig::MercadoLivre(MercadoLivreConfig::default())],
            timeout_seconds: 10,
            items_per_query: 5,
            user_agent: None,
            plans: PlanLimits::default(),
            weights: ScoringWeights::default(),
        }
    }
}

/// One store provider entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Mercado Livre public search API.
    MercadoLivre(MercadoLivreConfig),
    /// HTML storefront scraped with configured CSS selectors.
    Storefront(StorefrontConfig),
    /// Deterministic synthetic items, for tests and demos.
    Fixture(FixtureConfig),
}

impl ProviderConfig {
    /// Display name of the store this entry represents.
    pub fn store_name(&self) -> &str {
        match self {
            Self::MercadoLivre(_) => "Mercado Livre",
            Self::Storefront(cfg) => &cfg.name,
            Self::Fixture(cfg) => &cfg.store_name,
        }
    }
}

/// Mercado Livre API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MercadoLivreConfig {
    /// API root, overridable for tests.
    pub base_url: String,
    /// Marketplace site id (`MLB` is Brazil).
    pub site_id: String,
}

impl Default for MercadoLivreConfig {
    fn default() -> Self {
        Self {
            base_url: MERCADO_LIVRE_API.to_owned(),
            site_id: "MLB".to_owned(),
        }
    }
}

/// A storefront whose search results page is scraped.
///
/// No selectors are built in: store markup changes too often to be a
/// stable contract, so every storefront is described here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Display name, e.g. `"Magazine Luiza"`.
    pub name: String,
    /// Origin used to resolve relative links and images.
    pub base_url: String,
    /// Search page URL containing the `{query}` placeholder.
    pub search_url: String,
    /// CSS selectors locating result fields.
    pub selectors: StorefrontSelectors,
    /// Rating assigned to items (storefront pages rarely expose one).
    #[serde(default = "default_storefront_rating")]
    pub default_rating: f64,
}

fn default_storefront_rating() -> f64 {
    4.5
}

/// CSS selectors for a storefront results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorefrontSelectors {
    /// One match per product card.
    pub item: String,
    /// Product title, relative to the card.
    pub name: String,
    /// Price text, relative to the card.
    pub price: String,
    /// Image element (reads `src`), relative to the card.
    pub image: String,
    /// Link element (reads `href`), relative to the card.
    pub link: String,
}

/// Fixture provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Store name stamped on generated items.
    pub store_name: String,
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `items_per_query` must be greater than 0
    /// - `providers` must not be empty
    /// - every plan tier must allow at least one result and one keyword
    /// - scoring weights must be finite and non-negative
    /// - provider entries must be well formed
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.items_per_query == 0 {
            return Err(SearchError::Config(
                "items_per_query must be greater than 0".into(),
            ));
        }
        if self.providers.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be configured".into(),
            ));
        }
        for tier in [self.plans.essential, self.plans.supreme] {
            if tier.max_results == 0 || tier.keyword_limit == 0 {
                return Err(SearchError::Config(
                    "plan max_results and keyword_limit must be greater than 0".into(),
                ));
            }
        }
        self.weights.validate()?;
        for provider in &self.providers {
            validate_provider(provider)?;
        }
        Ok(())
    }
}

fn validate_provider(provider: &ProviderConfig) -> Result<(), SearchError> {
    match provider {
        ProviderConfig::MercadoLivre(cfg) => {
            url::Url::parse(&cfg.base_url).map_err(|e| {
                SearchError::Config(format!("invalid Mercado Livre base_url: {e}"))
            })?;
            if cfg.site_id.trim().is_empty() {
                return Err(SearchError::Config(
                    "Mercado Livre site_id must not be empty".into(),
                ));
            }
        }
        ProviderConfig::Storefront(cfg) => {
            if cfg.name.trim().is_empty() {
                return Err(SearchError::Config("storefront name must not be empty".into()));
            }
            url::Url::parse(&cfg.base_url).map_err(|e| {
                SearchError::Config(format!("invalid base_url for {}: {e}", cfg.name))
            })?;
            if !cfg.search_url.contains(QUERY_PLACEHOLDER) {
                return Err(SearchError::Config(format!(
                    "search_url for {} must contain {QUERY_PLACEHOLDER}",
                    cfg.name
                )));
            }
            if !(0.0..=5.0).contains(&cfg.default_rating) {
                return Err(SearchError::Config(format!(
                    "default_rating for {} must be within 0..=5",
                    cfg.name
                )));
            }
        }
        ProviderConfig::Fixture(cfg) => {
            if cfg.store_name.trim().is_empty() {
                return Err(SearchError::Config(
                    "fixture store_name must not be empty".into(),
                ));
            }
        }
    }
    Ok(())
}
