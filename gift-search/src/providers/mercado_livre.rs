//! Mercado Livre provider backed by the public marketplace search API.
//!
//! The API returns JSON, so no HTML scraping is involved. It does not
//! expose product ratings; a rating is estimated from sales volume,
//! shipping and seller reputation instead.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::{MercadoLivreConfig, SearchConfig};
use crate::error::SearchError;
use crate::http::{self, ClientKind};
use crate::provider::{absorb_failures, GiftProvider};
use crate::types::{CandidateItem, PriceRange};

const STORE: &str = "Mercado Livre";

/// Mercado Livre search API client.
pub struct MercadoLivreProvider {
    client: reqwest::Client,
    config: MercadoLivreConfig,
    limit: usize,
    timeout: Duration,
}

impl MercadoLivreProvider {
    /// Build a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: MercadoLivreConfig, search: &SearchConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: http::build_client(search, ClientKind::Api)?,
            config,
            limit: search.items_per_query,
            timeout: Duration::from_secs(search.timeout_seconds),
        })
    }

    async fn fetch(
        &self,
        keyword: &str,
        price_range: PriceRange,
    ) -> Result<Vec<CandidateItem>, SearchError> {
        tracing::trace!(keyword, "Mercado Livre search");

        let url = format!(
            "{}/sites/{}/search",
            self.config.base_url.trim_end_matches('/'),
            self.config.site_id
        );
        let limit = self.limit.to_string();
        let mut params = vec![("q", keyword.to_owned()), ("limit", limit)];
        params.push(("sort", "relevance".to_owned()));
        params.push(("condition", "new".to_owned()));
        if price_range.min > 0.0 {
            params.push(("price", price_range.to_string()));
        }

        let request = self.client.get(&url).query(&params);
        let body = http::fetch_text(STORE, request).await?;

        tracing::trace!(bytes = body.len(), "Mercado Livre response received");

        parse_search_response(&body, self.limit)
    }
}

#[async_trait]
impl GiftProvider for MercadoLivreProvider {
    async fn search(&self, keyword: &str, price_range: PriceRange) -> Vec<CandidateItem> {
        absorb_failures(STORE, self.timeout, self.fetch(keyword, price_range)).await
    }

    fn store_name(&self) -> &str {
        STORE
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ListingItem>,
}

/// One listing. Every field is optional: the API sends `null` freely and a
/// single odd listing must not fail the page.
#[derive(Debug, Deserialize)]
struct ListingItem {
    title: Option<String>,
    price: Option<f64>,
    thumbnail: Option<String>,
    permalink: Option<String>,
    sold_quantity: Option<u32>,
    shipping: Option<Shipping>,
    seller: Option<Seller>,
}

#[derive(Debug, Deserialize)]
struct Shipping {
    free_shipping: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Seller {
    seller_reputation: Option<SellerReputation>,
}

#[derive(Debug, Deserialize)]
struct SellerReputation {
    level_id: Option<String>,
}

impl ListingItem {
    fn free_shipping(&self) -> bool {
        self.shipping
            .as_ref()
            .is_some_and(|s| s.free_shipping == Some(true))
    }

    fn gold_seller(&self) -> bool {
        self.seller
            .as_ref()
            .and_then(|s| s.seller_reputation.as_ref())
            .and_then(|r| r.level_id.as_deref())
            == Some("gold")
    }
}

/// Parse a Mercado Livre search response into candidate items.
///
/// Listings without a title or a valid non-negative price are skipped.
pub(crate) fn parse_search_response(
    body: &str,
    max_items: usize,
) -> Result<Vec<CandidateItem>, SearchError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("Mercado Livre JSON: {e}")))?;

    let items: Vec<CandidateItem> = response
        .results
        .into_iter()
        .filter_map(|listing| {
            let price = listing.price.filter(|p| p.is_finite() && *p >= 0.0)?;
            let name = listing.title.as_deref().unwrap_or_default().trim().to_string();
            if name.is_empty() {
                return None;
            }
            let sold = listing.sold_quantity.unwrap_or(0);
            let rating = estimate_rating(sold, listing.free_shipping(), listing.gold_seller());
            Some(CandidateItem {
                name,
                price,
                // Swap the thumbnail suffix for the full-size image.
                image_url: listing
                    .thumbnail
                    .as_deref()
                    .map(|t| t.replace("I.jpg", "O.jpg"))
                    .unwrap_or_default(),
                store_name: STORE.to_owned(),
                product_url: listing.permalink.unwrap_or_default(),
                rating,
                review_count: sold,
            })
        })
        .take(max_items)
        .collect();

    tracing::debug!(count = items.len(), "Mercado Livre results parsed");
    Ok(items)
}

/// Estimate a 0-5 rating from sales volume, free shipping and seller level.
///
/// Starts at 3.5; +0.5 above 100 sales, a further +0.3 above 500,
/// +0.2 for free shipping, +0.3 for a gold seller. Rounded to one decimal.
pub fn estimate_rating(sold_quantity: u32, free_shipping: bool, gold_seller: bool) -> f64 {
    let mut rating: f64 = 3.5;
    if sold_quantity > 100 {
        rating += 0.5;
    }
    if sold_quantity > 500 {
        rating += 0.3;
    }
    if free_shipping {
        rating += 0.2;
    }
    if gold_seller {
        rating += 0.3;
    }
    (rating.min(5.0) * 10.0).round() / 10.0
}
