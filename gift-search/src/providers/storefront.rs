//! Generic HTML storefront provider.
//!
//! Fetches a store's search results page and extracts product cards with
//! CSS selectors supplied in [`StorefrontConfig`]. The selectors live in
//! configuration rather than code because storefront markup changes
//! without notice.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::{SearchConfig, StorefrontConfig, StorefrontSelectors, QUERY_PLACEHOLDER};
use crate::error::SearchError;
use crate::http::{self, ClientKind};
use crate::provider::{absorb_failures, GiftProvider};
use crate::types::{CandidateItem, PriceRange};

/// Scraper for one configured storefront.
pub struct StorefrontProvider {
    client: reqwest::Client,
    config: StorefrontConfig,
    selectors: CompiledSelectors,
    base_url: Url,
    user_agent: Option<String>,
    limit: usize,
    timeout: Duration,
}

impl StorefrontProvider {
    /// Build a provider, checking the base URL and every selector up front.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] for an invalid base URL or selector,
    /// or [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, search: &SearchConfig) -> Result<Self, SearchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url for {}: {e}", config.name)))?;
        let selectors = CompiledSelectors::compile(&config.selectors)
            .map_err(|e| SearchError::Config(format!("{}: {e}", config.name)))?;

        Ok(Self {
            client: http::build_client(search, ClientKind::Storefront)?,
            config,
            selectors,
            base_url,
            user_agent: search.user_agent.clone(),
            limit: search.items_per_query,
            timeout: Duration::from_secs(search.timeout_seconds),
        })
    }

    /// Expand the search URL template for `keyword`.
    fn search_url(&self, keyword: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
        self.config
            .search_url
            .replace(QUERY_PLACEHOLDER, &encoded.replace('+', "%20"))
    }

    async fn fetch(&self, keyword: &str) -> Result<Vec<CandidateItem>, SearchError> {
        tracing::trace!(store = %self.config.name, keyword, "storefront search");

        let request = self.client.get(self.search_url(keyword)).header(
            reqwest::header::USER_AGENT,
            http::storefront_user_agent(self.user_agent.as_deref()),
        );
        let html = http::fetch_text(&self.config.name, request).await?;

        tracing::trace!(store = %self.config.name, bytes = html.len(), "storefront response received");

        Ok(parse_storefront_html(
            &html,
            &self.selectors,
            &self.config,
            &self.base_url,
            self.limit,
        ))
    }
}

#[async_trait]
impl GiftProvider for StorefrontProvider {
    async fn search(&self, keyword: &str, _price_range: PriceRange) -> Vec<CandidateItem> {
        absorb_failures(&self.config.name, self.timeout, self.fetch(keyword)).await
    }

    fn store_name(&self) -> &str {
        &self.config.name
    }
}

/// Selectors parsed once at construction and reused for every page.
pub(crate) struct CompiledSelectors {
    item: Selector,
    name: Selector,
    price: Selector,
    image: Selector,
    link: Selector,
}

impl CompiledSelectors {
    pub(crate) fn compile(selectors: &StorefrontSelectors) -> Result<Self, SearchError> {
        let parse = |field: &str, css: &str| {
            Selector::parse(css)
                .map_err(|e| SearchError::Parse(format!("invalid {field} selector {css:?}: {e:?}")))
        };
        Ok(Self {
            item: parse("item", &selectors.item)?,
            name: parse("name", &selectors.name)?,
            price: parse("price", &selectors.price)?,
            image: parse("image", &selectors.image)?,
            link: parse("link", &selectors.link)?,
        })
    }
}

/// Parse a storefront results page into candidate items.
///
/// Cards without a name or a parseable price are skipped. Relative image
/// and product links are resolved against `base_url`.
pub(crate) fn parse_storefront_html(
    html: &str,
    selectors: &CompiledSelectors,
    config: &StorefrontConfig,
    base_url: &Url,
    max_items: usize,
) -> Vec<CandidateItem> {
    let document = Html::parse_document(html);

    let mut items = Vec::new();

    for card in document.select(&selectors.item) {
        let name = match first_text(&card, &selectors.name) {
            Some(n) => n,
            None => continue,
        };
        let price = match price_text(&card, &selectors.price).and_then(|t| parse_price(&t)) {
            Some(p) => p,
            None => continue,
        };
        let image_url = first_attr(&card, &selectors.image, "src")
            .and_then(|src| resolve(base_url, &src))
            .unwrap_or_default();
        let product_url = first_attr(&card, &selectors.link, "href")
            .and_then(|href| resolve(base_url, &href))
            .unwrap_or_else(|| base_url.to_string());

        items.push(CandidateItem {
            name,
            price,
            image_url,
            store_name: config.name.clone(),
            product_url,
            rating: config.default_rating,
            review_count: 0,
        });

        if items.len() >= max_items {
            break;
        }
    }

    tracing::debug!(store = %config.name, count = items.len(), "storefront results parsed");
    items
}

fn first_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

/// Price text with the element's text nodes glued together, so markup
/// like `<span>50</span><span>,90</span>` reads as `50,90`.
fn price_text(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

fn first_attr(card: &ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_owned)
}

fn resolve(base_url: &Url, link: &str) -> Option<String> {
    base_url.join(link.trim()).ok().map(|u| u.to_string())
}

/// Parse the first price in Brazilian formatting.
///
/// `"R$ 1.234,56"` parses to `1234.56`; `"R$ 49"` to `49.0`. Dots are
/// thousands separators and the comma is the decimal mark.
pub fn parse_price(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    token
        .trim_end_matches('.')
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
}
