//! HTTP clients for store requests.
//!
//! The two provider kinds want different request shapes. The Mercado
//! Livre API is called as an identified application asking for JSON.
//! Storefront pages are fetched like a Brazilian browser would, with the
//! User-Agent drawn per request from a small pool of desktop browsers.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};

use crate::config::SearchConfig;
use crate::error::SearchError;

/// User-Agent the API client identifies itself with.
pub const API_USER_AGENT: &str = concat!("GiftGenius/", env!("CARGO_PKG_VERSION"));

/// Desktop browser User-Agents for storefront pages.
const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const PT_BR: &str = "pt-BR,pt;q=0.9";

/// Which kind of endpoint a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// JSON marketplace API.
    Api,
    /// HTML storefront search page.
    Storefront,
}

impl ClientKind {
    fn default_headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            Self::Api => {
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
            }
            Self::Storefront => {
                headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
                headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(PT_BR));
            }
        }
        headers
    }
}

/// Build a [`reqwest::Client`] for `kind`.
///
/// API clients carry [`API_USER_AGENT`] (or the configured override) as a
/// client default. Storefront clients carry no default User-Agent; callers
/// set one per request with [`storefront_user_agent`]. Both keep cookies,
/// decompress gzip and brotli, and time out after
/// `config.timeout_seconds`.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SearchConfig, kind: ClientKind) -> Result<reqwest::Client, SearchError> {
    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .default_headers(kind.default_headers())
        .redirect(reqwest::redirect::Policy::limited(10));

    if kind == ClientKind::Api {
        builder = builder.user_agent(config.user_agent.as_deref().unwrap_or(API_USER_AGENT));
    }

    builder
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}

/// User-Agent for one storefront request: the configured override, or a
/// browser drawn at random.
pub fn storefront_user_agent(custom: Option<&str>) -> &str {
    match custom {
        Some(ua) => ua,
        None => BROWSER_USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(BROWSER_USER_AGENTS[0]),
    }
}

/// Fetch `request` and return the body as text, mapping failures to
/// [`SearchError::Http`] tagged with `store`.
pub(crate) async fn fetch_text(
    store: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, SearchError> {
    let response = request
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("{store} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{store} HTTP error: {e}")))?;

    response
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{store} response read failed: {e}")))
}
