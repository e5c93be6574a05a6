//! Store provider implementations.
//!
//! Each module provides a struct implementing [`crate::provider::GiftProvider`].
//! [`build_providers`] turns the configured provider list into shareable
//! trait objects for the aggregator.

pub mod fixture;
pub mod mercado_livre;
pub mod storefront;

pub use fixture::FixtureProvider;
pub use mercado_livre::MercadoLivreProvider;
pub use storefront::StorefrontProvider;

use std::sync::Arc;

use crate::config::{ProviderConfig, SearchConfig};
use crate::error::SearchError;
use crate::provider::GiftProvider;

/// Instantiate every provider listed in `config`, in order.
///
/// # Errors
///
/// Returns [`SearchError::Config`] or [`SearchError::Http`] if any
/// provider cannot be constructed.
pub fn build_providers(config: &SearchConfig) -> Result<Vec<Arc<dyn GiftProvider>>, SearchError> {
    config
        .providers
        .iter()
        .map(|entry| -> Result<Arc<dyn GiftProvider>, SearchError> {
            Ok(match entry {
                ProviderConfig::MercadoLivre(cfg) => {
                    Arc::new(MercadoLivreProvider::new(cfg.clone(), config)?)
                }
                ProviderConfig::Storefront(cfg) => {
                    Arc::new(StorefrontProvider::new(cfg.clone(), config)?)
                }
                ProviderConfig::Fixture(cfg) => Arc::new(FixtureProvider::generated(
                    cfg.store_name.clone(),
                    config.items_per_query,
                )),
            })
        })
        .collect()
}
