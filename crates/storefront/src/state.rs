//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use dreamy_layers_core::ProductId;

use crate::config::StorefrontConfig;
use crate::db::Repositories;
use crate::models::Product;
use crate::services::payment::PaymentGateway;

/// Cache of catalog products keyed by id.
pub type ProductCache = Cache<ProductId, Product>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    repos: Repositories,
    products: ProductCache,
    payments: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `repos` - Stores backing every service
    /// * `payments` - Payment provider, `None` when payments are not configured
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        repos: Repositories,
        payments: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                repos,
                products,
                payments,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    /// Get a reference to the product cache.
    #[must_use]
    pub fn product_cache(&self) -> &ProductCache {
        &self.inner.products
    }

    /// The payment provider, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&dyn PaymentGateway> {
        self.inner.payments.as_deref()
    }
}
