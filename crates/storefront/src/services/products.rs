//! Product catalog service.
//!
//! Single-product reads go through a `moka` cache (5-minute TTL). Updates
//! and deletes invalidate the cached entry.

use tracing::{debug, instrument};

use dreamy_layers_core::ProductId;

use crate::db::{ProductStore, Repositories};
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::state::ProductCache;

pub struct ProductService<'a> {
    products: &'a dyn ProductStore,
    cache: &'a ProductCache,
}

impl<'a> ProductService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories, cache: &'a ProductCache) -> Self {
        Self {
            products: repos.products.as_ref(),
            cache,
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.products.list().await?)
    }

    /// Fetch a product, serving from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Product> {
        if let Some(product) = self.cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        self.cache.insert(id, product.clone()).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name or negative price.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewProduct) -> Result<Product> {
        new.validate().map_err(AppError::Validation)?;
        let product = self.products.create(new).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `AppError::Validation` for invalid fields and
    /// `AppError::NotFound` for an unknown id.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product> {
        patch.validate().map_err(AppError::Validation)?;
        let product = self
            .products
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        self.cache.invalidate(&id).await;
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        if !self.products.delete(id).await? {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        self.cache.invalidate(&id).await;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
