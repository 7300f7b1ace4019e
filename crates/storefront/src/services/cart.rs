//! Cart service.
//!
//! Products are resolved from the catalog on `add` and snapshotted into the
//! cart line. Other operations work on the stored lines only.

use tracing::instrument;

use dreamy_layers_core::{CartLines, ProductId, UserId};

use super::products::ProductService;
use crate::db::{CartStore, Repositories, RepositoryError};
use crate::error::{AppError, Result};
use crate::state::ProductCache;

pub struct CartService<'a> {
    carts: &'a dyn CartStore,
    products: ProductService<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories, cache: &'a ProductCache) -> Self {
        Self {
            carts: repos.carts.as_ref(),
            products: ProductService::new(repos, cache),
        }
    }

    /// The user's lines, or no lines if they have never had a cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<CartLines> {
        Ok(self.carts.get(user_id).await?.unwrap_or_default())
    }

    /// Add one unit of a product, creating the cart on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product or user does not exist.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<CartLines> {
        let product = self.products.get(product_id).await?;
        self.carts
            .add(user_id, product.snapshot())
            .await
            .map_err(user_not_found)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the update fails.
    pub async fn increase(&self, user_id: UserId, product_id: ProductId) -> Result<CartLines> {
        Ok(self.carts.increase(user_id, product_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the update fails.
    pub async fn decrease(&self, user_id: UserId, product_id: ProductId) -> Result<CartLines> {
        Ok(self.carts.decrease(user_id, product_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<CartLines> {
        Ok(self.carts.remove(user_id, product_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<CartLines> {
        Ok(self.carts.clear(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: UserId) -> Result<()> {
        Ok(self.carts.delete(user_id).await?)
    }
}

/// The only `NotFound` a cart or wishlist write can hit is the owning user.
pub(super) fn user_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("User not found".to_string()),
        other => other.into(),
    }
}
