//! Wishlist service.

use tracing::instrument;

use dreamy_layers_core::{ProductId, UserId, WishlistItems};

use super::cart::user_not_found;
use super::products::ProductService;
use crate::db::{Repositories, WishlistStore};
use crate::error::Result;
use crate::state::ProductCache;

pub struct WishlistService<'a> {
    wishlists: &'a dyn WishlistStore,
    products: ProductService<'a>,
}

impl<'a> WishlistService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories, cache: &'a ProductCache) -> Self {
        Self {
            wishlists: repos.wishlists.as_ref(),
            products: ProductService::new(repos, cache),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<WishlistItems> {
        Ok(self.wishlists.get(user_id).await?.unwrap_or_default())
    }

    /// Add a product unless it is already listed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product or user does not exist.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<WishlistItems> {
        let product = self.products.get(product_id).await?;
        self.wishlists
            .add(user_id, product.snapshot())
            .await
            .map_err(user_not_found)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<WishlistItems> {
        Ok(self.wishlists.remove(user_id, product_id).await?)
    }
}
