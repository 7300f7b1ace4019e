//! Persistence for the storefront.
//!
//! # Tables (schema `storefront`)
//!
//! - `user` - Accounts with Argon2 password hashes
//! - `product` - Catalog
//! - `cart` / `cart_item` - One cart per user, line snapshots
//! - `wishlist` / `wishlist_item` - One wishlist per user
//! - `order` - Immutable order snapshots (items as JSONB)
//! - `tower_sessions.session` - Created by the session store
//!
//! Every resource sits behind an async trait so services can run against
//! `PostgreSQL` in production and [`memory::MemoryStore`] in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p dreamy-layers-cli -- migrate
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use dreamy_layers_core::{
    CartLines, CheckoutError, CheckoutRequest, Email, Order, OrderId, OrderStatus, ProductId,
    ProductSnapshot, UserId, WishlistItems,
};

use crate::models::{
    NewProduct, NewUser, OrderWithCustomer, Product, ProductPatch, User, UserCredentials,
};

pub mod carts;
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlists;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Why checkout did not produce an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The cart or request failed the checkout rules. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] CheckoutError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn create(&self, new: NewUser) -> Result<User, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up a user and their password hash by (normalized) email.
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, RepositoryError>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Set the blocked flag. Returns `None` for an unknown user.
    async fn set_blocked(&self, id: UserId, blocked: bool)
    -> Result<Option<User>, RepositoryError>;
}

/// Catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError>;

    /// Returns `None` for an unknown product.
    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns whether a product was deleted.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;
}

/// Cart storage. Every mutation returns the cart's lines afterwards.
///
/// Operations other than `add` never create a cart; on a missing cart they
/// return empty lines.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// `None` when the user has never had a cart.
    async fn get(&self, user_id: UserId) -> Result<Option<CartLines>, RepositoryError>;

    /// Create the cart if needed, then add one unit of the product.
    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<CartLines, RepositoryError>;

    async fn increase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError>;

    /// Quantity floors at 1.
    async fn decrease(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError>;

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError>;

    /// Empty the cart but keep its record.
    async fn clear(&self, user_id: UserId) -> Result<CartLines, RepositoryError>;

    /// Remove the cart record entirely.
    async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError>;
}

/// Wishlist storage.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    async fn get(&self, user_id: UserId) -> Result<Option<WishlistItems>, RepositoryError>;

    /// Create the wishlist if needed; a product already listed is left alone.
    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<WishlistItems, RepositoryError>;

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItems, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Turn the user's cart into an order and empty the cart, atomically.
    async fn place(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<Order, PlaceOrderError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order with customer details, newest first.
    async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError>;

    /// Compare-and-set the status.
    ///
    /// Returns `None` if the order does not exist or its status is no
    /// longer `expected`.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

/// The full set of stores used by services.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub wishlists: Arc<dyn WishlistStore>,
    pub orders: Arc<dyn OrderStore>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(users::PgUserStore::new(pool.clone())),
            products: Arc::new(products::PgProductStore::new(pool.clone())),
            carts: Arc::new(carts::PgCartStore::new(pool.clone())),
            wishlists: Arc::new(wishlists::PgWishlistStore::new(pool.clone())),
            orders: Arc::new(orders::PgOrderStore::new(pool.clone())),
            pool: Some(pool.clone()),
        }
    }

    /// In-process stores, all backed by one [`memory::MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::default());
        Self {
            users: store.clone(),
            products: store.clone(),
            carts: store.clone(),
            wishlists: store.clone(),
            orders: store,
            pool: None,
        }
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").fetch_one(pool).await?;
        }
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to `Conflict`, everything else to `Database`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(err)
}

/// Map a foreign-key violation (unknown owning user) to `NotFound`.
pub(crate) fn not_found_on_foreign_key(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound;
    }
    RepositoryError::Database(err)
}
