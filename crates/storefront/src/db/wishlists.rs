//! Wishlist repository.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use dreamy_layers_core::{ProductId, ProductSnapshot, UserId, WishlistItems};

use super::{RepositoryError, WishlistStore, not_found_on_foreign_key};

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image: Option<String>,
}

async fn load_items<'e, E>(executor: E, user_id: UserId) -> Result<WishlistItems, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT product_id, name, price, image
         FROM storefront.wishlist_item
         WHERE user_id = $1
         ORDER BY id ASC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(WishlistItems::from(
        rows.into_iter()
            .map(|r| ProductSnapshot {
                product_id: r.product_id,
                name: r.name,
                price: r.price,
                image: r.image,
            })
            .collect::<Vec<_>>(),
    ))
}

/// `PostgreSQL` implementation of [`WishlistStore`].
pub struct PgWishlistStore {
    pool: PgPool,
}

impl PgWishlistStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WishlistStore for PgWishlistStore {
    async fn get(&self, user_id: UserId) -> Result<Option<WishlistItems>, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM storefront.wishlist WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Ok(None);
        }

        load_items(&self.pool, user_id).await.map(Some)
    }

    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<WishlistItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO storefront.wishlist (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(not_found_on_foreign_key)?;

        sqlx::query(
            "INSERT INTO storefront.wishlist_item (user_id, product_id, name, price, image)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id, product_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(snapshot.product_id)
        .bind(&snapshot.name)
        .bind(snapshot.price)
        .bind(&snapshot.image)
        .execute(&mut *tx)
        .await?;

        let items = load_items(&mut *tx, user_id).await?;
        tx.commit().await?;

        Ok(items)
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistItems, RepositoryError> {
        sqlx::query("DELETE FROM storefront.wishlist_item WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        load_items(&self.pool, user_id).await
    }
}
