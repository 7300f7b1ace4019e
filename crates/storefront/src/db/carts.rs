//! Cart repository.
//!
//! Each mutation is a single statement (or one transaction for `add`), so
//! concurrent requests for the same cart never lose an increment.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use dreamy_layers_core::{CartLines, LineItem, ProductId, ProductSnapshot, UserId};

use super::{CartStore, RepositoryError, not_found_on_foreign_key};

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    product_id: ProductId,
    name: String,
    price: Decimal,
    image: Option<String>,
    quantity: i32,
}

impl TryFrom<LineRow> for LineItem {
    type Error = RepositoryError;

    fn try_from(r: LineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative cart quantity {}", r.quantity))
        })?;

        Ok(Self {
            product_id: r.product_id,
            name: r.name,
            price: r.price,
            image: r.image,
            quantity,
        })
    }
}

/// Load a cart's lines in insertion order.
pub(super) async fn load_lines<'e, E>(
    executor: E,
    user_id: UserId,
) -> Result<CartLines, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, LineRow>(
        "SELECT product_id, name, price, image, quantity
         FROM storefront.cart_item
         WHERE user_id = $1
         ORDER BY id ASC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    let items = rows
        .into_iter()
        .map(LineItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CartLines::from(items))
}

/// `PostgreSQL` implementation of [`CartStore`].
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn adjust(
        &self,
        sql: &'static str,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        sqlx::query(sql)
            .bind(user_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        load_lines(&self.pool, user_id).await
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn get(&self, user_id: UserId) -> Result<Option<CartLines>, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM storefront.cart WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Ok(None);
        }

        load_lines(&self.pool, user_id).await.map(Some)
    }

    async fn add(
        &self,
        user_id: UserId,
        snapshot: ProductSnapshot,
    ) -> Result<CartLines, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO storefront.cart (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET updated_at = NOW()",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(not_found_on_foreign_key)?;

        // The stored snapshot wins on conflict; only the quantity moves.
        sqlx::query(
            "INSERT INTO storefront.cart_item (user_id, product_id, name, price, image, quantity)
             VALUES ($1, $2, $3, $4, $5, 1)
             ON CONFLICT (user_id, product_id)
             DO UPDATE SET quantity = storefront.cart_item.quantity + 1",
        )
        .bind(user_id)
        .bind(snapshot.product_id)
        .bind(&snapshot.name)
        .bind(snapshot.price)
        .bind(&snapshot.image)
        .execute(&mut *tx)
        .await?;

        let lines = load_lines(&mut *tx, user_id).await?;
        tx.commit().await?;

        Ok(lines)
    }

    async fn increase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        self.adjust(
            "UPDATE storefront.cart_item SET quantity = quantity + 1
             WHERE user_id = $1 AND product_id = $2",
            user_id,
            product_id,
        )
        .await
    }

    async fn decrease(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        self.adjust(
            "UPDATE storefront.cart_item SET quantity = quantity - 1
             WHERE user_id = $1 AND product_id = $2 AND quantity > 1",
            user_id,
            product_id,
        )
        .await
    }

    async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartLines, RepositoryError> {
        self.adjust(
            "DELETE FROM storefront.cart_item WHERE user_id = $1 AND product_id = $2",
            user_id,
            product_id,
        )
        .await
    }

    async fn clear(&self, user_id: UserId) -> Result<CartLines, RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(CartLines::new())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
