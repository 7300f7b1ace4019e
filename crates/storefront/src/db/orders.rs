//! Order repository.
//!
//! Checkout runs in one transaction: the cart row is locked with
//! `FOR UPDATE`, the order is inserted and the cart lines are deleted. A
//! concurrent `add` waits on the lock and lands in the emptied cart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use dreamy_layers_core::{
    CartLines, CheckoutRequest, Email, LineItem, NewOrder, Order, OrderId, OrderStatus,
    PaymentMethod, UserId,
};

use super::carts::load_lines;
use super::{OrderStore, PlaceOrderError, RepositoryError};
use crate::models::{CustomerSummary, OrderWithCustomer};

const ORDER_COLUMNS: &str = "id, user_id, items, total, payment_method, shipping_address, \
                             name, phone, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<LineItem>>,
    total: Decimal,
    payment_method: PaymentMethod,
    shipping_address: String,
    name: String,
    phone: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            items: r.items.0,
            total: r.total,
            payment_method: r.payment_method,
            shipping_address: r.shipping_address,
            name: r.name,
            phone: r.phone,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderWithCustomerRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_name: Option<String>,
    customer_email: Option<String>,
}

impl TryFrom<OrderWithCustomerRow> for OrderWithCustomer {
    type Error = RepositoryError;

    fn try_from(r: OrderWithCustomerRow) -> Result<Self, Self::Error> {
        let customer = match (r.customer_name, r.customer_email) {
            (Some(name), Some(email)) => Some(CustomerSummary {
                id: r.order.user_id,
                name,
                email: Email::parse(&email).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
                })?,
            }),
            _ => None,
        };

        Ok(Self {
            order: r.order.into(),
            customer,
        })
    }
}

/// `PostgreSQL` implementation of [`OrderStore`].
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn place(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<UserId> = sqlx::query_scalar(
            "SELECT user_id FROM storefront.cart WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let lines = match locked {
            Some(_) => load_lines(&mut *tx, user_id).await?,
            None => CartLines::new(),
        };

        // Dropping `tx` on a rejected checkout rolls back; nothing was written.
        let new = NewOrder::from_cart(user_id, &lines, request)?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO storefront.order
                 (user_id, items, total, payment_method, shipping_address, name, phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id)
        .bind(Json(&new.items))
        .bind(new.total)
        .bind(new.payment_method)
        .bind(&new.shipping_address)
        .bind(&new.name)
        .bind(&new.phone)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM storefront.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.order
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<OrderWithCustomer>, RepositoryError> {
        sqlx::query_as::<_, OrderWithCustomerRow>(
            "SELECT o.id, o.user_id, o.items, o.total, o.payment_method, o.shipping_address,
                    o.name, o.phone, o.status, o.created_at, o.updated_at,
                    u.name AS customer_name, u.email AS customer_email
             FROM storefront.order o
             LEFT JOIN storefront.user u ON u.id = o.user_id
             ORDER BY o.created_at DESC, o.id DESC",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(OrderWithCustomer::try_from)
        .collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE storefront.order SET status = $3, updated_at = NOW()
             WHERE id = $1 AND status = $2
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(expected)
        .bind(next)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Order::from))
    }
}
