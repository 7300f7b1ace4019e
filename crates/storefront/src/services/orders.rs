//! Order service: checkout, queries, and status changes.
//!
//! Status writes are compare-and-set against the status that was read and
//! validated. If another request changed the order in between, the write
//! matches no row and the caller gets `InvalidState` instead of silently
//! overwriting the newer status.

use tracing::instrument;

use dreamy_layers_core::{CheckoutRequest, Order, OrderId, OrderStatus, UserId};

use crate::db::{OrderStore, Repositories};
use crate::error::{AppError, Result};
use crate::models::{CurrentUser, OrderWithCustomer};

pub struct OrderService<'a> {
    orders: &'a dyn OrderStore,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub fn new(repos: &'a Repositories) -> Self {
        Self {
            orders: repos.orders.as_ref(),
        }
    }

    /// Convert the caller's cart into an order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::EmptyCart` when there is nothing to order and
    /// `AppError::Validation` for missing contact fields or a stale total.
    #[instrument(skip(self, request), fields(user_id = %user.id))]
    pub async fn place(&self, user: &CurrentUser, request: &CheckoutRequest) -> Result<Order> {
        let order = self.orders.place(user.id, request).await?;
        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = order.items.len(),
            "order placed"
        );
        Ok(order)
    }

    /// Fetch one order for its owner or an admin.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id and
    /// `AppError::AccessDenied` when the caller neither owns the order nor is
    /// an admin.
    pub async fn get(&self, user: &CurrentUser, id: OrderId) -> Result<Order> {
        let order = self.load(id).await?;
        if !user.can_access(order.user_id) {
            return Err(AppError::AccessDenied("Access denied".to_string()));
        }
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<OrderWithCustomer>> {
        Ok(self.orders.list_all().await?)
    }

    /// Admin status change.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown id and
    /// `AppError::InvalidState` for a disallowed transition or a concurrent
    /// change.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, next: OrderStatus) -> Result<Order> {
        let order = self.load(id).await?;
        let current = order.status;
        current.admin_transition(next)?;

        if current == next {
            return Ok(order);
        }

        let updated = self.compare_and_set(id, current, next).await?;
        tracing::info!(order_id = %id, from = %current, to = %next, "order status changed");
        Ok(updated)
    }

    /// Owner cancellation, allowed only while the order is `Pending`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::AccessDenied` when the caller does not own the
    /// order and `AppError::InvalidState` when it is past `Pending`.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn cancel(&self, user: &CurrentUser, id: OrderId) -> Result<Order> {
        let order = self.load(id).await?;
        if !order.is_owned_by(user.id) {
            return Err(AppError::AccessDenied("Access denied".to_string()));
        }

        let next = order
            .status
            .cancel_by_owner()
            .map_err(|_| AppError::InvalidState("Order cannot be cancelled".to_string()))?;

        let cancelled = self
            .compare_and_set(id, order.status, next)
            .await
            .map_err(|e| match e {
                AppError::InvalidState(_) => {
                    AppError::InvalidState("Order cannot be cancelled".to_string())
                }
                other => other,
            })?;

        tracing::info!(order_id = %id, "order cancelled by owner");
        Ok(cancelled)
    }

    async fn load(&self, id: OrderId) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
    }

    async fn compare_and_set(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order> {
        if let Some(order) = self.orders.update_status(id, expected, next).await? {
            return Ok(order);
        }

        // No row matched: the order vanished or someone else moved it first.
        match self.orders.get(id).await? {
            None => Err(AppError::NotFound("Order not found".to_string())),
            Some(order) => Err(AppError::InvalidState(format!(
                "order status changed concurrently (now {})",
                order.status
            ))),
        }
    }
}
