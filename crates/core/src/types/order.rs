//! Orders and the cart-to-order conversion.
//!
//! An order is an immutable snapshot of a cart taken at checkout. Only its
//! status changes afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{CartLines, LineItem};
use super::id::{OrderId, UserId};
use super::status::OrderStatus;

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.payment_method", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    Razorpay,
}

/// Why a cart could not become an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    /// The client's idea of the total no longer matches the cart.
    #[error("Cart total changed: expected {expected}, cart totals {actual}")]
    TotalMismatch { expected: Decimal, actual: Decimal },
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Contact and delivery fields supplied at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl ShippingDetails {
    /// Check that every contact field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(CheckoutError::MissingField("phone"));
        }
        if self.shipping_address.trim().is_empty() {
            return Err(CheckoutError::MissingField("shippingAddress"));
        }
        if self.payment_method.is_none() {
            return Err(CheckoutError::MissingField("paymentMethod"));
        }
        Ok(())
    }
}

/// Checkout request body.
///
/// `total` is what the client believes the cart is worth. Any `items` the
/// client sends are ignored; the stored cart is what gets ordered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub details: ShippingDetails,
    #[serde(default, rename = "total")]
    pub expected_total: Option<Decimal>,
}

/// An order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub name: String,
    pub phone: String,
}

impl NewOrder {
    /// Snapshot a cart into an order.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` for a cart with no lines (checked first),
    /// `MissingField` for blank contact details and `TotalMismatch` when the client's expected
    /// total differs from the cart's.
    pub fn from_cart(
        user_id: UserId,
        cart: &CartLines,
        request: &CheckoutRequest,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        request.details.validate()?;

        let total = cart.total();
        if let Some(expected) = request.expected_total
            && expected != total
        {
            return Err(CheckoutError::TotalMismatch {
                expected,
                actual: total,
            });
        }

        let details = &request.details;
        Ok(Self {
            user_id,
            items: cart.items().to_vec(),
            total,
            payment_method: details.payment_method.unwrap_or_default(),
            shipping_address: details.shipping_address.trim().to_owned(),
            name: details.name.trim().to_owned(),
            phone: details.phone.trim().to_owned(),
        })
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: String,
    pub name: String,
    pub phone: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Materialize a persisted order. New orders always start `Pending`.
    #[must_use]
    pub fn placed(id: OrderId, new: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            items: new.items,
            total: new.total,
            payment_method: new.payment_method,
            shipping_address: new.shipping_address,
            name: new.name,
            phone: new.phone,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
