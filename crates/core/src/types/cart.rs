//! Cart line items and the rules for merging them.
//!
//! A cart holds at most one line per product, every line has a quantity of
//! at least one, and lines keep the order in which products were first
//! added. The price on a line is the price when the product was first
//! added; later catalog edits do not touch it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Denormalized copy of a product taken when it enters a cart or wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// One product in a cart (and later an order) with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub quantity: u32,
}

impl LineItem {
    /// A fresh line at quantity 1.
    #[must_use]
    pub fn from_snapshot(snapshot: ProductSnapshot) -> Self {
        Self {
            product_id: snapshot.product_id,
            name: snapshot.name,
            price: snapshot.price,
            image: snapshot.image,
            quantity: 1,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The ordered lines of one user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLines(Vec<LineItem>);

impl CartLines {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    fn position(&self, product_id: ProductId) -> Option<usize> {
        self.0.iter().position(|line| line.product_id == product_id)
    }

    /// Add one unit of a product.
    ///
    /// An existing line gains one unit and keeps its original snapshot.
    /// Otherwise a new line is appended at quantity 1.
    pub fn add(&mut self, snapshot: ProductSnapshot) {
        match self.0.iter_mut().find(|l| l.product_id == snapshot.product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.0.push(LineItem::from_snapshot(snapshot)),
        }
    }

    /// Add one unit to an existing line. Returns whether a line was found.
    pub fn increase(&mut self, product_id: ProductId) -> bool {
        let Some(line) = self.0.iter_mut().find(|l| l.product_id == product_id) else {
            return false;
        };
        line.quantity = line.quantity.saturating_add(1);
        true
    }

    /// Take one unit off an existing line, stopping at 1.
    ///
    /// Returns whether the quantity changed.
    pub fn decrease(&mut self, product_id: ProductId) -> bool {
        match self.0.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) if line.quantity > 1 => {
                line.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    /// Drop a product's line entirely. Returns whether it was present.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.position(product_id)
            .map(|idx| self.0.remove(idx))
            .is_some()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Sum of every line's subtotal at the snapshot prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.0.iter().map(LineItem::subtotal).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.0
    }

    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.0
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.0.iter().find(|l| l.product_id == product_id)
    }
}

impl From<Vec<LineItem>> for CartLines {
    fn from(items: Vec<LineItem>) -> Self {
        Self(items)
    }
}
