//! Wishlist items: a cart without quantities.

use serde::{Deserialize, Serialize};

use super::cart::ProductSnapshot;
use super::id::ProductId;

/// The ordered, duplicate-free products on a user's wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistItems(Vec<ProductSnapshot>);

impl WishlistItems {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a product unless it is already listed. Returns whether it was added.
    pub fn add(&mut self, snapshot: ProductSnapshot) -> bool {
        if self.contains(snapshot.product_id) {
            return false;
        }
        self.0.push(snapshot);
        true
    }

    /// Returns whether the product was listed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.0.len();
        self.0.retain(|item| item.product_id != product_id);
        self.0.len() != before
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.0.iter().any(|item| item.product_id == product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[ProductSnapshot] {
        &self.0
    }

    #[must_use]
    pub fn into_items(self) -> Vec<ProductSnapshot> {
        self.0
    }
}

impl From<Vec<ProductSnapshot>> for WishlistItems {
    fn from(items: Vec<ProductSnapshot>) -> Self {
        Self(items)
    }
}
